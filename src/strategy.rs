//! Strategy identifiers, descriptors and the per-request outcome type.

use crate::error::{FailureKind, StrategyFailure};
use crate::output::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a document was (or will be) accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Loaded in a rendering session so client-side scripts run first.
    Rendered,
    /// Plain HTTP GET of the markup, parsed without running scripts.
    StaticFetch,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Rendered => "rendered",
            ExtractionMethod::StaticFetch => "static-fetch",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one access strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDescriptor {
    pub method: ExtractionMethod,
    pub requires_rendering: bool,
    pub requires_network: bool,
}

impl StrategyDescriptor {
    pub const RENDERED: StrategyDescriptor = StrategyDescriptor {
        method: ExtractionMethod::Rendered,
        requires_rendering: true,
        requires_network: true,
    };

    pub const STATIC_FETCH: StrategyDescriptor = StrategyDescriptor {
        method: ExtractionMethod::StaticFetch,
        requires_rendering: false,
        requires_network: true,
    };
}

/// Result of running the strategy chain for one request.
#[derive(Debug, Clone)]
pub enum StrategyOutcome {
    Success(ExtractionResult),
    /// Every strategy failed. `last` is the final attempt; `attempts` holds
    /// all of them in the order they ran (including `last`).
    Failure {
        last: StrategyFailure,
        attempts: Vec<StrategyFailure>,
    },
}

impl StrategyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StrategyOutcome::Success(_))
    }

    /// Human-readable list of attempts: `rendered (timeout), static-fetch (access-denied)`.
    pub fn history(attempts: &[StrategyFailure]) -> String {
        attempts
            .iter()
            .map(|a| {
                format!(
                    "{} ({})",
                    a.method.map(|m| m.as_str()).unwrap_or("chain"),
                    a.kind
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Build the failure returned when no strategy was eligible at all.
    pub(crate) fn no_strategies() -> Self {
        let last = StrategyFailure {
            method: None,
            kind: FailureKind::CapabilityUnavailable,
            message: "no extraction strategy is eligible for this reference".to_string(),
        };
        StrategyOutcome::Failure {
            attempts: vec![last.clone()],
            last,
        }
    }
}
