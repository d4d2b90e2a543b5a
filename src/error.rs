//! Error types for the deckscrape library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] is **fatal**: the extraction cannot produce a result at
//!   all (malformed reference, every strategy exhausted, bad configuration).
//!   Returned as `Err(ExtractError)` from the top-level `extract*` functions.
//!
//! * [`StrategyFailure`] is **non-fatal**: one access strategy failed (the
//!   rendered page timed out, the static fetch was forbidden) but another
//!   strategy may still succeed. Recorded by the strategy chain and carried
//!   inside [`ExtractError::AllStrategiesFailed`] when nothing worked.
//!
//! Every failure is classified into a [`FailureKind`] so callers can branch
//! on the cause without parsing messages.

use crate::strategy::ExtractionMethod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of why an extraction attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The document reference is empty or malformed.
    InvalidReference,
    /// The strategy needs a capability (rendering) this process does not have.
    CapabilityUnavailable,
    /// The target rejected access (HTTP 401/403, unresolved credential challenge).
    AccessDenied,
    /// A bounded wait was exceeded.
    Timeout,
    /// The document loaded but no heuristic produced a usable slide.
    NoContentExtracted,
    /// Network-level failure other than a timeout.
    TransportFailure,
}

impl FailureKind {
    /// Stable kebab-case identifier, matching the serialised form.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidReference => "invalid-reference",
            FailureKind::CapabilityUnavailable => "capability-unavailable",
            FailureKind::AccessDenied => "access-denied",
            FailureKind::Timeout => "timeout",
            FailureKind::NoContentExtracted => "no-content-extracted",
            FailureKind::TransportFailure => "transport-failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All fatal errors returned by the deckscrape library.
///
/// Strategy-level failures use [`StrategyFailure`] and only surface here
/// once every eligible strategy has been tried.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The reference is empty, unparsable, or not an HTTP/HTTPS URL.
    #[error("Invalid document reference '{input}': {reason}")]
    InvalidReference { input: String, reason: String },

    // ── Strategy errors ───────────────────────────────────────────────────
    /// Every eligible strategy was attempted and none produced slides.
    ///
    /// `kind` and `message` describe the last attempt; `history` lists
    /// every attempt in order as `method (kind)`.
    #[error(
        "All {attempts} extraction strategies failed; last attempt '{method}' failed with {kind}: {message}\nAttempted: {history}"
    )]
    AllStrategiesFailed {
        method: String,
        kind: FailureKind,
        message: String,
        attempts: usize,
        history: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// The failure classification, when one applies.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ExtractError::InvalidReference { .. } => Some(FailureKind::InvalidReference),
            ExtractError::AllStrategiesFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// A non-fatal failure of a single strategy attempt.
///
/// `method` is `None` only for chain-level failures that happened before any
/// strategy could start (for instance an empty strategy list).
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{}: {kind}: {message}", .method.map(|m| m.as_str()).unwrap_or("chain"))]
pub struct StrategyFailure {
    pub method: Option<ExtractionMethod>,
    pub kind: FailureKind,
    pub message: String,
}

impl StrategyFailure {
    pub fn new(method: ExtractionMethod, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            kind,
            message: message.into(),
        }
    }
}

/// Errors reported by a [`crate::engine::RenderingEngine`] or its sessions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine cannot provide a session (not installed, crashed, at capacity).
    #[error("rendering engine unavailable: {0}")]
    Unavailable(String),

    /// The engine gave up waiting.
    #[error("rendering engine timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The page answered with an HTTP status the engine treats as an error.
    #[error("page responded with HTTP {status}")]
    HttpStatus { status: u16 },

    /// Navigation failed (DNS, TLS, aborted load).
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Any other session operation failed.
    #[error("{0}")]
    Session(String),
}

impl EngineError {
    /// Map an engine error onto the failure taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            EngineError::Unavailable(_) => FailureKind::CapabilityUnavailable,
            EngineError::Timeout { .. } => FailureKind::Timeout,
            EngineError::HttpStatus { status } => status_kind(*status),
            EngineError::Navigation(_) | EngineError::Session(_) => FailureKind::TransportFailure,
        }
    }
}

/// Classify a non-success HTTP status.
pub(crate) fn status_kind(status: u16) -> FailureKind {
    match status {
        401 | 403 | 451 => FailureKind::AccessDenied,
        408 | 504 => FailureKind::Timeout,
        _ => FailureKind::TransportFailure,
    }
}
