//! Rendered strategy: load the document in a rendering session, let its
//! scripts build the slides, then snapshot the DOM.
//!
//! Opening the session and driving it both count against the budget. The
//! session is owned by a [`SessionGuard`] from the moment it opens, so it is
//! closed on every path: normally at the end of [`extract_rendered`], and by
//! a spawned task when the attempt is cancelled or panics.

use crate::config::ExtractionConfig;
use crate::engine::{RenderSession, RenderingEngine};
use crate::error::{EngineError, FailureKind, StrategyFailure};
use crate::output::ExtractionResult;
use crate::pipeline::assemble::assemble;
use crate::pipeline::auth::{authenticate, AuthOutcome};
use crate::pipeline::extract::extract_markup;
use crate::reference::DocumentReference;
use crate::strategy::ExtractionMethod;
use reqwest::Url;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const METHOD: ExtractionMethod = ExtractionMethod::Rendered;

/// Run the rendered strategy for `reference` within `budget`.
pub async fn extract_rendered(
    engine: &dyn RenderingEngine,
    reference: &DocumentReference,
    config: &ExtractionConfig,
    budget: Duration,
) -> Result<ExtractionResult, StrategyFailure> {
    let start = Instant::now();
    let session = match tokio::time::timeout(budget, engine.open_session()).await {
        Ok(opened) => opened.map_err(|e| engine_failure("could not open rendering session", &e))?,
        Err(_) => return Err(deadline_failure(start, "while opening rendering session")),
    };

    let mut guard = SessionGuard::new(session);
    let remaining = budget.saturating_sub(start.elapsed());
    let driven = tokio::time::timeout(remaining, guard.drive(reference, config)).await;
    guard.close().await;

    let (markup, page_url) = match driven {
        Ok(result) => result?,
        Err(_) => return Err(deadline_failure(start, "in rendering session")),
    };

    let base = Url::parse(&page_url).unwrap_or_else(|_| reference.url().clone());
    let content = extract_markup(&markup, Some(&base), config).ok_or_else(|| {
        StrategyFailure::new(
            METHOD,
            FailureKind::NoContentExtracted,
            "rendered page contained no slide-like content",
        )
    })?;

    info!(
        "Rendered extraction recovered {} slides via {:?}",
        content.slides.len(),
        content.heuristic
    );
    Ok(assemble(&content.titles, content.slides, METHOD))
}

/// Navigate, settle, authenticate, snapshot. Returns the markup and the URL
/// the page ended up at.
async fn drive(
    session: &mut dyn RenderSession,
    reference: &DocumentReference,
    config: &ExtractionConfig,
) -> Result<(String, String), StrategyFailure> {
    debug!("Navigating rendering session to {}", reference.url());
    session
        .navigate(reference.url().as_str(), config.navigation_timeout())
        .await
        .map_err(|e| engine_failure("navigation failed", &e))?;

    // Pages that never go network-idle (analytics beacons, polling) are
    // still snapshotted.
    if let Err(e) = session.wait_stable(config.stabilize_timeout()).await {
        warn!("Page did not stabilize, snapshotting anyway: {}", e);
    }

    if let Some(credential) = reference.credential() {
        match authenticate(session, credential, config).await {
            AuthOutcome::Satisfied => info!("Credential accepted"),
            AuthOutcome::NotRequired => debug!("Credential supplied but no prompt appeared"),
            AuthOutcome::Failed(reason) => {
                return Err(StrategyFailure::new(METHOD, FailureKind::AccessDenied, reason));
            }
        }
    }

    let markup = session
        .content()
        .await
        .map_err(|e| engine_failure("could not read page content", &e))?;
    let page_url = session
        .current_url()
        .await
        .unwrap_or_else(|_| reference.url().to_string());
    Ok((markup, page_url))
}

/// Owns an open session and guarantees it is released.
struct SessionGuard {
    session: Option<Box<dyn RenderSession>>,
}

impl SessionGuard {
    fn new(session: Box<dyn RenderSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    async fn drive(
        &mut self,
        reference: &DocumentReference,
        config: &ExtractionConfig,
    ) -> Result<(String, String), StrategyFailure> {
        match self.session.as_deref_mut() {
            Some(session) => drive(session, reference, config).await,
            None => Err(StrategyFailure::new(
                METHOD,
                FailureKind::CapabilityUnavailable,
                "rendering session was already closed",
            )),
        }
    }

    async fn close(mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.close().await {
                warn!("Rendering session did not close cleanly: {}", e);
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Rendering attempt abandoned; closing its session in the background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("Rendering session did not close cleanly: {}", e);
                    }
                });
            }
            Err(_) => warn!("Rendering session dropped outside a runtime; it was not closed"),
        }
    }
}

fn deadline_failure(start: Instant, context: &str) -> StrategyFailure {
    StrategyFailure::new(
        METHOD,
        FailureKind::Timeout,
        format!(
            "request deadline reached after {}ms {}",
            start.elapsed().as_millis(),
            context
        ),
    )
}

fn engine_failure(context: &str, e: &EngineError) -> StrategyFailure {
    StrategyFailure::new(METHOD, e.kind(), format!("{context}: {e}"))
}
