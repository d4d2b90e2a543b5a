//! Authentication: satisfy a credential prompt inside a rendering session.
//!
//! Most documents are not protected, so the check is a short bounded probe
//! rather than a fixed wait. Not finding a prompt is the common case and is
//! never an error.

use crate::config::ExtractionConfig;
use crate::engine::{ChallengeHandle, RenderSession};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// Interval between challenge probes while waiting for a prompt to appear.
const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Result of [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A prompt was found, the credential submitted, and the prompt is gone.
    Satisfied,
    /// No prompt appeared within the probe window.
    NotRequired,
    /// The prompt could not be satisfied.
    Failed(String),
}

/// Probe `session` for a credential prompt and submit `credential` if one
/// appears.
///
/// After submission the page gets `auth_submit_timeout_ms` to settle; if that
/// wait runs out the prompt is probed anyway, so a slow page that did unlock
/// still counts as satisfied and only a prompt that is still present counts
/// as failed.
pub async fn authenticate(
    session: &mut dyn RenderSession,
    credential: &str,
    config: &ExtractionConfig,
) -> AuthOutcome {
    let Some(handle) = probe(session, config.challenge_probe()).await else {
        debug!("No credential prompt within {}ms", config.challenge_probe_ms);
        return AuthOutcome::NotRequired;
    };

    info!("Credential prompt found at '{}', submitting", handle.input_selector);
    if let Err(e) = session.fill(&handle, credential).await {
        return AuthOutcome::Failed(format!("could not fill credential: {e}"));
    }
    if let Err(e) = session.submit(&handle).await {
        return AuthOutcome::Failed(format!("could not submit credential: {e}"));
    }

    if let Err(e) = session.wait_stable(config.auth_submit_timeout()).await {
        warn!("Page did not settle after credential submission: {}", e);
    }

    match session.find_challenge().await {
        Ok(Some(_)) => AuthOutcome::Failed("credential prompt still present after submission".into()),
        Ok(None) => AuthOutcome::Satisfied,
        Err(e) => {
            warn!("Could not re-check credential prompt: {}", e);
            AuthOutcome::Satisfied
        }
    }
}

/// Poll for a prompt until one appears or `window` elapses.
///
/// Engine errors while probing are treated as "no prompt" for that poll.
async fn probe(session: &mut dyn RenderSession, window: Duration) -> Option<ChallengeHandle> {
    let deadline = Instant::now() + window;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, session.find_challenge()).await {
            Ok(Ok(Some(handle))) => return Some(handle),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => debug!("Challenge probe failed: {}", e),
            Err(_) => return None,
        }
        if Instant::now() + PROBE_INTERVAL >= deadline {
            return None;
        }
        sleep(PROBE_INTERVAL).await;
    }
}
