//! The rendering capability seam.
//!
//! A headless browser lives outside this crate. Hosts plug one in by
//! implementing [`RenderingEngine`] and [`RenderSession`] (for example over
//! a Playwright or CDP client) and passing it to
//! [`crate::extract::Extractor::with_engine`]. An extractor built without an
//! engine never attempts the rendered strategy.
//!
//! Sessions are owned by the strategy chain for exactly one attempt and are
//! always closed by it, whichever way the attempt ends.

use crate::error::EngineError;
use async_trait::async_trait;
use std::time::Duration;

/// Factory for rendering sessions.
#[async_trait]
pub trait RenderingEngine: Send + Sync {
    /// Open a fresh, isolated session (a new page in a new context).
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, EngineError>;
}

/// A credential prompt located on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeHandle {
    /// Selector of the input that accepts the credential.
    pub input_selector: String,
    /// Selector of the control that submits it, if the engine found one.
    /// Engines fall back to pressing Enter in the input when `None`.
    pub submit_selector: Option<String>,
}

/// One loaded page inside a rendering engine.
#[async_trait]
pub trait RenderSession: Send {
    /// Load `url`, failing with [`EngineError::Timeout`] after `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), EngineError>;

    /// Wait until the page reaches a stable load state (network idle).
    async fn wait_stable(&mut self, timeout: Duration) -> Result<(), EngineError>;

    /// Look for a credential-entry affordance right now, without waiting.
    async fn find_challenge(&mut self) -> Result<Option<ChallengeHandle>, EngineError>;

    /// Type `value` into the challenge input.
    async fn fill(&mut self, handle: &ChallengeHandle, value: &str) -> Result<(), EngineError>;

    /// Submit the challenge form.
    async fn submit(&mut self, handle: &ChallengeHandle) -> Result<(), EngineError>;

    /// Serialised DOM of the current page (`document.documentElement.outerHTML`).
    async fn content(&mut self) -> Result<String, EngineError>;

    /// The page's current URL, used to resolve relative image references.
    async fn current_url(&mut self) -> Result<String, EngineError>;

    /// Release the session. Called exactly once by the owner.
    async fn close(self: Box<Self>) -> Result<(), EngineError>;
}
