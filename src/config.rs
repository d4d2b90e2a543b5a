//! Configuration types for slide extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Every bounded wait, every heuristic
//! threshold and the strategy policy live in this one struct so two runs can
//! be compared by diffing their configs.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default browser-like user agent for static fetches. Several presentation
/// hosts serve an empty shell to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Configuration for an extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use deckscrape::{ExtractionConfig, RenderPolicy};
///
/// let config = ExtractionConfig::builder()
///     .fetch_timeout_ms(10_000)
///     .render_policy(RenderPolicy::Always)
///     .chunk_max_len(800)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Upper bound for a rendering session's navigation. Default: 30 000 ms.
    pub navigation_timeout_ms: u64,

    /// Upper bound for the post-navigation stable-load wait. Default: 15 000 ms.
    ///
    /// Exceeding it is not fatal on its own: the page is snapshotted as-is
    /// and the extractor decides whether anything usable loaded.
    pub stabilize_timeout_ms: u64,

    /// How long to look for a credential prompt before deciding the document
    /// is unprotected. Default: 3 000 ms.
    ///
    /// Paid by every rendered request that carries a credential, so keep it
    /// short.
    pub challenge_probe_ms: u64,

    /// Upper bound for the page to settle after a credential is submitted.
    /// Default: 10 000 ms.
    pub auth_submit_timeout_ms: u64,

    /// Static fetch timeout. Default: 30 000 ms.
    pub fetch_timeout_ms: u64,

    /// Overall deadline for one request across all strategies. Default: 120 000 ms.
    pub request_deadline_ms: u64,

    /// Minimum characters a candidate's text needs to count as a slide. Default: 20.
    ///
    /// Filters decorative wrappers, page counters and empty containers.
    pub min_slide_text_len: usize,

    /// Maximum image references kept per slide. Default: 10.
    pub max_images_per_slide: usize,

    /// Maximum characters per chunk in the text-chunking fallback. Default: 1 200.
    pub chunk_max_len: usize,

    /// Maximum chunks produced by the text-chunking fallback. Default: 10.
    pub chunk_max_chunks: usize,

    /// When to prefer a rendering session. Default: [`RenderPolicy::Auto`].
    pub render_policy: RenderPolicy,

    /// Extra hosts (matched as suffixes, e.g. `decks.acme.io`) that require
    /// client-side rendering. Default: empty.
    pub rendering_hosts: Vec<String>,

    /// User agent sent by the static fetcher.
    pub user_agent: String,

    /// Concurrent requests for [`crate::extract::extract_many`] and
    /// [`crate::stream::extract_stream`]. Default: 4.
    ///
    /// Each request still runs its strategies one at a time.
    pub concurrency: usize,

    /// Receives strategy-level events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            stabilize_timeout_ms: 15_000,
            challenge_probe_ms: 3_000,
            auth_submit_timeout_ms: 10_000,
            fetch_timeout_ms: 30_000,
            request_deadline_ms: 120_000,
            min_slide_text_len: 20,
            max_images_per_slide: 10,
            chunk_max_len: 1_200,
            chunk_max_chunks: 10,
            render_policy: RenderPolicy::default(),
            rendering_hosts: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("navigation_timeout_ms", &self.navigation_timeout_ms)
            .field("stabilize_timeout_ms", &self.stabilize_timeout_ms)
            .field("challenge_probe_ms", &self.challenge_probe_ms)
            .field("auth_submit_timeout_ms", &self.auth_submit_timeout_ms)
            .field("fetch_timeout_ms", &self.fetch_timeout_ms)
            .field("request_deadline_ms", &self.request_deadline_ms)
            .field("min_slide_text_len", &self.min_slide_text_len)
            .field("max_images_per_slide", &self.max_images_per_slide)
            .field("chunk_max_len", &self.chunk_max_len)
            .field("chunk_max_chunks", &self.chunk_max_chunks)
            .field("render_policy", &self.render_policy)
            .field("rendering_hosts", &self.rendering_hosts)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn stabilize_timeout(&self) -> Duration {
        Duration::from_millis(self.stabilize_timeout_ms)
    }

    pub fn challenge_probe(&self) -> Duration {
        Duration::from_millis(self.challenge_probe_ms)
    }

    pub fn auth_submit_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_submit_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_deadline_ms)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn navigation_timeout_ms(mut self, ms: u64) -> Self {
        self.config.navigation_timeout_ms = ms;
        self
    }

    pub fn stabilize_timeout_ms(mut self, ms: u64) -> Self {
        self.config.stabilize_timeout_ms = ms;
        self
    }

    pub fn challenge_probe_ms(mut self, ms: u64) -> Self {
        self.config.challenge_probe_ms = ms;
        self
    }

    pub fn auth_submit_timeout_ms(mut self, ms: u64) -> Self {
        self.config.auth_submit_timeout_ms = ms;
        self
    }

    pub fn fetch_timeout_ms(mut self, ms: u64) -> Self {
        self.config.fetch_timeout_ms = ms;
        self
    }

    pub fn request_deadline_ms(mut self, ms: u64) -> Self {
        self.config.request_deadline_ms = ms;
        self
    }

    pub fn min_slide_text_len(mut self, n: usize) -> Self {
        self.config.min_slide_text_len = n.max(1);
        self
    }

    pub fn max_images_per_slide(mut self, n: usize) -> Self {
        self.config.max_images_per_slide = n;
        self
    }

    pub fn chunk_max_len(mut self, n: usize) -> Self {
        self.config.chunk_max_len = n;
        self
    }

    pub fn chunk_max_chunks(mut self, n: usize) -> Self {
        self.config.chunk_max_chunks = n;
        self
    }

    pub fn render_policy(mut self, policy: RenderPolicy) -> Self {
        self.config.render_policy = policy;
        self
    }

    pub fn rendering_host(mut self, host: impl Into<String>) -> Self {
        self.config.rendering_hosts.push(host.into().to_ascii_lowercase());
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        let waits = [
            ("navigation_timeout_ms", c.navigation_timeout_ms),
            ("stabilize_timeout_ms", c.stabilize_timeout_ms),
            ("challenge_probe_ms", c.challenge_probe_ms),
            ("auth_submit_timeout_ms", c.auth_submit_timeout_ms),
            ("fetch_timeout_ms", c.fetch_timeout_ms),
            ("request_deadline_ms", c.request_deadline_ms),
        ];
        if let Some((name, _)) = waits.iter().find(|(_, v)| *v == 0) {
            return Err(ExtractError::InvalidConfig(format!("{name} must be > 0")));
        }
        if c.chunk_max_len < c.min_slide_text_len {
            return Err(ExtractError::InvalidConfig(format!(
                "chunk_max_len ({}) must be ≥ min_slide_text_len ({})",
                c.chunk_max_len, c.min_slide_text_len
            )));
        }
        if c.chunk_max_chunks == 0 {
            return Err(ExtractError::InvalidConfig(
                "chunk_max_chunks must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// When the classifier should put a rendering session ahead of static fetch.
///
/// | Policy | Strategy order (engine present) |
/// |--------|---------------------------------|
/// | `Auto` | rendered first only for known client-rendered hosts |
/// | `Always` | rendered first for every host |
/// | `Never` | static fetch only |
///
/// Without a rendering engine every policy degrades to static fetch only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicy {
    #[default]
    Auto,
    Always,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExtractionConfig::default();
        assert_eq!(c.chunk_max_len, 1_200);
        assert_eq!(c.chunk_max_chunks, 10);
        assert_eq!(c.min_slide_text_len, 20);
        assert_eq!(c.challenge_probe(), Duration::from_secs(3));
        assert_eq!(c.render_policy, RenderPolicy::Auto);
    }

    #[test]
    fn builder_rejects_zero_timeouts() {
        let err = ExtractionConfig::builder().fetch_timeout_ms(0).build().unwrap_err();
        assert!(err.to_string().contains("fetch_timeout_ms"));
    }

    #[test]
    fn builder_rejects_chunks_smaller_than_threshold() {
        let err = ExtractionConfig::builder()
            .min_slide_text_len(50)
            .chunk_max_len(10)
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn builder_lowercases_rendering_hosts_and_clamps_concurrency() {
        let c = ExtractionConfig::builder()
            .rendering_host("Decks.ACME.io")
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(c.rendering_hosts, vec!["decks.acme.io".to_string()]);
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn debug_hides_callback() {
        use crate::progress::NoopProgressCallback;
        use std::sync::Arc;
        let c = ExtractionConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        assert!(format!("{c:?}").contains("<dyn ExtractionProgressCallback>"));
    }
}
