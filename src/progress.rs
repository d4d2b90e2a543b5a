//! Progress-callback trait for strategy-level extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the strategy chain works through its attempts.
//!
//! # Example
//!
//! ```rust
//! use deckscrape::{ExtractionConfig, ExtractionMethod, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     attempts: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_strategy_start(&self, method: ExtractionMethod, attempt: usize, total: usize) {
//!         self.attempts.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("trying {method} ({attempt}/{total})");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { attempts: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FailureKind;
use crate::strategy::ExtractionMethod;
use std::sync::Arc;

/// Called by the strategy chain as it works through a request.
///
/// Implementations must be `Send + Sync`: batch extraction drives several
/// requests concurrently against one config. All methods default to no-ops.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once per request after classification.
    ///
    /// # Arguments
    /// * `url`: the reference being extracted
    /// * `strategies`: number of strategies that will be tried at most
    fn on_extraction_start(&self, url: &str, strategies: usize) {
        let _ = (url, strategies);
    }

    /// Called before a strategy acquires its capability.
    ///
    /// # Arguments
    /// * `method`: the strategy about to run
    /// * `attempt`: 1-indexed attempt number
    /// * `total`: strategies in the chain
    fn on_strategy_start(&self, method: ExtractionMethod, attempt: usize, total: usize) {
        let _ = (method, attempt, total);
    }

    /// Called when a strategy fails; the chain may still continue.
    fn on_strategy_failed(&self, method: ExtractionMethod, kind: FailureKind, message: &str) {
        let _ = (method, kind, message);
    }

    /// Called once when a strategy succeeds.
    ///
    /// # Arguments
    /// * `method`: the strategy that produced the result
    /// * `slide_count`: slides in the final result
    fn on_extraction_complete(&self, method: ExtractionMethod, slide_count: usize) {
        let _ = (method, slide_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl ExtractionProgressCallback for RecordingCallback {
        fn on_strategy_start(&self, method: ExtractionMethod, attempt: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {method} {attempt}/{total}"));
        }

        fn on_strategy_failed(&self, method: ExtractionMethod, kind: FailureKind, _message: &str) {
            self.events.lock().unwrap().push(format!("fail {method} {kind}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start("https://example.org", 2);
        cb.on_strategy_start(ExtractionMethod::Rendered, 1, 2);
        cb.on_strategy_failed(ExtractionMethod::Rendered, FailureKind::Timeout, "slow");
        cb.on_extraction_complete(ExtractionMethod::StaticFetch, 3);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let cb = RecordingCallback::default();
        cb.on_strategy_start(ExtractionMethod::Rendered, 1, 2);
        cb.on_strategy_failed(ExtractionMethod::Rendered, FailureKind::Timeout, "slow");
        cb.on_extraction_complete(ExtractionMethod::StaticFetch, 3);
        assert_eq!(
            *cb.events.lock().unwrap(),
            vec!["start rendered 1/2".to_string(), "fail rendered timeout".to_string()]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_extraction_start("https://example.org", 1);
    }
}
