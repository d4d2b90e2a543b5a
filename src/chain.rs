//! The strategy chain: try each access strategy in order until one yields
//! slides.
//!
//! Strategies run strictly one after another. A failed attempt is recorded
//! and the next strategy starts; the first success ends the chain. The whole
//! run is bounded by `request_deadline_ms`, and once that is spent no further
//! strategy starts.

use crate::config::ExtractionConfig;
use crate::engine::RenderingEngine;
use crate::error::{FailureKind, StrategyFailure};
use crate::output::ExtractionResult;
use crate::pipeline::fetch::{extract_static, PageFetcher};
use crate::pipeline::render::extract_rendered;
use crate::reference::DocumentReference;
use crate::strategy::{ExtractionMethod, StrategyDescriptor, StrategyOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Runs strategy lists against the collaborators it was built with.
#[derive(Clone)]
pub struct StrategyChain {
    config: ExtractionConfig,
    engine: Option<Arc<dyn RenderingEngine>>,
    fetcher: Arc<dyn PageFetcher>,
}

impl StrategyChain {
    pub fn new(
        config: ExtractionConfig,
        engine: Option<Arc<dyn RenderingEngine>>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            config,
            engine,
            fetcher,
        }
    }

    /// Whether the rendered strategy can run at all.
    pub fn rendering_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Run `strategies` in order for `reference`.
    pub async fn run(
        &self,
        reference: &DocumentReference,
        strategies: &[StrategyDescriptor],
    ) -> StrategyOutcome {
        if strategies.is_empty() {
            return StrategyOutcome::no_strategies();
        }

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_extraction_start(reference.url().as_str(), strategies.len());
        }

        let deadline = Instant::now() + self.config.request_deadline();
        let mut attempts: Vec<StrategyFailure> = Vec::with_capacity(strategies.len());

        for (i, descriptor) in strategies.iter().enumerate() {
            let method = descriptor.method;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                attempts.push(StrategyFailure::new(
                    method,
                    FailureKind::Timeout,
                    format!(
                        "request deadline of {}ms exhausted before this strategy could start",
                        self.config.request_deadline_ms
                    ),
                ));
                break;
            }

            info!(
                "Attempt {}/{}: {} for {}",
                i + 1,
                strategies.len(),
                method,
                reference.url()
            );
            if let Some(cb) = callback {
                cb.on_strategy_start(method, i + 1, strategies.len());
            }

            match self.attempt(method, reference, remaining).await {
                Ok(result) => {
                    info!(
                        "Extracted {} slides from {} via {}",
                        result.slide_count,
                        reference.url(),
                        method
                    );
                    if let Some(cb) = callback {
                        cb.on_extraction_complete(method, result.slide_count);
                    }
                    return StrategyOutcome::Success(result);
                }
                Err(failure) => {
                    warn!("Strategy {} failed ({}): {}", method, failure.kind, failure.message);
                    if let Some(cb) = callback {
                        cb.on_strategy_failed(method, failure.kind, &failure.message);
                    }
                    let out_of_time = Instant::now() >= deadline;
                    attempts.push(failure);
                    if out_of_time {
                        debug!("Request deadline reached; skipping remaining strategies");
                        break;
                    }
                }
            }
        }

        match attempts.last().cloned() {
            Some(last) => StrategyOutcome::Failure { last, attempts },
            None => StrategyOutcome::no_strategies(),
        }
    }

    async fn attempt(
        &self,
        method: ExtractionMethod,
        reference: &DocumentReference,
        budget: Duration,
    ) -> Result<ExtractionResult, StrategyFailure> {
        match method {
            ExtractionMethod::Rendered => {
                let Some(engine) = self.engine.as_deref() else {
                    return Err(StrategyFailure::new(
                        method,
                        FailureKind::CapabilityUnavailable,
                        "no rendering engine is configured",
                    ));
                };
                extract_rendered(engine, reference, &self.config, budget).await
            }
            ExtractionMethod::StaticFetch => {
                let fetch = extract_static(self.fetcher.as_ref(), reference, &self.config, budget);
                match tokio::time::timeout(budget, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(StrategyFailure::new(
                        method,
                        FailureKind::Timeout,
                        format!("request deadline reached after {}ms", budget.as_millis()),
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{MockEngine, Script};
    use crate::error::EngineError;
    use crate::pipeline::fetch::{FetchError, FetchedPage};
    use crate::progress::{ExtractionProgressCallback, ProgressCallback};
    use async_trait::async_trait;
    use reqwest::Url;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const STATIC_DECK: &str = r#"<title>Static</title>
        <div class="slide">Static markup carries the whole story here.</div>"#;

    struct CannedFetcher {
        reply: Result<String, FetchError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl CannedFetcher {
        fn ok(markup: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(markup.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn err(kind: FailureKind, msg: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(FetchError::new(kind, msg)),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<FetchedPage, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map(|markup| FetchedPage {
                final_url: url.clone(),
                markup,
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ExtractionProgressCallback for Recorder {
        fn on_strategy_start(&self, method: ExtractionMethod, attempt: usize, total: usize) {
            self.events.lock().unwrap().push(format!("start {method} {attempt}/{total}"));
        }
        fn on_strategy_failed(&self, method: ExtractionMethod, kind: FailureKind, _message: &str) {
            self.events.lock().unwrap().push(format!("fail {method} {kind}"));
        }
        fn on_extraction_complete(&self, method: ExtractionMethod, slide_count: usize) {
            self.events.lock().unwrap().push(format!("done {method} {slide_count}"));
        }
    }

    fn docsend() -> DocumentReference {
        DocumentReference::parse("https://docsend.com/view/abc", None).unwrap()
    }

    fn both() -> Vec<StrategyDescriptor> {
        vec![StrategyDescriptor::RENDERED, StrategyDescriptor::STATIC_FETCH]
    }

    fn fast_config() -> ExtractionConfig {
        ExtractionConfig::builder()
            .challenge_probe_ms(50)
            .auth_submit_timeout_ms(50)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn falls_back_to_static_after_rendered_timeout() {
        let engine = Arc::new(MockEngine::new(Script {
            navigate_error: Some(EngineError::Timeout { elapsed_ms: 30_000 }),
            ..Script::default()
        }));
        let recorder = Arc::new(Recorder::default());
        let config = ExtractionConfig {
            progress_callback: Some(recorder.clone() as ProgressCallback),
            ..fast_config()
        };
        let chain = StrategyChain::new(
            config,
            Some(engine.clone() as Arc<dyn RenderingEngine>),
            CannedFetcher::ok(STATIC_DECK),
        );

        match chain.run(&docsend(), &both()).await {
            StrategyOutcome::Success(result) => {
                assert_eq!(result.method, ExtractionMethod::StaticFetch);
                assert_eq!(result.title, "Static");
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(engine.counters.closed.load(Ordering::SeqCst), 1);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                "start rendered 1/2",
                "fail rendered timeout",
                "start static-fetch 2/2",
                "done static-fetch 1",
            ]
        );
    }

    #[tokio::test]
    async fn missing_engine_still_attempts_static_fetch() {
        let fetcher = CannedFetcher::ok(STATIC_DECK);
        let chain = StrategyChain::new(fast_config(), None, fetcher.clone());
        let outcome = chain.run(&docsend(), &both()).await;
        assert!(outcome.is_success());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_reports_every_attempt_and_last_kind() {
        let engine = Arc::new(MockEngine::new(Script {
            html: "<div id=root></div>".into(),
            ..Script::default()
        }));
        let chain = StrategyChain::new(
            fast_config(),
            Some(engine.clone() as Arc<dyn RenderingEngine>),
            CannedFetcher::err(FailureKind::AccessDenied, "HTTP 403 Forbidden"),
        );

        match chain.run(&docsend(), &both()).await {
            StrategyOutcome::Failure { last, attempts } => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].kind, FailureKind::NoContentExtracted);
                assert_eq!(last.kind, FailureKind::AccessDenied);
                assert_eq!(last.method, Some(ExtractionMethod::StaticFetch));
                assert_eq!(attempts[1], last);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(engine.counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(engine.counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deadline_stops_the_chain() {
        let engine = Arc::new(MockEngine::new(Script {
            html: STATIC_DECK.into(),
            navigate_delay: Some(Duration::from_millis(500)),
            ..Script::default()
        }));
        let fetcher = CannedFetcher::ok(STATIC_DECK);
        let config = ExtractionConfig::builder()
            .request_deadline_ms(50)
            .build()
            .unwrap();
        let chain = StrategyChain::new(
            config,
            Some(engine.clone() as Arc<dyn RenderingEngine>),
            fetcher.clone(),
        );

        match chain.run(&docsend(), &both()).await {
            StrategyOutcome::Failure { last, attempts } => {
                assert_eq!(attempts.len(), 1);
                assert_eq!(last.kind, FailureKind::Timeout);
                assert_eq!(last.method, Some(ExtractionMethod::Rendered));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.counters.closed.load(Ordering::SeqCst), 1);
    }

    struct StalledEngine;

    #[async_trait]
    impl RenderingEngine for StalledEngine {
        async fn open_session(&self) -> Result<Box<dyn crate::engine::RenderSession>, EngineError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_engine_cannot_outlive_the_deadline() {
        let config = ExtractionConfig::builder()
            .request_deadline_ms(100)
            .build()
            .unwrap();
        let chain = StrategyChain::new(
            config,
            Some(Arc::new(StalledEngine) as Arc<dyn RenderingEngine>),
            CannedFetcher::ok(STATIC_DECK),
        );

        let outcome = tokio::time::timeout(Duration::from_secs(3), chain.run(&docsend(), &both()))
            .await
            .expect("chain must end at the request deadline");
        match outcome {
            StrategyOutcome::Failure { last, attempts } => {
                assert_eq!(attempts[0].kind, FailureKind::Timeout);
                assert_eq!(attempts[0].method, Some(ExtractionMethod::Rendered));
                assert_eq!(last.kind, FailureKind::Timeout);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_static_fetch_is_timeout() {
        let fetcher = Arc::new(CannedFetcher {
            reply: Ok(STATIC_DECK.to_string()),
            delay: Duration::from_millis(500),
            calls: AtomicUsize::new(0),
        });
        let config = ExtractionConfig::builder()
            .request_deadline_ms(30)
            .build()
            .unwrap();
        let chain = StrategyChain::new(config, None, fetcher);
        match chain.run(&docsend(), &[StrategyDescriptor::STATIC_FETCH]).await {
            StrategyOutcome::Failure { last, .. } => assert_eq!(last.kind, FailureKind::Timeout),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_strategy_list_is_a_failure() {
        let chain = StrategyChain::new(fast_config(), None, CannedFetcher::ok(STATIC_DECK));
        match chain.run(&docsend(), &[]).await {
            StrategyOutcome::Failure { last, attempts } => {
                assert_eq!(last.method, None);
                assert_eq!(attempts.len(), 1);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
