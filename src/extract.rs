//! Extraction entry points.
//!
//! [`Extractor`] is the service value: build it once with its collaborators
//! (an optional rendering engine and a page fetcher) and share it by
//! reference across requests. The free functions below wrap a default
//! extractor for one-off use.

use crate::chain::StrategyChain;
use crate::config::ExtractionConfig;
use crate::engine::RenderingEngine;
use crate::error::{ExtractError, FailureKind, StrategyFailure};
use crate::output::ExtractionResult;
use crate::pipeline::assemble::assemble;
use crate::pipeline::classify::classify;
use crate::pipeline::extract::extract_markup;
use crate::pipeline::fetch::{HttpFetcher, PageFetcher};
use crate::reference::DocumentReference;
use crate::strategy::{ExtractionMethod, StrategyDescriptor, StrategyOutcome};
use futures::stream::{self, StreamExt};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Extracts slides from document references.
///
/// Stateless between requests; cloning is cheap and clones share the same
/// engine and fetcher.
#[derive(Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    engine: Option<Arc<dyn RenderingEngine>>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Extractor {
    /// An extractor with the default HTTP fetcher and no rendering engine.
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractError> {
        let fetcher = HttpFetcher::new(&config.user_agent)
            .map_err(|e| ExtractError::Internal(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            config,
            engine: None,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Plug in a rendering engine so client-rendered viewers can be loaded.
    pub fn with_engine(mut self, engine: Arc<dyn RenderingEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Replace the page fetcher used by the static strategy.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// The strategies that [`Extractor::extract`] would try, in order.
    pub fn plan(&self, reference: &DocumentReference) -> Vec<StrategyDescriptor> {
        classify(reference, self.engine.is_some(), &self.config)
    }

    /// Extract slides from `reference`.
    ///
    /// # Errors
    /// [`ExtractError::AllStrategiesFailed`] when no strategy produced a
    /// slide; its `kind` is the last attempt's classification.
    pub async fn extract(
        &self,
        reference: &DocumentReference,
    ) -> Result<ExtractionResult, ExtractError> {
        let strategies = self.plan(reference);
        debug!(
            "Strategies for {}: {}",
            reference.url(),
            strategies
                .iter()
                .map(|s| s.method.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        let chain = StrategyChain::new(
            self.config.clone(),
            self.engine.clone(),
            Arc::clone(&self.fetcher),
        );
        outcome_to_result(chain.run(reference, &strategies).await)
    }

    /// Parse `url` (and optional credential) and extract it.
    pub async fn extract_url(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<ExtractionResult, ExtractError> {
        let reference = DocumentReference::parse(url, credential)?;
        self.extract(&reference).await
    }

    /// Extract many references, at most `concurrency` at a time.
    ///
    /// Results come back in input order.
    pub async fn extract_many(
        &self,
        references: &[DocumentReference],
    ) -> Vec<Result<ExtractionResult, ExtractError>> {
        info!(
            "Extracting {} documents (concurrency {})",
            references.len(),
            self.config.concurrency
        );
        let mut indexed: Vec<(usize, Result<ExtractionResult, ExtractError>)> =
            stream::iter(references.iter().enumerate())
                .map(|(i, reference)| async move { (i, self.extract(reference).await) })
                .buffer_unordered(self.config.concurrency)
                .collect()
                .await;
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, r)| r).collect()
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .field("rendering_available", &self.engine.is_some())
            .finish()
    }
}

/// Collapse a chain outcome into the public result type.
pub(crate) fn outcome_to_result(outcome: StrategyOutcome) -> Result<ExtractionResult, ExtractError> {
    match outcome {
        StrategyOutcome::Success(result) => Ok(result),
        StrategyOutcome::Failure { last, attempts } => Err(ExtractError::AllStrategiesFailed {
            method: last
                .method
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "chain".to_string()),
            kind: last.kind,
            message: last.message,
            attempts: attempts.len(),
            history: StrategyOutcome::history(&attempts),
        }),
    }
}

/// Extract slides from `url` with a default extractor (static fetch only).
///
/// # Example
/// ```rust,no_run
/// use deckscrape::{extract, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let result = extract("https://example.org/deck.html", None, &config).await?;
/// println!("{}: {} slides", result.title, result.slide_count);
/// # Ok(())
/// # }
/// ```
pub async fn extract(
    url: impl AsRef<str>,
    credential: Option<&str>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    Extractor::new(config.clone())?
        .extract_url(url.as_ref(), credential)
        .await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    url: impl AsRef<str>,
    credential: Option<&str>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(url, credential, config))
}

/// Extract and write the result as pretty JSON to `output_path`.
///
/// Uses atomic write (temp file + rename) so readers never see a partial file.
pub async fn extract_to_file(
    url: impl AsRef<str>,
    credential: Option<&str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    let result = extract(url, credential, config).await?;
    write_json(&result, output_path.as_ref()).await?;
    Ok(result)
}

/// Write `result` as pretty JSON to `path` atomically.
pub async fn write_json(result: &ExtractionResult, path: &Path) -> Result<(), ExtractError> {
    let write_err = |source: std::io::Error| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(result)
        .map_err(|e| ExtractError::Internal(format!("JSON serialisation failed: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    info!("Wrote {} slides to {}", result.slide_count, path.display());
    Ok(())
}

/// Extract slides from markup already in hand, without any network access.
///
/// `base_url`, when given, resolves relative image references. The result
/// is reported as [`ExtractionMethod::StaticFetch`].
pub fn extract_html(
    markup: &str,
    base_url: Option<&str>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    let base = match base_url {
        Some(raw) => Some(Url::parse(raw).map_err(|e| ExtractError::InvalidReference {
            input: raw.to_string(),
            reason: e.to_string(),
        })?),
        None => None,
    };

    match extract_markup(markup, base.as_ref(), config) {
        Some(content) => Ok(assemble(
            &content.titles,
            content.slides,
            ExtractionMethod::StaticFetch,
        )),
        None => {
            let last = StrategyFailure::new(
                ExtractionMethod::StaticFetch,
                FailureKind::NoContentExtracted,
                "markup contained no slide-like content",
            );
            outcome_to_result(StrategyOutcome::Failure {
                attempts: vec![last.clone()],
                last,
            })
        }
    }
}

/// Extract every URL in `urls` with a default extractor.
///
/// Invalid URLs yield `Err(InvalidReference)` in their slot; results come
/// back in input order.
pub async fn extract_many<I, S>(
    urls: I,
    config: &ExtractionConfig,
) -> Result<Vec<Result<ExtractionResult, ExtractError>>, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let extractor = Extractor::new(config.clone())?;
    let parsed: Vec<Result<DocumentReference, ExtractError>> = urls
        .into_iter()
        .map(|u| DocumentReference::parse(u.as_ref(), None))
        .collect();
    let valid: Vec<DocumentReference> = parsed.iter().filter_map(|p| p.as_ref().ok().cloned()).collect();

    let mut extracted = extractor.extract_many(&valid).await.into_iter();
    let mut results = Vec::with_capacity(parsed.len());
    for slot in parsed {
        match slot {
            Ok(_) => results.extend(extracted.next()),
            Err(e) => results.push(Err(e)),
        }
    }
    Ok(results)
}
