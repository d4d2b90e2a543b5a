//! Static fetch: download a page's markup without running its scripts.
//!
//! The degraded path that every strategy list ends with. It sees what a
//! crawler sees, which for server-rendered decks is everything and for
//! script-built viewers is usually an empty shell.

use crate::config::ExtractionConfig;
use crate::error::{status_kind, FailureKind, StrategyFailure};
use crate::output::ExtractionResult;
use crate::pipeline::assemble::assemble;
use crate::pipeline::extract::extract_markup;
use crate::reference::DocumentReference;
use crate::strategy::ExtractionMethod;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// A fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects; relative references resolve against it.
    pub final_url: Url,
    pub markup: String,
}

/// Why a fetch failed, already classified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Retrieves raw markup for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// Largest body [`HttpFetcher`] reads by default (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// [`PageFetcher`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Build a client that sends `user_agent` and follows redirects.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::new(FailureKind::CapabilityUnavailable, e.to_string()))?;
        Ok(Self::from_client(client))
    }

    /// Wrap an existing client (shared connection pool, custom TLS).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Refuse bodies larger than `n` bytes (minimum 1).
    pub fn max_body_bytes(mut self, n: usize) -> Self {
        self.max_body_bytes = n.max(1);
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        info!("Fetching markup from: {}", url);

        let mut response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest(url, timeout, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                status_kind(status.as_u16()),
                format!("HTTP {} from {}", status, url),
            ));
        }

        let too_large = || {
            FetchError::new(
                FailureKind::TransportFailure,
                format!("response from {} exceeds {} bytes", url, self.max_body_bytes),
            )
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(too_large());
        }

        let final_url = response.url().clone();
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| classify_reqwest(url, timeout, &e))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        let markup = String::from_utf8_lossy(&body).into_owned();

        debug!("Fetched {} bytes from {}", markup.len(), final_url);
        Ok(FetchedPage { final_url, markup })
    }
}

/// Run the static-fetch strategy for `reference`.
///
/// The per-request timeout is the smaller of `fetch_timeout_ms` and what is
/// left of the request deadline.
pub async fn extract_static(
    fetcher: &dyn PageFetcher,
    reference: &DocumentReference,
    config: &ExtractionConfig,
    budget: Duration,
) -> Result<ExtractionResult, StrategyFailure> {
    const METHOD: ExtractionMethod = ExtractionMethod::StaticFetch;

    if reference.credential().is_some() {
        debug!("Static fetch cannot answer credential prompts; credential unused");
    }

    let page = fetcher
        .fetch(reference.url(), config.fetch_timeout().min(budget))
        .await
        .map_err(|e| StrategyFailure::new(METHOD, e.kind, e.message))?;

    let content = extract_markup(&page.markup, Some(&page.final_url), config).ok_or_else(|| {
        StrategyFailure::new(
            METHOD,
            FailureKind::NoContentExtracted,
            format!("no slide-like content in markup from {}", page.final_url),
        )
    })?;

    info!(
        "Static extraction recovered {} slides via {:?}",
        content.slides.len(),
        content.heuristic
    );
    Ok(assemble(&content.titles, content.slides, METHOD))
}

fn classify_reqwest(url: &Url, timeout: Duration, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::new(
            FailureKind::Timeout,
            format!("fetch of {} timed out after {}ms", url, timeout.as_millis()),
        )
    } else if let Some(status) = e.status() {
        FetchError::new(status_kind(status.as_u16()), format!("HTTP {status} from {url}"))
    } else {
        FetchError::new(
            FailureKind::TransportFailure,
            format!("fetch of {url} failed: {e}"),
        )
    }
}
