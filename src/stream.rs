//! Streaming batch API: emit results as each document completes.
//!
//! Unlike [`crate::extract::Extractor::extract_many`], which returns once
//! every document is done, [`extract_stream`] yields each
//! [`StreamedExtraction`] as soon as its document finishes. Items arrive in
//! completion order; `position` gives the input index.

use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::output::ExtractionResult;
use crate::reference::DocumentReference;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// One finished document from [`extract_stream`].
#[derive(Debug)]
pub struct StreamedExtraction {
    /// Index of the reference in the input.
    pub position: usize,
    /// The URL that was extracted.
    pub url: String,
    pub result: Result<ExtractionResult, ExtractError>,
}

/// A boxed stream of finished extractions.
pub type ExtractionStream = Pin<Box<dyn Stream<Item = StreamedExtraction> + Send>>;

/// Extract `references` concurrently (bounded by the extractor's
/// `concurrency`), yielding each result as it completes.
pub fn extract_stream(extractor: Extractor, references: Vec<DocumentReference>) -> ExtractionStream {
    let concurrency = extractor.config().concurrency;
    info!(
        "Starting streaming extraction of {} documents (concurrency {})",
        references.len(),
        concurrency
    );

    let s = stream::iter(references.into_iter().enumerate())
        .map(move |(position, reference)| {
            let extractor = extractor.clone();
            async move {
                let result = extractor.extract(&reference).await;
                StreamedExtraction {
                    position,
                    url: reference.url().to_string(),
                    result,
                }
            }
        })
        .buffer_unordered(concurrency);

    Box::pin(s)
}
