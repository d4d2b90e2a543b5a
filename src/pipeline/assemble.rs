//! Result assembly: one output shape whichever strategy succeeded.

use crate::output::{ExtractionResult, Slide};
use crate::strategy::ExtractionMethod;
use chrono::Utc;

/// Title used when the document offers neither a title nor a heading.
pub const DEFAULT_TITLE: &str = "Untitled Presentation";

/// Text of the slide substituted when assembly receives no slides.
pub const PLACEHOLDER_TEXT: &str =
    "No extractable slide content was found in this document.";

/// Title sources in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleCandidates {
    /// `<title>` or `og:title`.
    pub explicit: Option<String>,
    /// First `h1`/`h2`.
    pub heading: Option<String>,
}

impl TitleCandidates {
    /// First non-empty candidate, else [`DEFAULT_TITLE`].
    pub fn resolve(&self) -> String {
        [self.explicit.as_deref(), self.heading.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string()
    }
}

/// Build the final result.
///
/// Slides are renumbered `1..=n` in the order given; an empty input yields a
/// single placeholder slide so a result never has zero slides.
pub fn assemble(
    titles: &TitleCandidates,
    slides: Vec<Slide>,
    method: ExtractionMethod,
) -> ExtractionResult {
    let mut slides: Vec<Slide> = slides
        .into_iter()
        .enumerate()
        .map(|(i, s)| Slide { index: i + 1, ..s })
        .collect();

    if slides.is_empty() {
        slides.push(Slide {
            index: 1,
            text: PLACEHOLDER_TEXT.to_string(),
            images: Vec::new(),
        });
    }

    ExtractionResult {
        title: titles.resolve(),
        slide_count: slides.len(),
        slides,
        extracted_at: Utc::now(),
        method,
    }
}
