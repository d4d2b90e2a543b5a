//! Output types: the serialised extraction contract.
//!
//! The JSON shape is the only persisted contract of this crate:
//!
//! ```json
//! {
//!   "title": "Series A Deck",
//!   "slideCount": 2,
//!   "slides": [{ "slideNumber": 1, "text": "…", "images": ["https://…"] }],
//!   "extractedAt": "2026-10-18T09:30:00Z",
//!   "method": "rendered"
//! }
//! ```

use crate::strategy::ExtractionMethod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page-like unit of a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-indexed position within the result.
    #[serde(rename = "slideNumber")]
    pub index: usize,
    /// Normalised visible text.
    pub text: String,
    /// Absolute image URLs in document order.
    pub images: Vec<String>,
}

/// A normalised extraction, identical in shape whichever strategy produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub title: String,
    /// Always equal to `slides.len()`.
    pub slide_count: usize,
    pub slides: Vec<Slide>,
    pub extracted_at: DateTime<Utc>,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    /// Concatenated slide text, one slide per paragraph.
    pub fn full_text(&self) -> String {
        self.slides
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Total image references across all slides.
    pub fn image_count(&self) -> usize {
        self.slides.iter().map(|s| s.images.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtractionResult {
        ExtractionResult {
            title: "Deck".into(),
            slide_count: 2,
            slides: vec![
                Slide {
                    index: 1,
                    text: "First slide text".into(),
                    images: vec!["https://cdn.example.org/a.png".into()],
                },
                Slide {
                    index: 2,
                    text: "Second slide text".into(),
                    images: vec![],
                },
            ],
            extracted_at: DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            method: ExtractionMethod::Rendered,
        }
    }

    #[test]
    fn serialises_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["title"], "Deck");
        assert_eq!(json["slideCount"], 2);
        assert_eq!(json["slides"][0]["slideNumber"], 1);
        assert_eq!(json["slides"][0]["images"][0], "https://cdn.example.org/a.png");
        assert_eq!(json["method"], "rendered");
        assert!(json["extractedAt"].as_str().unwrap().starts_with("2026-10-18T09:30:00"));
    }

    #[test]
    fn full_text_and_image_count() {
        let r = sample();
        assert_eq!(r.full_text(), "First slide text\n\nSecond slide text");
        assert_eq!(r.image_count(), 1);
    }
}
