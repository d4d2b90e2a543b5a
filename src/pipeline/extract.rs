//! Content extraction: recover slides from a loaded document model.
//!
//! Three heuristics run in order of fidelity, each only when the previous
//! one produced no usable slide:
//!
//! 1. **Structural**: elements that viewers use as slide/page containers.
//! 2. **Semantic**: generic sectioning elements (`article`, `section`, `main`).
//! 3. **Chunked**: the whole visible body text packed by [`chunk`]; the
//!    document's images go on the first chunk only, because which image
//!    belonged to which part of the text is lost once structure is gone.
//!
//! Every candidate must clear `min_slide_text_len` characters before it
//! becomes a slide.

use crate::config::ExtractionConfig;
use crate::document::{Container, DocumentModel, HtmlDocument};
use crate::output::Slide;
use crate::pipeline::assemble::TitleCandidates;
use crate::pipeline::chunk::chunk;
use crate::pipeline::postprocess::char_len;
use reqwest::Url;
use tracing::debug;

/// Selectors that viewers and slide tools put on one-per-slide containers.
pub const STRUCTURAL_SELECTORS: &[&str] = &[
    ".slide",
    ".page",
    ".page-view",
    ".preso-view",
    "[data-slide]",
    "[data-slide-index]",
    "[data-page]",
    "[data-page-number]",
    "[data-testid*=slide]",
    "[role=slide]",
];

/// Generic sectioning selectors tried when no structural container matched.
pub const SEMANTIC_SELECTORS: &[&str] = &["article", "section", "main", "[role=main]"];

/// Which heuristic produced the slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    Structural,
    Semantic,
    Chunked,
}

/// What the extractor recovered from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub titles: TitleCandidates,
    /// Slides numbered `1..=n`.
    pub slides: Vec<Slide>,
    pub heuristic: Heuristic,
}

/// Run the heuristics against `doc`. `None` means nothing cleared the
/// significance threshold.
pub fn extract(doc: &dyn DocumentModel, config: &ExtractionConfig) -> Option<ExtractedContent> {
    let titles = TitleCandidates {
        explicit: doc.title(),
        heading: doc.first_heading(),
    };

    let (slides, heuristic) = structural(doc, config)
        .map(|s| (s, Heuristic::Structural))
        .or_else(|| semantic(doc, config).map(|s| (s, Heuristic::Semantic)))
        .or_else(|| chunked(doc, config).map(|s| (s, Heuristic::Chunked)))?;

    debug!("Recovered {} slides via {:?} heuristic", slides.len(), heuristic);
    Some(ExtractedContent {
        titles,
        slides,
        heuristic,
    })
}

/// Parse `markup` and run [`extract`] on it.
///
/// The parsed tree is not `Send`, so it lives only inside this call; async
/// callers get owned output they can hold across an await.
pub fn extract_markup(
    markup: &str,
    base_url: Option<&Url>,
    config: &ExtractionConfig,
) -> Option<ExtractedContent> {
    let doc = HtmlDocument::parse(markup, base_url);
    extract(&doc, config)
}

fn structural(doc: &dyn DocumentModel, config: &ExtractionConfig) -> Option<Vec<Slide>> {
    non_empty(from_containers(doc.containers(STRUCTURAL_SELECTORS, config.min_slide_text_len), config))
}

fn semantic(doc: &dyn DocumentModel, config: &ExtractionConfig) -> Option<Vec<Slide>> {
    non_empty(from_containers(doc.containers(SEMANTIC_SELECTORS, config.min_slide_text_len), config))
}

fn chunked(doc: &dyn DocumentModel, config: &ExtractionConfig) -> Option<Vec<Slide>> {
    let texts: Vec<String> = chunk(&doc.body_text(), config.chunk_max_len, config.chunk_max_chunks)
        .into_iter()
        .filter(|t| is_significant(t, config))
        .collect();
    if texts.is_empty() {
        return None;
    }

    let mut images = doc.images();
    images.truncate(config.max_images_per_slide);

    let slides = texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Slide {
            index: i + 1,
            text,
            images: if i == 0 { std::mem::take(&mut images) } else { Vec::new() },
        })
        .collect();
    Some(slides)
}

fn from_containers(containers: Vec<Container>, config: &ExtractionConfig) -> Vec<Slide> {
    containers
        .into_iter()
        .filter(|c| is_significant(&c.text, config))
        .enumerate()
        .map(|(i, mut c)| {
            c.images.truncate(config.max_images_per_slide);
            Slide {
                index: i + 1,
                text: c.text,
                images: c.images,
            }
        })
        .collect()
}

fn is_significant(text: &str, config: &ExtractionConfig) -> bool {
    char_len(text.trim()) >= config.min_slide_text_len
}

fn non_empty(slides: Vec<Slide>) -> Option<Vec<Slide>> {
    if slides.is_empty() {
        None
    } else {
        Some(slides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(markup: &str) -> Option<ExtractedContent> {
        let base = Url::parse("https://docsend.com/view/abc").unwrap();
        extract_markup(markup, Some(&base), &ExtractionConfig::default())
    }

    #[test]
    fn structural_filters_insignificant_containers() {
        let html = r#"<html><head><title>Deck</title></head><body>
            <div class="slide">Our mission is to make extraction boring.</div>
            <div class="slide">1 / 3</div>
            <div class="slide">   </div>
        </body></html>"#;
        let out = run(html).unwrap();
        assert_eq!(out.heuristic, Heuristic::Structural);
        assert_eq!(out.slides.len(), 1);
        assert_eq!(out.slides[0].index, 1);
        assert_eq!(out.slides[0].text, "Our mission is to make extraction boring.");
        assert_eq!(out.titles.explicit.as_deref(), Some("Deck"));
    }

    #[test]
    fn structural_collects_capped_images_per_slide() {
        let imgs: String = (0..15).map(|i| format!(r#"<img src="/p/{i}.png">"#)).collect();
        let html = format!(
            r#"<body><div class="page">{imgs}<p>Page one has plenty of words.</p></div>
               <div class="page"><img src="/q.png"><p>Page two has plenty of words.</p></div></body>"#
        );
        let out = run(&html).unwrap();
        assert_eq!(out.slides.len(), 2);
        assert_eq!(out.slides[0].images.len(), 10);
        assert_eq!(out.slides[0].images[0], "https://docsend.com/p/0.png");
        assert_eq!(out.slides[1].images, vec!["https://docsend.com/q.png".to_string()]);
        assert_eq!(out.slides[1].index, 2);
    }

    #[test]
    fn page_badges_inside_slides_keep_structural_slides() {
        let html = r#"<body>
            <div class="slide"><h2>Market</h2><p>Forty billion dollar market by 2030.</p><span class="page">1</span></div>
            <div class="slide"><h2>Team</h2><p>Founders shipped two developer tools.</p><span class="page">2</span></div>
        </body>"#;
        let out = run(html).unwrap();
        assert_eq!(out.heuristic, Heuristic::Structural);
        assert_eq!(out.slides.len(), 2);
        assert!(out.slides[0].text.starts_with("Market"));
        assert!(out.slides[1].text.starts_with("Team"));
    }

    #[test]
    fn semantic_used_when_no_structural_containers() {
        let html = r#"<body><nav>Home</nav>
            <section><h2>Problem</h2><p>Decks are locked behind viewers.</p></section>
            <section><h2>Solution</h2><p>Extract them into structured slides.</p></section>
        </body>"#;
        let out = run(html).unwrap();
        assert_eq!(out.heuristic, Heuristic::Semantic);
        assert_eq!(out.slides.len(), 2);
        assert!(out.slides[0].text.starts_with("Problem"));
        assert_eq!(out.titles.heading.as_deref(), Some("Problem"));
    }

    #[test]
    fn structural_below_threshold_falls_through_to_semantic() {
        let html = r#"<body><div class="slide">tiny</div>
            <article>An article body that is comfortably long enough.</article></body>"#;
        let out = run(html).unwrap();
        assert_eq!(out.heuristic, Heuristic::Semantic);
        assert_eq!(out.slides.len(), 1);
    }

    #[test]
    fn chunked_fallback_splits_body_text() {
        let body = (0..350).map(|_| "abcdefghi").collect::<Vec<_>>().join(" ");
        let html = format!(
            r#"<html><body><div><img src="/cover.png"><p>{body}</p><img src="/end.png"></div></body></html>"#
        );
        let out = run(&html).unwrap();
        assert_eq!(out.heuristic, Heuristic::Chunked);
        assert_eq!(out.slides.len(), 3);
        let indices: Vec<usize> = out.slides.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(
            out.slides[0].images,
            vec![
                "https://docsend.com/cover.png".to_string(),
                "https://docsend.com/end.png".to_string()
            ]
        );
        assert!(out.slides[1].images.is_empty());
        let rejoined: Vec<&str> = out
            .slides
            .iter()
            .flat_map(|s| s.text.split_whitespace())
            .collect();
        assert_eq!(rejoined.len(), 350);
        assert!(rejoined.iter().all(|w| *w == "abcdefghi"));
    }

    #[test]
    fn nothing_significant_returns_none() {
        assert!(run("<body><div>hi</div><script>var a = 'long long long long long';</script></body>").is_none());
        assert!(run("").is_none());
    }
}
