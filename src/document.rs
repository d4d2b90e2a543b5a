//! Read-only document model shared by fetched and rendered pages.
//!
//! The extractor's heuristics only need four queries: the explicit title,
//! the first heading, containers matching a selector list (with their
//! visible text and images), and the whole document's visible text and
//! images. [`DocumentModel`] captures exactly that, and [`HtmlDocument`]
//! implements it over an HTML5 parse of the markup. Rendered sessions hand
//! back their serialised DOM, so both strategies go through the same parser
//! and the same heuristics.
//!
//! `HtmlDocument` is not `Send`; parse, query and drop it between two await
//! points.

use crate::pipeline::postprocess::{char_len, clean_text, filter_image_refs};
use reqwest::Url;
use scraper::node::Element as HtmlElement;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// One matched container with its collected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Normalised visible text.
    pub text: String,
    /// Resolved, deduplicated image references in document order.
    pub images: Vec<String>,
}

/// The query surface the content extractor relies on.
pub trait DocumentModel {
    /// Text of the explicit title (`<title>`, then `og:title`), if non-empty.
    fn title(&self) -> Option<String>;

    /// Text of the first `h1`, else the first `h2`, if non-empty.
    fn first_heading(&self) -> Option<String>;

    /// Containers matching any of `selectors`, in document order.
    ///
    /// Each node appears at most once. Matches with fewer than
    /// `min_text_len` characters of visible text are dropped first; of the
    /// rest, only the innermost match is returned when matches nest, so text
    /// is never counted twice.
    fn containers(&self, selectors: &[&str], min_text_len: usize) -> Vec<Container>;

    /// Visible text of the whole body.
    fn body_text(&self) -> String;

    /// Every image reference in the document.
    fn images(&self) -> Vec<String>;
}

/// An HTML document parsed with `scraper`.
pub struct HtmlDocument {
    html: Html,
    base_url: Option<Url>,
}

impl HtmlDocument {
    /// Parse `markup`. `base_url` resolves relative image references; without
    /// it only absolute references survive.
    pub fn parse(markup: &str, base_url: Option<&Url>) -> Self {
        Self {
            html: Html::parse_document(markup),
            base_url: base_url.cloned(),
        }
    }

    fn first_text(&self, selector: &str) -> Option<String> {
        let sel = parse_selector(selector)?;
        self.html
            .select(&sel)
            .map(|el| clean_text(&visible_text(el)))
            .find(|t| !t.is_empty())
    }

    fn meta_content(&self, selector: &str) -> Option<String> {
        let sel = parse_selector(selector)?;
        self.html
            .select(&sel)
            .filter_map(|el| el.value().attr("content"))
            .map(clean_text)
            .find(|t| !t.is_empty())
    }

    fn images_under(&self, root: ElementRef<'_>) -> Vec<String> {
        let Some(sel) = parse_selector("img") else {
            return Vec::new();
        };
        let mut raw: Vec<&str> = Vec::new();
        if root.value().name() == "img" {
            raw.extend(image_source(root.value()));
        }
        raw.extend(
            root.select(&sel)
                .filter(|img| !is_hidden(img.value()))
                .filter_map(|img| image_source(img.value())),
        );
        filter_image_refs(raw, self.base_url.as_ref())
    }
}

impl DocumentModel for HtmlDocument {
    fn title(&self) -> Option<String> {
        self.first_text("head > title")
            .or_else(|| self.first_text("title"))
            .or_else(|| self.meta_content(r#"meta[property="og:title"]"#))
    }

    fn first_heading(&self) -> Option<String> {
        self.first_text("body h1").or_else(|| self.first_text("body h2"))
    }

    fn containers(&self, selectors: &[&str], min_text_len: usize) -> Vec<Container> {
        let parsed: Vec<Selector> = selectors.iter().filter_map(|s| parse_selector(s)).collect();
        if parsed.is_empty() {
            return Vec::new();
        }

        // A page-number badge inside a slide must not demote the slide to a
        // wrapper, so short matches go before nesting is resolved.
        let matched: HashMap<_, _> = parsed
            .iter()
            .flat_map(|sel| self.html.select(sel))
            .filter(|el| is_rendered(*el))
            .map(|el| (el.id(), clean_text(&visible_text(el))))
            .filter(|(_, text)| char_len(text) >= min_text_len)
            .collect();

        // Any match that contains another match is a wrapper, not a slide.
        let mut wrappers = HashSet::new();
        for id in matched.keys() {
            if let Some(node) = self.html.tree.get(*id) {
                wrappers.extend(node.ancestors().map(|a| a.id()).filter(|a| matched.contains_key(a)));
            }
        }

        self.html
            .root_element()
            .descendants()
            .filter(|n| !wrappers.contains(&n.id()))
            .filter_map(|n| Some((matched.get(&n.id())?, ElementRef::wrap(n)?)))
            .map(|(text, el)| Container {
                text: text.clone(),
                images: self.images_under(el),
            })
            .collect()
    }

    fn body_text(&self) -> String {
        let body = parse_selector("body").and_then(|sel| self.html.select(&sel).next());
        let root = body.unwrap_or_else(|| self.html.root_element());
        clean_text(&visible_text(root))
    }

    fn images(&self) -> Vec<String> {
        self.images_under(self.html.root_element())
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!("Ignoring invalid selector '{}': {}", selector, e);
            None
        }
    }
}

/// Elements whose text never reaches the reader.
const NON_VISIBLE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "svg", "canvas", "iframe", "object",
];

/// Elements that start a new line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tr", "td", "th", "ul",
];

fn is_hidden(el: &HtmlElement) -> bool {
    if NON_VISIBLE_TAGS.contains(&el.name()) {
        return true;
    }
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    })
}

/// False when the element or any ancestor is hidden.
fn is_rendered(el: ElementRef<'_>) -> bool {
    !is_hidden(el.value())
        && !el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| is_hidden(a.value()))
}

/// Visible text of `root`, with block boundaries turned into newlines.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(root, &mut out);
    out
}

fn collect_text(node: ElementRef<'_>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if is_hidden(el) {
                    continue;
                }
                if el.name() == "br" {
                    out.push('\n');
                    continue;
                }
                // Inline siblings like `<span>a</span><span>b</span>` are
                // separate words on rendered slides.
                let sep = if BLOCK_TAGS.contains(&el.name()) { '\n' } else { ' ' };
                out.push(sep);
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                out.push(sep);
            }
            _ => {}
        }
    }
}

/// Best source attribute of an `<img>`, lazy-loading attributes first.
fn image_source(el: &HtmlElement) -> Option<&str> {
    ["data-src", "data-lazy-src", "data-original", "src"]
        .iter()
        .filter_map(|attr| el.attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(markup: &str) -> HtmlDocument {
        let base = Url::parse("https://decks.example.org/view/abc").unwrap();
        HtmlDocument::parse(markup, Some(&base))
    }

    #[test]
    fn title_prefers_title_element_then_og_title() {
        let d = doc("<html><head><title> Series A </title></head><body></body></html>");
        assert_eq!(d.title().as_deref(), Some("Series A"));

        let d = doc(r#"<html><head><meta property="og:title" content="OG Deck"></head><body></body></html>"#);
        assert_eq!(d.title().as_deref(), Some("OG Deck"));

        let d = doc("<html><head></head><body><p>x</p></body></html>");
        assert_eq!(d.title(), None);
    }

    #[test]
    fn first_heading_falls_back_to_h2() {
        let d = doc("<body><h2>Agenda</h2><h1></h1></body>");
        assert_eq!(d.first_heading().as_deref(), Some("Agenda"));
    }

    #[test]
    fn containers_skip_scripts_and_hidden_nodes() {
        let d = doc(
            r#"<body><div class="slide">Visible words<script>var x = 1;</script>
               <span hidden>secret</span><span style="display: none">gone</span></div></body>"#,
        );
        let found = d.containers(&[".slide"], 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Visible words");
    }

    #[test]
    fn containers_are_deduplicated_across_selectors() {
        let d = doc(r#"<body><div class="slide" data-slide="1">Only once</div></body>"#);
        let found = d.containers(&[".slide", "[data-slide]"], 0);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn nested_matches_keep_innermost() {
        let d = doc(
            r#"<body><section class="slide"><section class="slide">Inner A</section>
               <section class="slide">Inner B</section></section></body>"#,
        );
        let found = d.containers(&[".slide"], 0);
        let texts: Vec<&str> = found.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Inner A", "Inner B"]);
    }

    #[test]
    fn short_nested_match_does_not_hide_its_slide() {
        let d = doc(
            r#"<body><div class="slide">Market sizing for the next decade<span class="page">1</span></div>
               <div class="slide">Team with two prior exits<span class="page">2</span></div></body>"#,
        );
        let found = d.containers(&[".slide", ".page"], 12);
        let texts: Vec<&str> = found.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Market sizing for the next decade 1", "Team with two prior exits 2"]
        );
    }

    #[test]
    fn images_resolve_relative_and_prefer_lazy_source() {
        let d = doc(
            r#"<body><div class="page"><img src="/a.png"><img data-src="b.png" src="data:image/gif;base64,R0lG">
               <img src="https://cdn.example.org/c.jpg"><img src="/a.png"></div></body>"#,
        );
        let found = d.containers(&[".page"], 0);
        assert_eq!(
            found[0].images,
            vec![
                "https://decks.example.org/a.png".to_string(),
                "https://decks.example.org/view/b.png".to_string(),
                "https://cdn.example.org/c.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn body_text_separates_blocks_and_inline_spans() {
        let d = doc("<body><p>Hello<b>world</b></p><p>Second</p><style>p{}</style></body>");
        assert_eq!(d.body_text(), "Hello world\nSecond");
    }

    #[test]
    fn invalid_selector_is_ignored() {
        let d = doc(r#"<body><div class="slide">Still found here</div></body>"#);
        let found = d.containers(&["[[[", ".slide"], 0);
        assert_eq!(found.len(), 1);
    }
}
