//! Post-processing: deterministic cleanup of extracted text and image lists.
//!
//! Text pulled out of a DOM carries layout artefacts: indentation from the
//! markup, runs of blank lines between absolutely-positioned boxes,
//! zero-width characters that slide editors sprinkle for kerning, and
//! non-breaking spaces. Image lists carry lazy-loading placeholders,
//! tracking pixels and duplicates. The rules here remove those without
//! touching content, so the significance threshold and the chunker see
//! what a reader would see.
//!
//! ## Rule Order
//!
//! Text: normalise line endings before stripping invisible characters, and
//! strip those before collapsing whitespace so a zero-width space between two
//! spaces does not leave a double space behind.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::collections::HashSet;

/// Apply all text cleanup rules.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Collapse horizontal whitespace (including NBSP) within each line
/// 4. Trim each line and drop empty lines
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    s.lines()
        .map(collapse_inline_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of characters in `text`, the unit every length threshold uses.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3 + 4: Collapse whitespace within a line, then trim ────────────────

static RE_INLINE_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{00A0}\u{2000}-\u{200A}\u{202F}\u{3000}]+").unwrap());

fn collapse_inline_whitespace(line: &str) -> String {
    RE_INLINE_WS.replace_all(line, " ").trim().to_string()
}

// ── Image references ─────────────────────────────────────────────────────────
//
// Slide viewers lazy-load page images: the `src` is often a 1×1 GIF data URI
// or a spinner until script swaps in the real URL. We keep a reference only
// when it resolves to an absolute HTTP(S) URL that does not look like a
// placeholder or tracking pixel.

/// Substrings that mark an image URL as a placeholder or beacon.
const PLACEHOLDER_MARKERS: &[&str] = &[
    "spacer.gif",
    "blank.gif",
    "pixel.gif",
    "1x1.",
    "transparent.png",
    "loading.gif",
    "spinner",
    "/pixel?",
    "/beacon",
];

fn is_placeholder_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m))
}

/// Resolve, filter and deduplicate raw image references, keeping document order.
///
/// Relative references need `base`; without it they are dropped.
pub fn filter_image_refs<'a, I>(raw: I, base: Option<&Url>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|r| resolve_image_ref(r.trim(), base))
        .filter(|u| !is_placeholder_url(u))
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

fn resolve_image_ref(raw: &str, base: Option<&Url>) -> Option<String> {
    if raw.is_empty() || raw.starts_with("data:") || raw.starts_with("blob:") {
        return None;
    }
    let url = match Url::parse(raw) {
        Ok(u) => u,
        Err(_) => base?.join(raw).ok()?,
    };
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
