//! # deckscrape
//!
//! Extract slide text and images from web-hosted presentation decks.
//!
//! ## Why this crate?
//!
//! Deck viewers (DocSend, Pitch, Gamma, Google Slides, …) mostly build their
//! pages in client-side script, so a plain HTTP GET returns an empty shell.
//! Others serve ordinary HTML. This crate picks an ordered list of access
//! strategies for each URL, tries them one at a time, and recovers per-slide
//! text and image references with the same heuristics whichever strategy
//! loaded the page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL (+ optional credential)
//!  │
//!  ├─ 1. Classify  known viewer? → [rendered, static-fetch] else [static-fetch]
//!  ├─ 2. Access    rendering session (navigate, settle, answer password prompt)
//!  │               or plain fetch; fall back on failure, within one deadline
//!  ├─ 3. Extract   slide containers → sections → chunked body text
//!  └─ 4. Assemble  title fallback, slides numbered 1..=n, timestamp
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deckscrape::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let result = extract("https://example.org/pitch.html", None, &config).await?;
//!     println!("{} ({} slides)", result.title, result.slide_count);
//!     for slide in &result.slides {
//!         println!("--- {} ---\n{}", slide.index, slide.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Rendering engines
//!
//! The crate does not bundle a browser. Implement [`RenderingEngine`] over
//! whatever headless browser client you run and pass it to
//! [`Extractor::with_engine`]; without one, every URL is read by static
//! fetch.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `deckscrape` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! deckscrape = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chain;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod reference;
pub mod strategy;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chain::StrategyChain;
pub use config::{ExtractionConfig, ExtractionConfigBuilder, RenderPolicy, DEFAULT_USER_AGENT};
pub use document::{Container, DocumentModel, HtmlDocument};
pub use engine::{ChallengeHandle, RenderSession, RenderingEngine};
pub use error::{EngineError, ExtractError, FailureKind, StrategyFailure};
pub use extract::{
    extract, extract_html, extract_many, extract_sync, extract_to_file, write_json, Extractor,
};
pub use output::{ExtractionResult, Slide};
pub use pipeline::fetch::{FetchError, FetchedPage, HttpFetcher, PageFetcher, DEFAULT_MAX_BODY_BYTES};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use reference::DocumentReference;
pub use strategy::{ExtractionMethod, StrategyDescriptor, StrategyOutcome};
pub use stream::{extract_stream, ExtractionStream, StreamedExtraction};
