//! CLI binary for deckscrape.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use deckscrape::{
    write_json, DocumentReference, ExtractionConfig, ExtractionMethod,
    ExtractionProgressCallback, ExtractionResult, Extractor, FailureKind, ProgressCallback,
    RenderPolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner whose message follows the strategy
/// chain, with one log line per failed attempt.
struct CliProgressCallback {
    spinner: ProgressBar,
    failures: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        spinner.set_style(style);
        spinner.set_prefix("Preparing");
        spinner.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            spinner,
            failures: AtomicUsize::new(0),
        })
    }

    fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, url: &str, strategies: usize) {
        self.spinner.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Extracting {url} ({strategies} strateg{})",
                if strategies == 1 { "y" } else { "ies" }
            ))
        ));
    }

    fn on_strategy_start(&self, method: ExtractionMethod, attempt: usize, total: usize) {
        self.spinner.set_prefix(format!("{attempt}/{total}"));
        self.spinner.set_message(method.to_string());
    }

    fn on_strategy_failed(&self, method: ExtractionMethod, kind: FailureKind, message: &str) {
        self.failures.fetch_add(1, Ordering::SeqCst);

        // Keep one line per attempt even for long engine messages.
        let msg = if message.chars().count() > 80 {
            let cut: String = message.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            message.to_string()
        };

        self.spinner.println(format!(
            "  {} {:<13} {:<24} {}",
            red("✗"),
            method.as_str(),
            red(kind.as_str()),
            dim(&msg),
        ));
    }

    fn on_extraction_complete(&self, method: ExtractionMethod, slide_count: usize) {
        self.spinner.println(format!(
            "  {} {:<13} {}",
            green("✓"),
            method.as_str(),
            dim(&format!("{slide_count} slides")),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Human-readable summary on stdout
  deckscrape https://example.org/pitch.html

  # Structured JSON on stdout
  deckscrape --json https://example.org/pitch.html > deck.json

  # Write JSON to a file (atomic)
  deckscrape https://example.org/pitch.html -o deck.json

  # Give up after 20 seconds
  deckscrape --deadline-ms 20000 https://example.org/deck

NOTES:
  The command-line tool has no rendering engine, so every URL is read by a
  static fetch. Password-gated decks and viewers that build slides in
  client-side script need the library with a RenderingEngine plugged in.

ENVIRONMENT VARIABLES:
  DECKSCRAPE_OUTPUT         Default output file
  DECKSCRAPE_USER_AGENT     User-Agent header for static fetches
  RUST_LOG                  Overrides the log filter (e.g. deckscrape=debug)
"#;

/// Extract slides from presentation pages.
#[derive(Parser, Debug)]
#[command(
    name = "deckscrape",
    version,
    about = "Extract titles, slides and images from presentation pages",
    long_about = "Extract the title, per-slide text and image references from a web-hosted \
presentation by plain HTTP fetch. Rendering and password prompts need the library with a \
rendering engine.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTTP/HTTPS URL of the presentation.
    url: String,

    /// Write JSON to this file instead of printing a summary.
    #[arg(short, long, env = "DECKSCRAPE_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the result as JSON on stdout.
    #[arg(long, env = "DECKSCRAPE_JSON")]
    json: bool,

    /// Static fetch timeout in milliseconds.
    #[arg(long, env = "DECKSCRAPE_FETCH_TIMEOUT_MS", default_value_t = 30_000)]
    fetch_timeout_ms: u64,

    /// Overall deadline for the whole extraction, in milliseconds.
    #[arg(long, env = "DECKSCRAPE_DEADLINE_MS", default_value_t = 120_000)]
    deadline_ms: u64,

    /// Minimum characters for a block of text to count as a slide.
    #[arg(long, env = "DECKSCRAPE_MIN_TEXT_LEN", default_value_t = 20)]
    min_text_len: usize,

    /// Maximum image references kept per slide.
    #[arg(long, env = "DECKSCRAPE_MAX_IMAGES", default_value_t = 10)]
    max_images: usize,

    /// User-Agent header for static fetches.
    #[arg(long, env = "DECKSCRAPE_USER_AGENT")]
    user_agent: Option<String>,

    /// Disable the progress spinner.
    #[arg(long, env = "DECKSCRAPE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECKSCRAPE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "DECKSCRAPE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level library logs; verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        progress.clone().map(|cb| cb as ProgressCallback),
    )?;

    let reference = DocumentReference::parse(&cli.url, None)
        .context("Invalid URL")?;
    let extractor = Extractor::new(config).context("Failed to initialise extractor")?;

    // ── Run extraction ───────────────────────────────────────────────────
    let outcome = extractor.extract(&reference).await;
    if let Some(ref cb) = progress {
        cb.clear();
    }
    let result = outcome.context("Extraction failed")?;

    if let Some(ref output_path) = cli.output {
        write_json(&result, output_path)
            .await
            .context("Failed to write output")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} slides via {}  →  {}",
                green("✔"),
                result.slide_count,
                result.method,
                bold(&output_path.display().to_string()),
            );
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_summary(&result).context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    // No engine is plugged in here, so classification is skipped outright.
    let mut builder = ExtractionConfig::builder()
        .render_policy(RenderPolicy::Never)
        .fetch_timeout_ms(cli.fetch_timeout_ms)
        .request_deadline_ms(cli.deadline_ms)
        .min_slide_text_len(cli.min_text_len)
        .max_images_per_slide(cli.max_images);

    if let Some(ref ua) = cli.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Human-readable rendering of a result on stdout.
fn print_summary(result: &ExtractionResult) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", bold(&result.title))?;
    writeln!(
        out,
        "{}",
        dim(&format!(
            "{} slides · {} images · {} · {}",
            result.slide_count,
            result.image_count(),
            result.method,
            result.extracted_at.to_rfc3339()
        ))
    )?;

    for slide in &result.slides {
        writeln!(out)?;
        writeln!(out, "{}", cyan(&format!("── Slide {} ──", slide.index)))?;
        writeln!(out, "{}", slide.text)?;
        for image in &slide.images {
            writeln!(out, "  {} {}", dim("img"), image)?;
        }
    }
    Ok(())
}
