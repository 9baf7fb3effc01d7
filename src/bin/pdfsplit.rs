//! CLI binary for pdf-container-split.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClientConfig`, prints status lines and writes the session's artefacts.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_container_split::render::{
    container_lines, extract_warnings, results_heading, status_message, sub_document_rows, Level,
    StatusMessage,
};
use pdf_container_split::{
    process, write_outputs, ClientConfig, OutputOptions, ProgressCallback,
    SessionProgressCallback, UploadedFile, DEFAULT_ENDPOINT,
};
use std::io;
use std::path::PathBuf;
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

/// Terminal status box: a spinner while the classifier works, then one log
/// line per container as it is split.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style =
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl SessionProgressCallback for CliProgressCallback {
    fn on_request_start(&self, endpoint: &str, filename: &str, size_bytes: usize) {
        self.bar.set_prefix("Processing");
        self.bar.set_message(format!("Sending {filename} ({size_bytes} bytes)…"));
        self.bar.println(format!(
            "{} Sending file to API at {} to extract page ranges…",
            cyan("◆"),
            bold(endpoint)
        ));
    }

    fn on_request_complete(&self, elapsed_secs: f64, ok: bool) {
        let line = if ok {
            format!(
                "  {} Metadata Extracted Successfully! (Time Taken: {elapsed_secs} seconds)",
                green("✓")
            )
        } else {
            format!("  {} API request failed after {elapsed_secs} seconds", red("✗"))
        };
        self.bar.println(line);
    }

    fn on_split_start(&self, total_containers: usize) {
        self.bar.set_prefix("Splitting");
        self.bar.set_message(format!("{total_containers} containers"));
    }

    fn on_container_split(&self, index: usize, total: usize, id: &str, page_count: usize) {
        self.bar.println(format!(
            "  {} Container {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            id,
            dim(&format!("{page_count} pages")),
        ));
    }

    fn on_container_skipped(&self, index: usize, total: usize, id: &str) {
        self.bar.println(format!(
            "  {} Container {:>3}/{:<3}  {}  {}",
            yellow("⚠"),
            index,
            total,
            id,
            yellow("no page range"),
        ));
    }

    fn on_container_error(&self, index: usize, total: usize, id: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Container {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            id,
            red(&msg),
        ));
    }

    fn on_session_complete(&self, _total: usize, _split_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Classify and split, writing into ./bundle_split/
  pdfsplit bundle.pdf

  # Use a local classifier and a custom output directory
  pdfsplit --endpoint http://localhost:8000/api/process/OcrBytes bundle.pdf -o out/

  # Only the split PDFs, no HTML page or JSON
  pdfsplit --no-html --no-metadata bundle.pdf

  # Machine-readable session summary on stdout
  pdfsplit --json bundle.pdf > summary.json

OUTPUT FILES:
  {filename}_metadata.json            Whole API response (pretty JSON)
  {container}_pages_{start}-{end}.pdf One PDF per container page range
  report.html                          Results page with inline previews

ENVIRONMENT VARIABLES:
  PDFSPLIT_ENDPOINT   Classification endpoint URL
  PDFSPLIT_TIMEOUT    Request timeout in seconds
  PDFSPLIT_OUTPUT     Output directory
  RUST_LOG            Override log filter (e.g. pdf_container_split=debug)
"#;

/// Send a PDF to a classification API and split it into per-container PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsplit",
    version,
    about = "Send a PDF to a classification API and split it into per-container PDFs",
    long_about = "Upload a PDF to a remote OCR/classification API, read the container page \
ranges it returns, and write one standalone PDF per container together with the raw JSON \
response and an HTML results page with inline previews.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file to upload.
    input: PathBuf,

    /// Classification endpoint URL.
    #[arg(long, env = "PDFSPLIT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Directory to write outputs into. Default: ./{file stem}_split
    #[arg(short, long, env = "PDFSPLIT_OUTPUT")]
    output: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, env = "PDFSPLIT_TIMEOUT", default_value_t = 300,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Do not write report.html.
    #[arg(long, env = "PDFSPLIT_NO_HTML")]
    no_html: bool,

    /// Do not write the split PDFs.
    #[arg(long, env = "PDFSPLIT_NO_PDFS")]
    no_pdfs: bool,

    /// Do not write the {filename}_metadata.json download.
    #[arg(long, env = "PDFSPLIT_NO_METADATA")]
    no_metadata: bool,

    /// Print the session summary as JSON on stdout.
    #[arg(long, env = "PDFSPLIT_JSON")]
    json: bool,

    /// Disable the status spinner.
    #[arg(long, env = "PDFSPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSPLIT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and status lines carry everything the user needs, so
    // library logs are limited to errors unless asked for.
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

    // ── Upload intake ────────────────────────────────────────────────────
    let upload = UploadedFile::from_path(&cli.input)
        .await
        .context("Failed to read upload")?;
    let out_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_split", upload.stem())));

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} File '{}' uploaded successfully & ready for processing.",
            cyan("ℹ"),
            bold(upload.filename())
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn SessionProgressCallback>)
    } else {
        None
    };

    let mut builder = ClientConfig::builder()
        .endpoint(cli.endpoint.as_str())
        .timeout_secs(cli.timeout);
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run session ──────────────────────────────────────────────────────
    let result = process(Arc::new(upload), &config)
        .await
        .context("Processing failed")?;

    let options = OutputOptions {
        metadata_json: !cli.no_metadata,
        split_pdfs: !cli.no_pdfs,
        html_report: !cli.no_html,
    };
    let outputs = write_outputs(&result, &out_dir, options).context("Failed to write outputs")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise summary")?;
        println!("{json}");
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    // ── Summary ──────────────────────────────────────────────────────────
    print_message(&status_message(&result));
    for warning in extract_warnings(&result) {
        print_message(&warning);
    }
    if let Some(heading) = results_heading(&result) {
        print_message(&heading);
    }
    for ((heading, status), report) in container_lines(&result).iter().zip(&result.containers) {
        eprintln!("{}", bold(heading));
        print_message(status);
        for (doc_type, range) in sub_document_rows(report) {
            eprintln!("    {:<28} {}", doc_type, dim(&range));
        }
    }

    for failure in &outputs.failures {
        eprintln!(
            "{} Could not save split PDF for container {}: {}",
            yellow("⚠"),
            failure.container_id,
            failure.error
        );
    }

    if !outputs.written.is_empty() {
        eprintln!(
            "{}  {} files  →  {}",
            if result.failed_count() == 0 && outputs.failures.is_empty() {
                green("✔")
            } else {
                cyan("⚠")
            },
            outputs.written.len(),
            bold(&out_dir.display().to_string()),
        );
    }

    Ok(())
}

fn print_message(msg: &StatusMessage) {
    let marker = match msg.level {
        Level::Success => green("✔"),
        Level::Info => cyan("ℹ"),
        Level::Warning => yellow("⚠"),
        Level::Error => red("✘"),
    };
    eprintln!("{marker} {}", msg.text);
    if let Some(ref detail) = msg.detail {
        for line in detail.lines() {
            eprintln!("    {}", dim(line));
        }
    }
}
