//! # pdf-container-split
//!
//! Send a PDF to a remote OCR/classification API and split it into one
//! standalone PDF per classified container.
//!
//! The classifier answers with JSON that lists *containers*, each naming a
//! 1-based inclusive page range of the upload plus optional nested
//! sub-document ranges. This crate performs the call, reads that list
//! defensively, cuts each range out of the original PDF, and renders the
//! result as status lines, a JSON download and an HTML page with inline
//! previews.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    bytes + filename, %PDF magic check
//!  ├─ 2. Client   multipart POST, 300 s timeout, typed outcome
//!  ├─ 3. Extract  data.extracted_data.gpt_extraction_output.containers
//!  ├─ 4. Split    one PDF per container page range (lopdf)
//!  └─ 5. Render   status lines, JSON download, HTML with previews
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_container_split::{process_file, write_outputs, ClientConfig, OutputOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .endpoint("http://localhost:8000/api/process/OcrBytes")
//!         .build()?;
//!     let result = process_file("bundle.pdf", &config).await?;
//!     eprintln!("{} of {} containers split",
//!         result.split_count(),
//!         result.containers.len());
//!     write_outputs(&result, "bundle_split", OutputOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsplit` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
pub use error::{ExtractError, SplitError, SplitterError};
pub use output::{
    Classification, ClassifyOutcome, Container, ContainerReport, ResponseBody, SessionResult,
    SplitDocument, SplitStatus, SubDocument,
};
pub use pipeline::input::UploadedFile;
pub use progress::{NoopProgressCallback, ProgressCallback, SessionProgressCallback};
pub use session::{
    process, process_file, process_sync, write_outputs, OutputOptions, PdfWriteFailure, Session,
    WrittenOutputs,
};
