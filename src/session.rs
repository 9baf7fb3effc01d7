//! Session driver: upload → classify → extract → split, as one snapshot.
//!
//! A [`Session`] pairs the uploaded bytes with the result of the last run on
//! them. Running it again yields a new `Session`; nothing is shared between
//! sessions and nothing is global, so two users (or two CLI invocations)
//! never see each other's data.

use crate::config::ClientConfig;
use crate::error::SplitterError;
use crate::output::SessionResult;
use crate::pipeline::{client, extract, input::UploadedFile, split};
use crate::render::render_html;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-session snapshot: the upload plus the last result computed for it.
#[derive(Debug, Clone)]
pub struct Session {
    upload: Arc<UploadedFile>,
    last_result: Option<Arc<SessionResult>>,
}

impl Session {
    /// Start a session for a freshly uploaded file.
    pub fn new(upload: UploadedFile) -> Self {
        Self {
            upload: Arc::new(upload),
            last_result: None,
        }
    }

    pub fn upload(&self) -> &UploadedFile {
        &self.upload
    }

    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_deref()
    }

    /// Run the upload through the classifier and return the next snapshot.
    pub async fn process(&self, config: &ClientConfig) -> Result<Session, SplitterError> {
        let result = process(Arc::clone(&self.upload), config).await?;
        Ok(Session {
            upload: Arc::clone(&self.upload),
            last_result: Some(Arc::new(result)),
        })
    }
}

/// Classify one upload and split it into per-container PDFs.
///
/// Returns `Ok` for every outcome of the remote call, including 404s and
/// timeouts; those are reported inside the [`SessionResult`]. Containers are
/// only split when the call succeeded.
pub async fn process(
    upload: Arc<UploadedFile>,
    config: &ClientConfig,
) -> Result<SessionResult, SplitterError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_request_start(&config.endpoint, upload.filename(), upload.len());
    }

    let classification = client::classify(&upload, config).await;

    if let Some(ref cb) = config.progress_callback {
        cb.on_request_complete(
            classification.elapsed_secs(),
            classification.outcome.is_success(),
        );
    }

    let extraction = classification
        .outcome
        .body()
        .map(extract::extract_containers)
        .unwrap_or_default();
    info!(
        "{} containers to split from '{}'",
        extraction.containers.len(),
        upload.filename()
    );

    let containers = if classification.outcome.is_success() {
        let progress = config.progress_callback.clone();
        let source = Arc::clone(&upload);
        let containers = extraction.containers;
        tokio::task::spawn_blocking(move || {
            split::split_containers(source.bytes(), containers, progress.as_ref())
        })
        .await
        .map_err(|e| SplitterError::Internal(format!("Split task panicked: {}", e)))?
    } else {
        if let Some(ref cb) = config.progress_callback {
            cb.on_session_complete(0, 0);
        }
        vec![]
    };

    Ok(SessionResult {
        filename: upload.filename().to_string(),
        classification,
        extract_problems: extraction.problems,
        containers,
    })
}

/// Read a PDF from disk and [`process`] it.
pub async fn process_file(
    path: impl AsRef<Path>,
    config: &ClientConfig,
) -> Result<SessionResult, SplitterError> {
    let upload = UploadedFile::from_path(path).await?;
    process(Arc::new(upload), config).await
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally and blocks until the call
/// completes or times out.
pub fn process_sync(
    upload: UploadedFile,
    config: &ClientConfig,
) -> Result<SessionResult, SplitterError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SplitterError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process(Arc::new(upload), config))
}

/// Which artefacts [`write_outputs`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// `{filename}_metadata.json`
    pub metadata_json: bool,
    /// One PDF per split container.
    pub split_pdfs: bool,
    /// `report.html` with inline previews.
    pub html_report: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            metadata_json: true,
            split_pdfs: true,
            html_report: true,
        }
    }
}

/// Name of the HTML page written by [`write_outputs`].
pub const REPORT_FILENAME: &str = "report.html";

/// A split PDF that could not be written. The other outputs still were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfWriteFailure {
    pub container_id: String,
    pub path: PathBuf,
    pub error: String,
}

/// What [`write_outputs`] put on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenOutputs {
    /// Paths written, in write order.
    pub written: Vec<PathBuf>,
    /// Split PDFs skipped because their file could not be written.
    pub failures: Vec<PdfWriteFailure>,
}

/// Write the session's downloadable artefacts into `dir`.
///
/// Each file is written to a temp file in `dir` and renamed into place, so
/// a crash never leaves a truncated PDF behind. A split PDF that cannot be
/// written is recorded in [`WrittenOutputs::failures`] and the remaining
/// files are still written; failing to create `dir`, the JSON download or
/// the report is fatal.
pub fn write_outputs(
    result: &SessionResult,
    dir: impl AsRef<Path>,
    options: OutputOptions,
) -> Result<WrittenOutputs, SplitterError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| SplitterError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut outputs = WrittenOutputs::default();

    if options.metadata_json {
        if let Some(json) = result.metadata_json() {
            let path = dir.join(result.metadata_filename());
            write_atomic(&path, json.as_bytes())?;
            outputs.written.push(path);
        }
    }

    if options.split_pdfs {
        for report in &result.containers {
            let Some(doc) = report.document() else {
                continue;
            };
            let path = dir.join(&doc.filename);
            match write_atomic(&path, &doc.bytes) {
                Ok(()) => outputs.written.push(path),
                Err(e) => {
                    warn!(
                        "Could not write split PDF for container {}: {}",
                        report.container.id, e
                    );
                    outputs.failures.push(PdfWriteFailure {
                        container_id: report.container.id.clone(),
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    if options.html_report {
        let path = dir.join(REPORT_FILENAME);
        write_atomic(&path, render_html(result).as_bytes())?;
        outputs.written.push(path);
    }

    debug!(
        "Wrote {} files to {} ({} failed)",
        outputs.written.len(),
        dir.display(),
        outputs.failures.len()
    );
    Ok(outputs)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SplitterError> {
    let fail = |source: std::io::Error| SplitterError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
