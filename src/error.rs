//! Error types for the pdf-container-split library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`SplitterError`] (**fatal**): the session cannot proceed at all
//!   (input file missing, not a PDF, bad configuration, outputs cannot be
//!   written). Returned as `Err(SplitterError)` from the top-level functions.
//!
//! * [`ExtractError`] (**per response**): the API answered with JSON whose
//!   container path is present but has the wrong shape. Stored in the
//!   session outcome next to whatever containers could still be read.
//!
//! * [`SplitError`] (**per container**): one container's page range could not
//!   be turned into a PDF. Stored in [`crate::output::ContainerReport`] so a
//!   bad range never hides the containers after it.
//!
//! Failures of the remote API itself (404, 5xx, timeout, connection errors)
//! are not errors here: they are ordinary [`crate::output::ClassifyOutcome`]
//! values the presentation layer renders.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-container-split library.
#[derive(Debug, Error)]
pub enum SplitterError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload was read, but is not a PDF.
    #[error("Upload '{filename}' is not a PDF\nFirst bytes: {magic:?}")]
    NotAPdf { filename: String, magic: Vec<u8> },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write one of the session's output files.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The container path exists in the response but holds the wrong JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ExtractError {
    /// A segment of the container path is present with an unexpected type.
    #[error("Expected {expected} at '{path}', found {found}")]
    WrongType {
        path: String,
        expected: String,
        found: String,
    },
}

/// A non-fatal error for a single container.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SplitError {
    /// Start page is after the end page, or a bound is zero.
    #[error("invalid page range {start}-{end}")]
    InvalidRange { start: u64, end: u64 },

    /// The range reaches past the last page of the source document.
    #[error("page range {start}-{end} is out of range (document has {total} pages)")]
    OutOfRange { start: u64, end: u64, total: usize },

    /// The uploaded PDF could not be parsed, so no page can be copied.
    #[error("source PDF could not be read: {detail}")]
    SourceUnreadable { detail: String },

    /// lopdf refused to serialise the new document.
    #[error("failed to write split PDF: {detail}")]
    SerializeFailed { detail: String },
}
