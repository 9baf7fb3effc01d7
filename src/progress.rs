//! Progress-callback trait for session events.
//!
//! Inject an [`Arc<dyn SessionProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to receive
//! events as the session uploads the PDF, waits for the classifier and splits
//! each container. The CLI uses it to drive its status spinner.
//!
//! # Example
//!
//! ```rust
//! use pdf_container_split::{ClientConfig, SessionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     split: AtomicUsize,
//! }
//!
//! impl SessionProgressCallback for CountingCallback {
//!     fn on_container_split(&self, index: usize, total: usize, id: &str, page_count: usize) {
//!         self.split.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {} ({} pages)", index, total, id, page_count);
//!     }
//! }
//!
//! let config = ClientConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { split: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the session driver as it processes an upload.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Container indices are 1-based.
pub trait SessionProgressCallback: Send + Sync {
    /// Called just before the upload is sent to the classifier.
    fn on_request_start(&self, endpoint: &str, filename: &str, size_bytes: usize) {
        let _ = (endpoint, filename, size_bytes);
    }

    /// Called when the classifier call finished, whatever its outcome.
    ///
    /// # Arguments
    /// * `elapsed_secs`: wall-clock duration of the call
    /// * `ok`: true only when usable JSON came back
    fn on_request_complete(&self, elapsed_secs: f64, ok: bool) {
        let _ = (elapsed_secs, ok);
    }

    /// Called once before the first container is split.
    fn on_split_start(&self, total_containers: usize) {
        let _ = total_containers;
    }

    /// Called when a container was written to a standalone PDF.
    fn on_container_split(&self, index: usize, total: usize, id: &str, page_count: usize) {
        let _ = (index, total, id, page_count);
    }

    /// Called when a container lacks page bounds and was skipped.
    fn on_container_skipped(&self, index: usize, total: usize, id: &str) {
        let _ = (index, total, id);
    }

    /// Called when a container's range could not be extracted.
    fn on_container_error(&self, index: usize, total: usize, id: &str, error: &str) {
        let _ = (index, total, id, error);
    }

    /// Called once after every container has been attempted.
    fn on_session_complete(&self, total: usize, split_count: usize) {
        let _ = (total, split_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SessionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn SessionProgressCallback>;
