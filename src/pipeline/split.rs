//! PDF splitting: cut each container's page range into a standalone PDF.
//!
//! The upload is parsed once into a [`SourcePdf`]; each range is produced
//! from a clone of that document with every page outside the range removed
//! from the page tree, then unreferenced objects pruned. Page order is
//! preserved because the page tree itself is never reordered.
//!
//! lopdf parsing is CPU-bound, so [`split_containers`] is synchronous and
//! the session driver runs it inside `spawn_blocking`.

use crate::error::SplitError;
use crate::output::{Container, ContainerReport, SplitDocument, SplitStatus};
use crate::pipeline::encode::split_filename;
use crate::progress::ProgressCallback;
use lopdf::Document;
use tracing::{debug, info, warn};

/// The parsed upload, shared by every container of a session.
#[derive(Clone)]
pub struct SourcePdf {
    doc: Document,
    page_count: usize,
}

impl SourcePdf {
    /// Parse the uploaded bytes.
    pub fn load(bytes: &[u8]) -> Result<Self, SplitError> {
        let doc = Document::load_mem(bytes).map_err(|e| SplitError::SourceUnreadable {
            detail: e.to_string(),
        })?;
        let page_count = doc.get_pages().len();
        info!("PDF loaded: {} pages", page_count);
        Ok(Self { doc, page_count })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Copy pages `start..=end` (1-based, inclusive) into a new PDF.
    pub fn extract_range(&self, start: u64, end: u64) -> Result<Vec<u8>, SplitError> {
        if start == 0 || end == 0 || start > end {
            return Err(SplitError::InvalidRange { start, end });
        }
        if end > self.page_count as u64 {
            return Err(SplitError::OutOfRange {
                start,
                end,
                total: self.page_count,
            });
        }

        let mut doc = self.doc.clone();
        let drop: Vec<u32> = (1..=self.page_count as u32)
            .filter(|&p| (p as u64) < start || (p as u64) > end)
            .collect();
        doc.delete_pages(&drop);
        let pruned = doc.prune_objects();
        debug!(
            "Range {}-{}: dropped {} pages, pruned {} objects",
            start,
            end,
            drop.len(),
            pruned.len()
        );

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| SplitError::SerializeFailed {
                detail: e.to_string(),
            })?;
        Ok(buf)
    }

    /// Split one container, or explain why not.
    pub fn split_container(&self, container: &Container) -> SplitStatus {
        let (Some(start), Some(end)) = (container.page_start, container.page_end) else {
            return SplitStatus::Skipped;
        };
        match self.extract_range(start, end) {
            Ok(bytes) => SplitStatus::Split(SplitDocument {
                filename: split_filename(&container.id, start, end),
                page_count: (end - start + 1) as usize,
                size_bytes: bytes.len(),
                bytes,
            }),
            Err(e) => SplitStatus::Failed(e),
        }
    }
}

/// Split every container of a session, in order.
///
/// Always returns one report per container. A container failing to split
/// never stops the ones after it; if the source itself cannot be parsed,
/// every container with page bounds reports that failure.
pub fn split_containers(
    source_bytes: &[u8],
    containers: Vec<Container>,
    progress: Option<&ProgressCallback>,
) -> Vec<ContainerReport> {
    let total = containers.len();
    if let Some(cb) = progress {
        cb.on_split_start(total);
    }
    if total == 0 {
        if let Some(cb) = progress {
            cb.on_session_complete(0, 0);
        }
        return vec![];
    }

    let source = SourcePdf::load(source_bytes);
    if let Err(ref e) = source {
        warn!("{}", e);
    }

    let reports: Vec<ContainerReport> = containers
        .into_iter()
        .enumerate()
        .map(|(i, container)| {
            let index = i + 1;
            let status = match &source {
                Ok(src) => src.split_container(&container),
                Err(_) if container.page_start.is_none() || container.page_end.is_none() => {
                    SplitStatus::Skipped
                }
                Err(e) => SplitStatus::Failed(e.clone()),
            };
            report_progress(progress, index, total, &container, &status);
            ContainerReport {
                index,
                container,
                status,
            }
        })
        .collect();

    if let Some(cb) = progress {
        let split = reports.iter().filter(|r| r.document().is_some()).count();
        cb.on_session_complete(total, split);
    }
    reports
}

fn report_progress(
    progress: Option<&ProgressCallback>,
    index: usize,
    total: usize,
    container: &Container,
    status: &SplitStatus,
) {
    match status {
        SplitStatus::Split(doc) => {
            debug!("Container {}: wrote {}", container.id, doc.filename);
            if let Some(cb) = progress {
                cb.on_container_split(index, total, &container.id, doc.page_count);
            }
        }
        SplitStatus::Skipped => {
            warn!(
                "Missing page range metadata for container {}. Skipping split.",
                container.id
            );
            if let Some(cb) = progress {
                cb.on_container_skipped(index, total, &container.id);
            }
        }
        SplitStatus::Failed(e) => {
            warn!("Error splitting PDF for container {}: {}", container.id, e);
            if let Some(cb) = progress {
                cb.on_container_error(index, total, &container.id, &e.to_string());
            }
        }
    }
}
