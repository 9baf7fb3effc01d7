//! Upload intake: the file the user handed us, as bytes plus its name.
//!
//! Nothing is processed here beyond checking the `%PDF` magic, so that a
//! wrong file fails before it is sent over the network.

use crate::error::SplitterError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// A single uploaded file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Accept an in-memory upload.
    pub fn from_bytes(
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, SplitterError> {
        let filename = filename.into();
        if !bytes.starts_with(b"%PDF") {
            let magic = bytes.iter().take(4).copied().collect();
            return Err(SplitterError::NotAPdf { filename, magic });
        }
        debug!("Accepted upload '{}' ({} bytes)", filename, bytes.len());
        Ok(Self { filename, bytes })
    }

    /// Read an upload from a local file; the filename is the path's last component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SplitterError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => SplitterError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => SplitterError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        Self::from_bytes(filename, bytes)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Filename without its extension, used for default output directories.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
    }
}
