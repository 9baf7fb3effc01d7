//! Encoding helpers: data URLs, pretty JSON and download filenames.
//!
//! Split PDFs are handed to the browser as `data:application/pdf;base64,…`
//! URLs so the report works as a single self-contained HTML file with no
//! server behind it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::debug;

/// Characters that cannot appear in a filename on common filesystems.
static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("valid regex"));

/// Wrap PDF bytes in a base64 data URL.
pub fn pdf_data_url(bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded PDF → {} bytes base64", b64.len());
    format!("data:application/pdf;base64,{b64}")
}

/// Serialise JSON with a four-space indent.
pub fn to_pretty_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        // Serialising a `Value` into memory cannot fail in practice.
        Err(_) => value.to_string(),
    }
}

/// Longest stem kept from a container id or upload name, in bytes.
///
/// Leaves room for the fixed suffixes under the usual 255-byte name limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Make `name` usable as a single path component inside the output directory.
///
/// Separators and other path-hostile characters become `_`, so the result can
/// never point outside the directory it is joined onto. Long names are cut at
/// a character boundary to [`MAX_STEM_BYTES`].
pub fn safe_file_stem(name: &str) -> String {
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(name, "_");
    let mut cut = cleaned.len().min(MAX_STEM_BYTES);
    while !cleaned.is_char_boundary(cut) {
        cut -= 1;
    }
    cleaned[..cut].to_string()
}

/// `{container_id}_pages_{start}-{end}.pdf`, with the id made path-safe.
pub fn split_filename(container_id: &str, start: u64, end: u64) -> String {
    format!("{}_pages_{start}-{end}.pdf", safe_file_stem(container_id))
}
