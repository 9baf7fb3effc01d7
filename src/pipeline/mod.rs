//! Pipeline stages for a classification session.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ client ──▶ extract ──▶ split ──▶ encode
//! (upload)  (HTTP)     (JSON path) (lopdf)   (data URLs)
//! ```
//!
//! 1. [`input`]: the uploaded bytes and filename, `%PDF` magic checked
//! 2. [`client`]: multipart POST to the classifier; the only stage with
//!    network I/O
//! 3. [`extract`]: typed lookup of the container list in the response
//! 4. [`split`]: one standalone PDF per container page range; runs in
//!    `spawn_blocking` because lopdf parsing is CPU-bound
//! 5. [`encode`]: base64 data URLs, pretty JSON and download filenames

pub mod client;
pub mod encode;
pub mod extract;
pub mod input;
pub mod split;
