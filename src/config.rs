//! Configuration types for a classification session.
//!
//! Everything that shapes the remote call lives in [`ClientConfig`], built
//! via its [`ClientConfigBuilder`]. The library never reads environment
//! variables itself; the CLI maps flags (and their `PDFSPLIT_*` fallbacks)
//! onto the builder.

use crate::error::SplitterError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Endpoint the classification API is served from unless overridden.
pub const DEFAULT_ENDPOINT: &str = "https://afb01a368719.ngrok-free.app/api/process/OcrBytes";

/// Upper bound on a single classification call. OCR of long scans is slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for one classification session.
///
/// # Example
/// ```rust
/// use pdf_container_split::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint("http://localhost:8000/api/process/OcrBytes")
///     .timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout_secs, 60);
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Full URL the multipart upload is POSTed to.
    pub endpoint: String,

    /// Request timeout in seconds, covering connect through body read. Default: 300.
    pub timeout_secs: u64,

    /// Value of the `accept` header. Default: `application/json`.
    pub accept: String,

    /// Optional progress callback fired as the session advances.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept: "application/json".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("accept", &self.accept)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn SessionProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn accept(mut self, value: impl Into<String>) -> Self {
        self.config.accept = value.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, SplitterError> {
        let c = &self.config;
        let endpoint = c.endpoint.trim();
        if endpoint.is_empty() {
            return Err(SplitterError::InvalidConfig(
                "Endpoint must not be empty".into(),
            ));
        }
        if reqwest::Url::parse(endpoint).is_err() {
            return Err(SplitterError::InvalidConfig(format!(
                "Endpoint is not a valid URL: '{}'",
                endpoint
            )));
        }
        if c.timeout_secs == 0 {
            return Err(SplitterError::InvalidConfig(
                "Timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
