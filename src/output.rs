//! Output types: what a classification session produces.
//!
//! A [`SessionResult`] is an immutable snapshot of one run: the outcome of the
//! remote call, any problems with the response shape, and one
//! [`ContainerReport`] per container in response order. Nothing here holds
//! a reference back into the session, so results can be rendered, serialised
//! or thrown away independently.

use crate::error::{ExtractError, SplitError};
use crate::pipeline::encode::{safe_file_stem, to_pretty_json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a non-200 response, decoded as JSON when possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Decode `text` as JSON, falling back to the raw text.
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => ResponseBody::Text(text),
        }
    }

    /// Text shown to the user: pretty JSON or the raw body.
    pub fn display_text(&self) -> String {
        match self {
            ResponseBody::Json(v) => to_pretty_json(v),
            ResponseBody::Text(t) => t.clone(),
        }
    }
}

/// Every way the classification call can end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifyOutcome {
    /// HTTP 200 with a JSON body.
    Success { body: Value },
    /// HTTP 404.
    EndpointNotFound,
    /// Any other non-200 status.
    ServerError { status: u16, body: ResponseBody },
    /// HTTP 200, but the body is not JSON.
    MalformedResponse { body: String },
    /// No complete response within the configured timeout.
    Timeout { secs: u64 },
    /// Connection, DNS, TLS or I/O failure before a response arrived.
    Transport { cause: String },
}

impl ClassifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClassifyOutcome::Success { .. })
    }

    /// The decoded JSON body of a successful call.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ClassifyOutcome::Success { body } => Some(body),
            _ => None,
        }
    }
}

/// Result of one classification call, with its wall-clock duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub outcome: ClassifyOutcome,
    pub elapsed_ms: u64,
}

impl Classification {
    /// Elapsed seconds rounded to two decimals, as shown to the user.
    pub fn elapsed_secs(&self) -> f64 {
        (self.elapsed_ms as f64 / 10.0).round() / 100.0
    }
}

/// One classified unit of the source PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// `container_number` as displayed; `N/A` when absent.
    pub id: String,
    /// 1-based first page, when present as a non-negative integer.
    pub page_start: Option<u64>,
    /// 1-based last page (inclusive), when present as a non-negative integer.
    pub page_end: Option<u64>,
    /// Object-valued fields, in response order.
    pub sub_documents: Vec<SubDocument>,
    /// The record exactly as the API sent it.
    pub fields: Map<String, Value>,
}

/// Nested object-valued field of a container describing a sub-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubDocument {
    /// Field name, e.g. `bill_of_lading`.
    pub key: String,
    pub page_start: Option<Value>,
    pub page_end: Option<Value>,
}

/// A standalone PDF cut out of the source for one container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitDocument {
    /// `{container_id}_pages_{start}-{end}.pdf`
    pub filename: String,
    pub page_count: usize,
    pub size_bytes: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// What happened when splitting one container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SplitStatus {
    Split(SplitDocument),
    /// Page bounds were missing; nothing to split.
    Skipped,
    Failed(SplitError),
}

/// Per-container entry of a [`SessionResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerReport {
    /// 1-based position in the response.
    pub index: usize,
    pub container: Container,
    pub status: SplitStatus,
}

impl ContainerReport {
    pub fn document(&self) -> Option<&SplitDocument> {
        match &self.status {
            SplitStatus::Split(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Immutable snapshot of one processed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Original filename of the upload.
    pub filename: String,
    pub classification: Classification,
    /// Shape problems in an otherwise successful response.
    pub extract_problems: Vec<ExtractError>,
    /// Empty unless the call succeeded.
    pub containers: Vec<ContainerReport>,
}

impl SessionResult {
    /// Number of containers that produced a split PDF.
    pub fn split_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| c.document().is_some())
            .count()
    }

    /// Number of containers whose split failed.
    pub fn failed_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| matches!(c.status, SplitStatus::Failed(_)))
            .count()
    }

    /// Number of containers skipped for missing page bounds.
    pub fn skipped_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| c.status == SplitStatus::Skipped)
            .count()
    }

    /// `{original filename}_metadata.json`, made safe to join onto a directory.
    pub fn metadata_filename(&self) -> String {
        format!("{}_metadata.json", safe_file_stem(&self.filename))
    }

    /// The whole response as the downloadable JSON document.
    pub fn metadata_json(&self) -> Option<String> {
        self.classification.outcome.body().map(to_pretty_json)
    }
}
