//! Container extraction: walk the classifier response to its container list.
//!
//! The response nests the list at
//! `data.extracted_data.gpt_extraction_output.containers`. A key missing at
//! any level means "no containers" and is not an error. A key that is
//! present with the wrong JSON type is reported as an [`ExtractError`], and
//! well-formed containers around a malformed entry are still returned.

use crate::error::ExtractError;
use crate::output::{Container, SubDocument};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Where the classifier puts its container list.
pub const CONTAINERS_PATH: JsonPath<'static> =
    JsonPath::new(&["data", "extracted_data", "gpt_extraction_output", "containers"]);

/// Result of an optional path lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'v> {
    /// Some key along the path does not exist.
    Absent,
    Found(&'v Value),
}

/// A fixed sequence of object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonPath<'a> {
    segments: &'a [&'a str],
}

impl<'a> JsonPath<'a> {
    pub const fn new(segments: &'a [&'a str]) -> Self {
        Self { segments }
    }

    /// Follow the path from `root`.
    ///
    /// Every value walked through must be a JSON object; a non-object in the
    /// middle of the path is an error, a missing key is [`Lookup::Absent`].
    pub fn lookup<'v>(&self, root: &'v Value) -> Result<Lookup<'v>, ExtractError> {
        let mut current = root;
        for (depth, key) in self.segments.iter().enumerate() {
            let obj = current
                .as_object()
                .ok_or_else(|| wrong_type(&self.display_prefix(depth), "an object", current))?;
            match obj.get(*key) {
                Some(next) => current = next,
                None => {
                    debug!("'{}' absent from response", self.display_prefix(depth + 1));
                    return Ok(Lookup::Absent);
                }
            }
        }
        Ok(Lookup::Found(current))
    }

    /// Dotted form of the first `depth` segments; `$` for the root.
    fn display_prefix(&self, depth: usize) -> String {
        if depth == 0 {
            "$".to_string()
        } else {
            self.segments[..depth].join(".")
        }
    }
}

impl std::fmt::Display for JsonPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_prefix(self.segments.len()))
    }
}

/// Containers read from a response plus any shape problems met on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub containers: Vec<Container>,
    pub problems: Vec<ExtractError>,
}

/// Read the container list out of a classifier response.
pub fn extract_containers(response: &Value) -> Extraction {
    let list = match CONTAINERS_PATH.lookup(response) {
        Ok(Lookup::Absent) => return Extraction::default(),
        Ok(Lookup::Found(v)) => v,
        Err(e) => {
            warn!("{}", e);
            return Extraction {
                containers: vec![],
                problems: vec![e],
            };
        }
    };

    let Some(items) = list.as_array() else {
        let e = wrong_type(&CONTAINERS_PATH.to_string(), "an array", list);
        warn!("{}", e);
        return Extraction {
            containers: vec![],
            problems: vec![e],
        };
    };

    let mut extraction = Extraction::default();
    for (i, item) in items.iter().enumerate() {
        match item.as_object() {
            Some(fields) => extraction.containers.push(Container::from_fields(fields)),
            None => {
                let e = wrong_type(&format!("{CONTAINERS_PATH}[{i}]"), "an object", item);
                warn!("{}", e);
                extraction.problems.push(e);
            }
        }
    }
    debug!(
        "Extracted {} containers ({} malformed)",
        extraction.containers.len(),
        extraction.problems.len()
    );
    extraction
}

impl Container {
    /// Interpret one container record. Never fails: unusable fields read as absent.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let id = match fields.get("container_number") {
            None | Some(Value::Null) => "N/A".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let sub_documents = fields
            .iter()
            .filter_map(|(key, value)| {
                value.as_object().map(|doc| SubDocument {
                    key: key.clone(),
                    page_start: doc.get("page_start_number").cloned(),
                    page_end: doc.get("page_end_number").cloned(),
                })
            })
            .collect();

        Self {
            id,
            page_start: fields.get("page_start_number").and_then(Value::as_u64),
            page_end: fields.get("page_end_number").and_then(Value::as_u64),
            sub_documents,
            fields: fields.clone(),
        }
    }
}

fn wrong_type(path: &str, expected: &str, found: &Value) -> ExtractError {
    ExtractError::WrongType {
        path: path.to_string(),
        expected: expected.to_string(),
        found: json_type_name(found).to_string(),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
