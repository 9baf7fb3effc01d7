//! Presentation: turn a [`SessionResult`] into what the user sees.
//!
//! Two renderings share the same wording:
//!
//! * [`status_message`] / [`container_lines`]: short status lines the CLI
//!   prints as the session finishes.
//! * [`render_html`]: a single self-contained HTML page with the JSON
//!   download, the raw-JSON view, and per container a heading, a download
//!   link, an inline preview and the sub-document table. Split PDFs are
//!   embedded as data URLs so the page needs no server.

use crate::output::{ClassifyOutcome, ContainerReport, SessionResult, SplitStatus, SubDocument};
use crate::pipeline::encode::pdf_data_url;
use serde_json::Value;
use std::fmt::Write as _;

/// Severity of a user-facing status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn css_class(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// A status line with an optional block of detail (JSON or raw text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: Level,
    pub text: String,
    pub detail: Option<String>,
}

impl StatusMessage {
    fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Headline for the outcome of the classification call.
pub fn status_message(result: &SessionResult) -> StatusMessage {
    let secs = result.classification.elapsed_secs();
    match &result.classification.outcome {
        ClassifyOutcome::Success { .. } => StatusMessage::new(
            Level::Success,
            format!("API call successful in {secs} seconds!"),
        ),
        ClassifyOutcome::EndpointNotFound => StatusMessage::new(
            Level::Error,
            "Error: API endpoint not found (Status 404).",
        ),
        ClassifyOutcome::ServerError { status, body } => StatusMessage::new(
            Level::Error,
            format!("API call failed with status code: {status}"),
        )
        .with_detail(body.display_text()),
        ClassifyOutcome::MalformedResponse { body } => StatusMessage::new(
            Level::Error,
            "API returned a response that is not valid JSON",
        )
        .with_detail(body.clone()),
        ClassifyOutcome::Timeout { secs } => StatusMessage::new(
            Level::Error,
            format!("API request timed out after {secs} seconds"),
        ),
        ClassifyOutcome::Transport { cause } => StatusMessage::new(
            Level::Error,
            format!("An error occurred during the API request. Error: {cause}"),
        ),
    }
}

/// Summary line shown above the per-container results of a successful call.
pub fn results_heading(result: &SessionResult) -> Option<StatusMessage> {
    if !result.classification.outcome.is_success() {
        return None;
    }
    Some(if result.containers.is_empty() {
        StatusMessage::new(
            Level::Warning,
            "The API returned data, but no container information was extracted for splitting.",
        )
    } else {
        StatusMessage::new(
            Level::Info,
            format!(
                "Results: {} Containers Split and Ready",
                result.containers.len()
            ),
        )
    })
}

/// Warnings about the shape of an otherwise successful response.
pub fn extract_warnings(result: &SessionResult) -> Vec<StatusMessage> {
    result
        .extract_problems
        .iter()
        .map(|e| StatusMessage::new(Level::Warning, format!("Unexpected response shape: {e}")))
        .collect()
}

/// `Container: {id} (Pages: {start} - {end})`
pub fn container_heading(report: &ContainerReport) -> String {
    let c = &report.container;
    format!(
        "Container: {} (Pages: {} - {})",
        c.id,
        display_bound(c.page_start),
        display_bound(c.page_end)
    )
}

/// Outcome line for one container.
pub fn container_status(report: &ContainerReport) -> StatusMessage {
    let id = &report.container.id;
    match &report.status {
        SplitStatus::Split(doc) => StatusMessage::new(
            Level::Success,
            format!("Split {} ({} pages)", doc.filename, doc.page_count),
        ),
        SplitStatus::Skipped => StatusMessage::new(
            Level::Warning,
            format!("Missing page range metadata for container {id}. Skipping split."),
        ),
        SplitStatus::Failed(e) => StatusMessage::new(
            Level::Error,
            format!("Error splitting PDF for container {id}: {e}"),
        ),
    }
}

/// Heading plus outcome for every container, in response order.
pub fn container_lines(result: &SessionResult) -> Vec<(String, StatusMessage)> {
    result
        .containers
        .iter()
        .map(|r| (container_heading(r), container_status(r)))
        .collect()
}

/// `bill_of_lading` → `Bill Of Lading`.
///
/// Title-cases every run of letters: the first letter after a non-letter is
/// upper-cased, the rest lower-cased.
pub fn document_type_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_is_letter = false;
    for ch in key.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// `Page X` when both bounds are the same JSON value, else `Page X to Y`.
pub fn page_range_label(doc: &SubDocument) -> String {
    let start = display_value(doc.page_start.as_ref());
    if doc.page_start == doc.page_end {
        format!("Page {start}")
    } else {
        format!("Page {start} to {}", display_value(doc.page_end.as_ref()))
    }
}

/// Rows of the sub-document table: (Document Type, Page Range).
pub fn sub_document_rows(report: &ContainerReport) -> Vec<(String, String)> {
    report
        .container
        .sub_documents
        .iter()
        .map(|d| (document_type_label(&d.key), page_range_label(d)))
        .collect()
}

fn display_bound(bound: Option<u64>) -> String {
    bound.map_or_else(|| "N/A".to_string(), |p| p.to_string())
}

fn display_value(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ── HTML ─────────────────────────────────────────────────────────────────

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 1100px; padding: 0 1rem; }
.success { background: #e6f4ea; border-left: 4px solid #1e8e3e; padding: .6rem 1rem; }
.info    { background: #e8f0fe; border-left: 4px solid #1a73e8; padding: .6rem 1rem; }
.warning { background: #fef7e0; border-left: 4px solid #f9ab00; padding: .6rem 1rem; }
.error   { background: #fce8e6; border-left: 4px solid #d93025; padding: .6rem 1rem; }
.download-button-link {
    display: inline-flex; align-items: center; justify-content: center; font-weight: 500;
    padding: 0.25rem 0.75rem; border-radius: 0.25rem; margin: 0.5rem 0;
    line-height: 1.6; color: white !important; background-color: rgb(14, 17, 23);
    text-decoration: none !important;
}
.download-button-link:hover { background-color: rgb(40, 40, 40); }
.pdf-viewer-iframe { width: 100%; height: 600px; border: 2px solid #ccc; border-radius: 8px; margin-top: 10px; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ddd; padding: .3rem .8rem; text-align: left; }
pre { background: #f6f8fa; padding: 1rem; overflow-x: auto; }
"#;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the whole session as one HTML page.
pub fn render_html(result: &SessionResult) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>PDF Classification: {}</title>\n<style>{}</style>\n</head>\n<body>\n\
         <h1>PDF Metadata Extractor &amp; Splitter</h1>\n\
         <p class=\"info\">File <strong>{}</strong> uploaded successfully &amp; processed.</p>\n",
        escape_html(&result.filename),
        STYLE,
        escape_html(&result.filename),
    );

    push_message(&mut html, &status_message(result));

    if let Some(json) = result.metadata_json() {
        let _ = write!(
            html,
            "<a class=\"download-button-link\" href=\"data:application/json;charset=utf-8,{}\" \
             download=\"{}\">Download JSON</a>\n<hr>\n\
             <details>\n<summary>View Raw JSON Response</summary>\n<pre>{}</pre>\n</details>\n",
            percent_encode(&json),
            escape_html(&result.metadata_filename()),
            escape_html(&json),
        );
    }

    for warning in extract_warnings(result) {
        push_message(&mut html, &warning);
    }

    if let Some(heading) = results_heading(result) {
        if result.containers.is_empty() {
            push_message(&mut html, &heading);
        } else {
            let _ = writeln!(html, "<h2>{}</h2>", escape_html(&heading.text));
        }
    }

    for report in &result.containers {
        push_container(&mut html, report);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn push_message(html: &mut String, msg: &StatusMessage) {
    let _ = writeln!(
        html,
        "<p class=\"{}\">{}</p>",
        msg.level.css_class(),
        escape_html(&msg.text)
    );
    if let Some(ref detail) = msg.detail {
        let _ = writeln!(html, "<pre>{}</pre>", escape_html(detail));
    }
}

fn push_container(html: &mut String, report: &ContainerReport) {
    let _ = writeln!(html, "<h3>{}</h3>", escape_html(&container_heading(report)));

    match &report.status {
        SplitStatus::Split(doc) => {
            let data_url = pdf_data_url(&doc.bytes);
            let name = escape_html(&doc.filename);
            let _ = write!(
                html,
                "<a href=\"{data_url}\" download=\"{name}\" class=\"download-button-link\">\
                 Download Split {name}</a>\n\
                 <iframe class=\"pdf-viewer-iframe\" src=\"{data_url}\" \
                 title=\"Split PDF Preview for {}\"></iframe>\n",
                escape_html(&report.container.id),
            );
        }
        _ => push_message(html, &container_status(report)),
    }

    let rows = sub_document_rows(report);
    if !rows.is_empty() {
        html.push_str(
            "<h5>Extracted Split Document : Metadata:</h5>\n<table>\n\
             <tr><th>Document Type</th><th>Page Range</th></tr>\n",
        );
        for (doc_type, range) in rows {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&doc_type),
                escape_html(&range)
            );
        }
        html.push_str("</table>\n");
    }
    html.push_str("<hr>\n");
}

/// Percent-encode text for a `data:` URL.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3 / 2);
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || b"-_.~".contains(&b) {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}
