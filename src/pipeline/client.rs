//! Remote classification client: one multipart POST per upload.
//!
//! Every way the call can end is mapped onto a [`ClassifyOutcome`] value
//! rather than an error, because each one is rendered to the user as a
//! distinct status. There is no retry: a failed call is reported and the
//! user decides whether to run it again.

use crate::config::ClientConfig;
use crate::output::{Classification, ClassifyOutcome, ResponseBody};
use crate::pipeline::input::UploadedFile;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::error::Error as _;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Send `upload` to the classification endpoint and classify the answer.
pub async fn classify(upload: &UploadedFile, config: &ClientConfig) -> Classification {
    let start = Instant::now();
    info!(
        "Sending '{}' ({} bytes) to {}",
        upload.filename(),
        upload.len(),
        config.endpoint
    );

    let outcome = send(upload, config).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &outcome {
        ClassifyOutcome::Success { .. } => info!("Classifier answered in {}ms", elapsed_ms),
        other => warn!("Classifier call failed after {}ms: {:?}", elapsed_ms, other),
    }

    Classification {
        outcome,
        elapsed_ms,
    }
}

async fn send(upload: &UploadedFile, config: &ClientConfig) -> ClassifyOutcome {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
    {
        Ok(c) => c,
        Err(e) => return transport_outcome(&e, config.timeout_secs),
    };

    let part = match Part::bytes(upload.bytes().to_vec())
        .file_name(upload.filename().to_string())
        .mime_str("application/pdf")
    {
        Ok(p) => p,
        Err(e) => return transport_outcome(&e, config.timeout_secs),
    };
    let form = Form::new().part("file", part);

    let response = match client
        .post(&config.endpoint)
        .header(ACCEPT, config.accept.as_str())
        .multipart(form)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => return transport_outcome(&e, config.timeout_secs),
    };

    let status = response.status();
    debug!("Classifier responded with HTTP {}", status);

    let text = match response.text().await {
        Ok(t) => t,
        Err(e) => return transport_outcome(&e, config.timeout_secs),
    };

    outcome_from_response(status, text)
}

/// Map a completed HTTP exchange onto an outcome. Only 200 counts as success.
pub(crate) fn outcome_from_response(status: StatusCode, text: String) -> ClassifyOutcome {
    match status {
        StatusCode::OK => match serde_json::from_str(&text) {
            Ok(body) => ClassifyOutcome::Success { body },
            Err(e) => {
                debug!("200 body is not JSON: {}", e);
                ClassifyOutcome::MalformedResponse { body: text }
            }
        },
        StatusCode::NOT_FOUND => ClassifyOutcome::EndpointNotFound,
        other => ClassifyOutcome::ServerError {
            status: other.as_u16(),
            body: ResponseBody::parse(text),
        },
    }
}

fn transport_outcome(e: &reqwest::Error, timeout_secs: u64) -> ClassifyOutcome {
    if e.is_timeout() {
        ClassifyOutcome::Timeout { secs: timeout_secs }
    } else {
        ClassifyOutcome::Transport {
            cause: error_chain(e),
        }
    }
}

/// `reqwest::Error` displays only its outermost layer; append the sources.
fn error_chain(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = inner.source();
    }
    msg
}
