//! End-to-end tests for pdf-container-split.
//!
//! Each test stands up a one-shot fake classifier on `127.0.0.1` (a bare
//! `tokio::net::TcpListener` speaking just enough HTTP/1.1), generates its
//! source PDF in memory with lopdf, and drives the public API exactly as
//! the CLI does. No network access or external files are needed.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_container_split::{
    process, process_sync, write_outputs, ClassifyOutcome, ClientConfig, OutputOptions,
    ResponseBody, Session, SessionProgressCallback, SplitError, SplitStatus, UploadedFile,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Build an `n`-page PDF whose page `i` draws the text `Page i`.
fn build_pdf(n: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 1..=n {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {i}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => n as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// `Page i` markers of every page of `bytes`, in page order.
fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("split output must be a readable PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let content = doc.get_page_content(id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find("(Page ").expect("marker present") + 1;
            let end = start + text[start..].find(')').unwrap();
            text[start..end].to_string()
        })
        .collect()
}

fn upload(pages: u32) -> UploadedFile {
    UploadedFile::from_bytes("bundle.pdf", build_pdf(pages)).expect("generated PDF is valid")
}

fn config_for(url: &str) -> ClientConfig {
    ClientConfig::builder()
        .endpoint(url)
        .timeout_secs(10)
        .build()
        .expect("valid config")
}

fn response_with(containers: serde_json::Value) -> String {
    json!({
        "status": "ok",
        "data": {"extracted_data": {"gpt_extraction_output": {"containers": containers}}}
    })
    .to_string()
}

/// Serve exactly one request, answer it with `status` and `body`, and hand
/// back the raw request text.
async fn serve_once(
    status: u16,
    content_type: &'static str,
    body: impl Into<String>,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.into();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status} Test\r\ncontent-type: {content_type}\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}/api/process/OcrBytes"), handle)
}

async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if request_complete(&buf) {
            break;
        }
    }
    buf
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let body_len = buf.len() - header_end - 4;
    let content_length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());
    match content_length {
        Some(len) => body_len >= len,
        None if head.contains("transfer-encoding: chunked") => buf.ends_with(b"0\r\n\r\n"),
        None => true,
    }
}

#[derive(Default)]
struct CountingCallback {
    requests: AtomicUsize,
    split_starts: AtomicUsize,
    split: AtomicUsize,
    skipped: AtomicUsize,
    errors: AtomicUsize,
}

impl SessionProgressCallback for CountingCallback {
    fn on_request_start(&self, _endpoint: &str, _filename: &str, _size: usize) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
    fn on_split_start(&self, _total: usize) {
        self.split_starts.fetch_add(1, Ordering::SeqCst);
    }
    fn on_container_split(&self, _i: usize, _t: usize, _id: &str, _pages: usize) {
        self.split.fetch_add(1, Ordering::SeqCst);
    }
    fn on_container_skipped(&self, _i: usize, _t: usize, _id: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }
    fn on_container_error(&self, _i: usize, _t: usize, _id: &str, _e: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Successful classification ────────────────────────────────────────────────

#[tokio::test]
async fn test_mixed_containers_split_independently() {
    let body = response_with(json!([
        {
            "container_number": "MSCU1234567",
            "page_start_number": 3,
            "page_end_number": 5,
            "bill_of_lading": {"page_start_number": 3, "page_end_number": 3},
            "commercial_invoice": {"page_start_number": 4, "page_end_number": 5}
        },
        {"container_number": "NOSTART", "page_end_number": 2},
        {"container_number": "TOOFAR", "page_start_number": 9, "page_end_number": 12},
        {"container_number": "BACKWARDS", "page_start_number": 6, "page_end_number": 4},
        {"container_number": "LAST", "page_start_number": 10, "page_end_number": 10}
    ]));
    let (url, server) = serve_once(200, "application/json", body).await;
    let tracker = Arc::new(CountingCallback::default());
    let config = ClientConfig::builder()
        .endpoint(&url)
        .progress_callback(tracker.clone())
        .build()
        .unwrap();

    let result = process(Arc::new(upload(10)), &config).await.unwrap();

    assert!(result.classification.outcome.is_success());
    assert_eq!(result.containers.len(), 5);
    assert_eq!(result.split_count(), 2);
    assert_eq!(result.skipped_count(), 1);
    assert_eq!(result.failed_count(), 2);

    let first = result.containers[0].document().expect("first container split");
    assert_eq!(first.filename, "MSCU1234567_pages_3-5.pdf");
    assert_eq!(page_markers(&first.bytes), ["Page 3", "Page 4", "Page 5"]);

    assert_eq!(result.containers[1].status, SplitStatus::Skipped);
    assert_eq!(
        result.containers[2].status,
        SplitStatus::Failed(SplitError::OutOfRange {
            start: 9,
            end: 12,
            total: 10
        })
    );
    assert_eq!(
        result.containers[3].status,
        SplitStatus::Failed(SplitError::InvalidRange { start: 6, end: 4 })
    );
    let last = result.containers[4].document().expect("last container split");
    assert_eq!(page_markers(&last.bytes), ["Page 10"]);

    assert_eq!(tracker.requests.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.split.load(Ordering::SeqCst), 2);
    assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.errors.load(Ordering::SeqCst), 2);

    // The upload went out as a multipart `file` field with the PDF bytes.
    let request = server.await.unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /api/process/OcrBytes "), "{request:.200}");
    assert!(lower.contains("accept: application/json"));
    assert!(lower.contains("content-type: multipart/form-data; boundary="));
    assert!(request.contains("name=\"file\"; filename=\"bundle.pdf\""));
    assert!(lower.contains("content-type: application/pdf"));
    assert!(request.contains("%PDF-1.5"));
}

#[tokio::test]
async fn test_empty_container_list() {
    let (url, _server) = serve_once(200, "application/json", response_with(json!([]))).await;

    let result = process(Arc::new(upload(2)), &config_for(&url)).await.unwrap();

    assert!(result.classification.outcome.is_success());
    assert!(result.containers.is_empty());
    assert!(result.extract_problems.is_empty());
    assert_eq!(result.split_count(), 0);
    assert!(result.metadata_json().unwrap().contains("\"containers\": []"));
}

#[tokio::test]
async fn test_wrong_type_containers_reported() {
    let (url, _server) =
        serve_once(200, "application/json", response_with(json!({"oops": 1}))).await;

    let result = process(Arc::new(upload(2)), &config_for(&url)).await.unwrap();

    assert!(result.containers.is_empty());
    assert_eq!(result.extract_problems.len(), 1);
    assert!(result.extract_problems[0]
        .to_string()
        .contains("found an object"));
}

#[tokio::test]
async fn test_non_json_success_body_is_malformed() {
    let (url, _server) = serve_once(200, "text/html", "<html>proxy page</html>").await;

    let result = process(Arc::new(upload(1)), &config_for(&url)).await.unwrap();

    assert_eq!(
        result.classification.outcome,
        ClassifyOutcome::MalformedResponse {
            body: "<html>proxy page</html>".into()
        }
    );
    assert!(result.containers.is_empty());
}

// ── Failure states ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_makes_no_split_attempts() {
    let (url, _server) = serve_once(404, "application/json", r#"{"detail":"Not Found"}"#).await;
    let tracker = Arc::new(CountingCallback::default());
    let config = ClientConfig::builder()
        .endpoint(&url)
        .progress_callback(tracker.clone())
        .build()
        .unwrap();

    let result = process(Arc::new(upload(3)), &config).await.unwrap();

    assert_eq!(result.classification.outcome, ClassifyOutcome::EndpointNotFound);
    assert!(result.containers.is_empty());
    assert!(result.metadata_json().is_none());
    assert_eq!(tracker.split_starts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_server_error_with_text_body() {
    let (url, _server) = serve_once(500, "text/plain", "Internal Server Error").await;

    let result = process(Arc::new(upload(3)), &config_for(&url)).await.unwrap();

    assert_eq!(
        result.classification.outcome,
        ClassifyOutcome::ServerError {
            status: 500,
            body: ResponseBody::Text("Internal Server Error".into()),
        }
    );
    let html = pdf_container_split::render::render_html(&result);
    assert!(html.contains("API call failed with status code: 500"));
    assert!(html.contains("<pre>Internal Server Error</pre>"));
}

#[tokio::test]
async fn test_server_error_with_json_body() {
    let (url, _server) =
        serve_once(422, "application/json", r#"{"detail":"file must be a PDF"}"#).await;

    let result = process(Arc::new(upload(1)), &config_for(&url)).await.unwrap();

    assert_eq!(
        result.classification.outcome,
        ClassifyOutcome::ServerError {
            status: 422,
            body: ResponseBody::Json(json!({"detail": "file must be a PDF"})),
        }
    );
}

#[tokio::test]
async fn test_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/slow", listener.local_addr().unwrap());
    let _server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    let config = ClientConfig::builder()
        .endpoint(&url)
        .timeout_secs(1)
        .build()
        .unwrap();

    let result = process(Arc::new(upload(1)), &config).await.unwrap();

    assert_eq!(result.classification.outcome, ClassifyOutcome::Timeout { secs: 1 });
    assert!(result.classification.elapsed_ms >= 900);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/gone", listener.local_addr().unwrap());
    drop(listener);

    let result = process(Arc::new(upload(1)), &config_for(&url)).await.unwrap();

    match result.classification.outcome {
        ClassifyOutcome::Transport { ref cause } => assert!(!cause.is_empty()),
        ref other => panic!("expected transport error, got {other:?}"),
    }
}

// ── Sessions and outputs ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_snapshots_are_independent() {
    let body = response_with(json!([
        {"container_number": "C1", "page_start_number": 1, "page_end_number": 2}
    ]));
    let (url, _server) = serve_once(200, "application/json", body).await;

    let fresh = Session::new(upload(2));
    let processed = fresh.process(&config_for(&url)).await.unwrap();

    assert!(fresh.last_result().is_none());
    let result = processed.last_result().expect("processed snapshot has a result");
    assert_eq!(result.split_count(), 1);
    assert_eq!(processed.upload().filename(), "bundle.pdf");
}

#[test]
fn test_process_sync_blocks_until_done() {
    let server_rt = tokio::runtime::Runtime::new().unwrap();
    let body = response_with(json!([
        {"container_number": "S1", "page_start_number": 2, "page_end_number": 3}
    ]));
    let (url, _server) = server_rt.block_on(serve_once(200, "application/json", body));

    let result = process_sync(upload(4), &config_for(&url)).unwrap();

    let doc = result.containers[0].document().unwrap();
    assert_eq!(page_markers(&doc.bytes), ["Page 2", "Page 3"]);
}

#[tokio::test]
async fn test_outputs_written_to_directory() {
    let body = response_with(json!([
        {
            "container_number": "TGHU8765432",
            "page_start_number": 1,
            "page_end_number": 3,
            "packing_list": {"page_start_number": 2, "page_end_number": 2}
        }
    ]));
    let (url, _server) = serve_once(200, "application/json", body).await;
    let result = process(Arc::new(upload(5)), &config_for(&url)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let outputs = write_outputs(&result, dir.path(), OutputOptions::default()).unwrap();
    assert_eq!(outputs.written.len(), 3);
    assert!(outputs.failures.is_empty());

    let pdf = std::fs::read(dir.path().join("TGHU8765432_pages_1-3.pdf")).unwrap();
    assert_eq!(page_markers(&pdf), ["Page 1", "Page 2", "Page 3"]);

    let json: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("bundle.pdf_metadata.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["status"], "ok");

    let html = std::fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(html.contains("Container: TGHU8765432 (Pages: 1 - 3)"));
    assert!(html.contains("<td>Packing List</td><td>Page 2</td>"));
    assert!(html.contains("data:application/pdf;base64,"));
}

#[tokio::test]
async fn test_session_summary_serialises() {
    let (url, _server) = serve_once(200, "application/json", response_with(json!([
        {"container_number": "C1", "page_start_number": 1, "page_end_number": 1}
    ])))
    .await;
    let result = process(Arc::new(upload(1)), &config_for(&url)).await.unwrap();

    let summary = serde_json::to_value(&result).unwrap();
    assert_eq!(summary["classification"]["outcome"]["kind"], "success");
    assert_eq!(summary["containers"][0]["status"]["state"], "split");
    assert_eq!(
        summary["containers"][0]["status"]["detail"]["filename"],
        "C1_pages_1-1.pdf"
    );
    // PDF bytes stay out of the summary.
    assert!(summary["containers"][0]["status"]["detail"].get("bytes").is_none());
}
