//! Integration tests for the analysis client.
//!
//! The client is blocking, so the mock server runs on its own runtime and
//! every request is made from the test thread outside of it.

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::{
    matchers::{body_json, body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

use scenario_review::api::{AnalysisClient, AnalysisService, ApiError};
use scenario_review::report::{Rating, Severity};

struct Harness {
    server: MockServer,
    rt: Runtime,
}

impl Harness {
    fn start() -> Self {
        let rt = Runtime::new().expect("runtime");
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn client(&self) -> AnalysisClient {
        // Trailing slash must not produce `//upload`.
        AnalysisClient::new(format!("{}/", self.server.uri()))
    }

    fn request_count(&self) -> usize {
        self.rt
            .block_on(self.server.received_requests())
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

fn done_body() -> serde_json::Value {
    json!({
        "status": "done",
        "file_id": "f-1",
        "overall_rating": "16+",
        "summary": "Two fights and some swearing.",
        "statistics": {
            "total_sentences": 120,
            "problematic_sentences": 9,
            "problematic_percentage": 7.5,
            "violations": {
                "violence": 5,
                "profanity": 4,
                "sexual_content": 0,
                "drugs_alcohol": 0,
                "fear_elements": 0
            }
        },
        "scenes": [
            {
                "id": "1",
                "title": "Kitchen",
                "timestamp": "00:01:00",
                "duration": "2:00",
                "violations": ["violence"],
                "severity": "Moderate",
                "text": "He throws the pan."
            }
        ]
    })
}

fn script(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let p = dir.path().join("pilot.txt");
    std::fs::write(&p, "INT. KITCHEN - DAY\nHe throws the pan.\n").unwrap();
    p
}

#[test]
fn upload_returns_completed_report() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(body_string_contains("INT. KITCHEN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(done_body())),
    );
    let dir = tempfile::tempdir().unwrap();

    let report = h.client().upload_file(&script(&dir)).unwrap();

    assert_eq!(report.overall_rating, Rating::Sixteen);
    assert_eq!(report.filename, "pilot.txt");
    assert_eq!(report.statistics.violations.violence, 5);
    assert_eq!(report.scenes()[0].severity, Severity::Moderate);
    assert_eq!(h.request_count(), 1);
}

#[test]
fn upload_not_done_is_an_error() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "processing" }))),
    );
    let dir = tempfile::tempdir().unwrap();

    let err = h.client().upload_file(&script(&dir)).unwrap_err();
    assert!(matches!(err, ApiError::NotCompleted { ref status } if status == "processing"));
}

#[test]
fn server_error_is_not_retried() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom")),
    );
    let dir = tempfile::tempdir().unwrap();

    let err = h.client().upload_file(&script(&dir)).unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(h.request_count(), 1);
}

#[test]
fn missing_file_never_reaches_the_server() {
    let h = Harness::start();
    let err = h
        .client()
        .upload_file(std::path::Path::new("/nonexistent/script.txt"))
        .unwrap_err();
    assert!(matches!(err, ApiError::File { .. }));
    assert_eq!(h.request_count(), 0);
}

#[test]
fn chat_posts_message_json() {
    let h = Harness::start();
    let mut body = done_body();
    body.as_object_mut().unwrap().remove("status");
    h.mount(
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({ "message": "is this ok for kids?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body)),
    );

    let report = h.client().analyze_text("is this ok for kids?").unwrap();
    assert_eq!(report.summary, "Two fights and some swearing.");
    assert_eq!(report.statistics.problematic_sentences, 9);
}

#[test]
fn chat_without_statistics_is_malformed() {
    let h = Harness::start();
    h.mount(
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hi" }))),
    );

    let err = h.client().analyze_text("hello").unwrap_err();
    assert!(matches!(err, ApiError::Malformed { .. }));
}

#[test]
fn unreachable_service_is_a_transport_error() {
    // Nothing listens on port 9 of localhost.
    let client = AnalysisClient::new("http://127.0.0.1:9");
    let err = client.analyze_text("hello").unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}
