use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::report::AnalysisReport;

/// Default analysis service address, used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://158.160.98.70:8000";

/// Status value the upload endpoint sends once a report is complete.
const STATUS_DONE: &str = "done";

/// Failures talking to the analysis service. None of them are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from analysis service: {message}")]
    Malformed { message: String },

    #[error("Analysis not completed (status: {status})")]
    NotCompleted { status: String },

    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The two operations the rest of the crate needs from the analysis service.
pub trait AnalysisService {
    /// Upload a script file and return its completed report.
    fn upload_file(&self, path: &Path) -> Result<AnalysisReport, ApiError>;

    /// Analyze a single chat message or scene text.
    fn analyze_text(&self, text: &str) -> Result<AnalysisReport, ApiError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

pub struct AnalysisClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn read_json(
        &self,
        url: &str,
        resp: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<serde_json::Value, ApiError> {
        let resp = resp.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<serde_json::Value>()
            .map_err(|e| ApiError::Malformed {
                message: e.to_string(),
            })
    }
}

impl AnalysisService for AnalysisClient {
    fn upload_file(&self, path: &Path) -> Result<AnalysisReport, ApiError> {
        let url = self.url("/upload");
        let form = reqwest::blocking::multipart::Form::new()
            .file("file", path)
            .map_err(|source| ApiError::File {
                path: path.display().to_string(),
                source,
            })?;

        info!("uploading {} to {}", path.display(), url);
        let resp = self.client.post(&url).multipart(form).send();
        let body = self.read_json(&url, resp)?;
        debug!("upload response: {body}");

        let mut report = parse_upload_response(body)?;
        if report.filename.is_empty() {
            report.filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
        }
        Ok(report)
    }

    fn analyze_text(&self, text: &str) -> Result<AnalysisReport, ApiError> {
        let url = self.url("/chat");
        let resp = self
            .client
            .post(&url)
            .json(&ChatRequest { message: text })
            .send();
        let body = self.read_json(&url, resp)?;
        debug!("chat response: {body}");

        if body.get("statistics").is_none() {
            return Err(ApiError::Malformed {
                message: "missing statistics".to_string(),
            });
        }
        serde_json::from_value(body).map_err(|e| ApiError::Malformed {
            message: e.to_string(),
        })
    }
}

/// Accept an upload body only when the service reports it as done.
pub fn parse_upload_response(body: serde_json::Value) -> Result<AnalysisReport, ApiError> {
    let status = body
        .get("status")
        .and_then(|s| s.as_str())
        .unwrap_or_default()
        .to_string();
    if status != STATUS_DONE {
        return Err(ApiError::NotCompleted { status });
    }
    serde_json::from_value(body).map_err(|e| ApiError::Malformed {
        message: e.to_string(),
    })
}
