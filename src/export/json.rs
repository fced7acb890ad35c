use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::report::AnalysisReport;
use crate::review::Violation;

/// JSON export: the report plus the locally edited parents guide.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub report: &'a AnalysisReport,
    pub violations: Vec<&'a Violation>,
    pub exported_at: String,
}

/// Build the export, dropping categories whose every episode was dismissed
/// as a false positive.
pub fn build_document<'a>(report: &'a AnalysisReport, violations: &'a [Violation]) -> ExportDocument<'a> {
    ExportDocument {
        report,
        violations: violations.iter().filter(|v| !v.fully_dismissed()).collect(),
        exported_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// `analysis-report-<filename>.json`
pub fn file_name(report_filename: &str) -> String {
    format!("analysis-report-{}.json", super::sanitize(report_filename))
}

pub fn write(out_dir: &Path, report: &AnalysisReport, violations: &[Violation], fallback_name: &str) -> Result<PathBuf> {
    let doc = build_document(report, violations);
    let name = if report.filename.is_empty() {
        fallback_name
    } else {
        report.filename.as_str()
    };
    let path = out_dir.join(file_name(name));
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;
    let json = serde_json::to_string_pretty(&doc)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write: {}", path.display()))?;
    Ok(path)
}
