use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::AnalysisService;
use crate::db::models::{NewScenario, Scenario};
use crate::db::Database;
use crate::output::notice::{self, Notice};
use crate::report::AnalysisReport;

/// Script formats the analysis service accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["txt", "pdf", "docx"];

pub fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Progress stages of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Analyzing,
    Processing,
    Done,
}

impl Stage {
    pub fn percent(&self) -> u8 {
        match self {
            Stage::Uploading => 10,
            Stage::Analyzing => 30,
            Stage::Processing => 70,
            Stage::Done => 100,
        }
    }
}

#[derive(Debug)]
pub struct Uploaded {
    pub path: PathBuf,
    pub scenario: Scenario,
    pub report: AnalysisReport,
}

#[derive(Debug, Default)]
pub struct UploadSummary {
    pub uploaded: Vec<Uploaded>,
    pub failed: Vec<(PathBuf, String)>,
    pub would_upload: Vec<PathBuf>,
}

/// Expand files, directories and glob patterns into accepted script files.
pub fn resolve_paths(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();

    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_dir() {
            collect_directory(path, &mut out)?;
        } else if path.is_file() {
            out.push(path.to_path_buf());
        } else {
            let matches: Vec<_> = glob::glob(path_str)
                .with_context(|| format!("Invalid path or glob pattern: {path_str}"))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect();

            if matches.is_empty() {
                bail!("No files found matching: {path_str}");
            }
            out.extend(matches);
        }
    }

    Ok(out)
}

fn collect_directory(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_directory(&path, out)?;
        } else if path.is_file() && is_accepted(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Upload every resolved file, storing each completed analysis as a scenario.
///
/// A failing file is reported as a notice and does not stop the others.
pub fn upload_paths(
    db: &Database,
    service: &dyn AnalysisService,
    paths: &[String],
    user_id: &str,
    dry_run: bool,
) -> Result<UploadSummary> {
    let files = resolve_paths(paths)?;
    let mut summary = UploadSummary::default();

    for path in files {
        if !is_accepted(&path) {
            notice::emit(&Notice::error(
                "Unsupported file",
                format!("{} (accepted: .txt, .pdf, .docx)", path.display()),
            ));
            summary
                .failed
                .push((path, "unsupported file type".to_string()));
            continue;
        }

        if dry_run {
            summary.would_upload.push(path);
            continue;
        }

        match upload_file(db, service, &path, user_id) {
            Ok(uploaded) => summary.uploaded.push(uploaded),
            Err(e) => {
                notice::emit(&Notice::error("Analysis failed", format!("{}: {e:#}", path.display())));
                summary.failed.push((path, format!("{e:#}")));
            }
        }
    }

    Ok(summary)
}

/// Upload one file, then store it with its report.
pub fn upload_file(
    db: &Database,
    service: &dyn AnalysisService,
    path: &Path,
    user_id: &str,
) -> Result<Uploaded> {
    let bytes = std::fs::metadata(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?
        .len();
    notice::emit(&Notice::info(
        "File selected",
        format!("{} ({} KB)", path.display(), (bytes as f64 / 1024.0).round()),
    ));

    progress(path, Stage::Uploading);
    progress(path, Stage::Analyzing);
    let report = service.upload_file(path)?;
    progress(path, Stage::Processing);

    let raw = std::fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
    let content = String::from_utf8_lossy(&raw).into_owned();
    let title = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("untitled")
        .to_string();

    let scenario = db.insert_scenario(&NewScenario {
        user_id: user_id.to_string(),
        title,
        content,
        analysis_data: Some(serde_json::to_value(&report)?),
    })?;
    progress(path, Stage::Done);

    notice::emit(&Notice::success("Analysis complete", "Results saved"));
    Ok(Uploaded {
        path: path.to_path_buf(),
        scenario,
        report,
    })
}

fn progress(path: &Path, stage: Stage) {
    info!("{} [{:>3}%] {:?}", path.display(), stage.percent(), stage);
}
