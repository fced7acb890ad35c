//! End-to-end flows over a scratch database: upload, review, export, chat.

use std::cell::Cell;
use std::path::Path;

use pretty_assertions::assert_eq;

use scenario_review::api::{AnalysisService, ApiError};
use scenario_review::chat::{self, ReplyMode};
use scenario_review::db::models::Role;
use scenario_review::db::Database;
use scenario_review::export::{self, pdf::PdfOptions};
use scenario_review::report::{AnalysisReport, Category, Rating, Scene, Severity, Statistics, ViolationCounts};
use scenario_review::review::session::ReviewSession;
use scenario_review::upload;

/// Answers every upload with the same report; chat replies fail after `chat_ok` calls.
struct ScriptedService {
    report: AnalysisReport,
    chat_ok: usize,
    chat_calls: Cell<usize>,
}

impl AnalysisService for ScriptedService {
    fn upload_file(&self, path: &Path) -> Result<AnalysisReport, ApiError> {
        let mut report = self.report.clone();
        report.filename = path.file_name().unwrap().to_string_lossy().into_owned();
        Ok(report)
    }

    fn analyze_text(&self, _text: &str) -> Result<AnalysisReport, ApiError> {
        let n = self.chat_calls.get();
        self.chat_calls.set(n + 1);
        if n < self.chat_ok {
            Ok(self.report.clone())
        } else {
            Err(ApiError::Status {
                status: 502,
                body: "bad gateway".into(),
            })
        }
    }
}

fn service(chat_ok: usize) -> ScriptedService {
    ScriptedService {
        report: AnalysisReport {
            file_id: "f-9".into(),
            overall_rating: Rating::Eighteen,
            summary: "Bar fight, heavy drinking.".into(),
            statistics: Statistics {
                total_sentences: 40,
                problematic_sentences: 6,
                problematic_percentage: 15.0,
                violations: ViolationCounts {
                    violence: 2,
                    profanity: 1,
                    drugs_alcohol: 3,
                    ..Default::default()
                },
            },
            scenes: Some(vec![
                Scene {
                    id: "1".into(),
                    title: "Bar".into(),
                    timestamp: "00:00:30".into(),
                    duration: "3:00".into(),
                    violations: vec!["violence".into(), "drugs_alcohol".into()],
                    severity: Severity::Severe,
                    text: "He smashes a bottle.".into(),
                },
                Scene {
                    id: "2".into(),
                    title: "Alley".into(),
                    timestamp: "00:03:30".into(),
                    duration: "1:00".into(),
                    violations: vec!["profanity".into()],
                    severity: Severity::Mild,
                    text: "She swears at the rain.".into(),
                },
            ]),
            ..Default::default()
        },
        chat_ok,
        chat_calls: Cell::new(0),
    }
}

#[test]
fn upload_review_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("screview.db")).unwrap();
    let scripts = dir.path().join("scripts");
    std::fs::create_dir(&scripts).unwrap();
    std::fs::write(
        scripts.join("pilot.txt"),
        "INT. BAR - NIGHT\nHe smashes a bottle.\nEXT. ALLEY - NIGHT\nShe swears at the rain.\n",
    )
    .unwrap();
    std::fs::write(scripts.join("notes.md"), "ignored").unwrap();

    let svc = service(0);
    let summary = upload::upload_paths(&db, &svc, &[scripts.display().to_string()], "alice", false).unwrap();
    assert_eq!(summary.uploaded.len(), 1);
    assert!(summary.failed.is_empty());

    let listed = db.list_scenarios(Some("alice"), 10).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].rating.as_deref(), Some("18+"));
    assert!(db.list_scenarios(Some("bob"), 10).unwrap().is_empty());

    let stored = db.get_scenario(&listed[0].id).unwrap().unwrap();
    let mut session = ReviewSession::from_scenario(&stored, Rating::Twelve).unwrap();
    assert_eq!(session.report.filename, "pilot.txt");
    assert_eq!(session.violations[0].count, 1);
    assert_eq!(session.violations[0].percentage, 50.0);
    assert_eq!(session.recommendations.len(), 3);

    // Dismiss the only profanity episode and soften the bar scene.
    session.toggle_false_positive(Category::Profanity, 0).unwrap();
    session.apply_recommendation("1-violence", 0).unwrap();
    assert!(!session.content.contains("He smashes a bottle."));
    assert_eq!(session.history.len(), 2);

    let out = dir.path().join("out");
    let json_path = export::json::write(&out, &session.report, &session.violations, &session.title).unwrap();
    let exported: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let categories: Vec<&str> = exported["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["category"].as_str().unwrap())
        .collect();
    assert_eq!(
        categories,
        vec!["violence", "sexual_content", "drugs_alcohol", "fear_elements"]
    );

    let pdf_path = export::pdf::write(&out, &session.report, PdfOptions { charts: true, timeline: true }).unwrap();
    let name = pdf_path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("scenario-report-18+-") && name.ends_with(".pdf"));
    let doc = lopdf::Document::load(&pdf_path).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[test]
fn stored_scenario_without_report_cannot_be_reviewed() {
    let db = Database::open_in_memory().unwrap();
    let (scenario, _) = scenario_review::admin::analyze_scenario(&db, "alice", "Draft", "INT. ROOM\nHi.").unwrap();
    let stored = db.get_scenario(&scenario.id).unwrap().unwrap();
    assert!(ReviewSession::from_scenario(&stored, Rating::Twelve).is_err());
}

#[test]
fn chat_feed_delivers_both_sides_and_falls_back() {
    let db = Database::open_in_memory().unwrap();
    let svc = service(1);
    let conv = db.create_conversation("alice", chat::DEFAULT_TITLE).unwrap();
    let other = db.create_conversation("alice", "Other").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let feed = db.subscribe(&conv.id);
    let other_feed = db.subscribe(&other.id);

    let first = chat::send_message(&db, &svc, &conv.id, "  rate this  ", ReplyMode::Live).unwrap();
    assert!(!first.fell_back);
    assert!(first.assistant.content.contains("18+"));

    let second = chat::send_message(&db, &svc, &conv.id, "and this?", ReplyMode::Live).unwrap();
    assert!(second.fell_back);
    assert_eq!(second.assistant.content, chat::fallback_reply("and this?"));

    let delivered = feed.drain();
    let roles: Vec<Role> = delivered.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(delivered[0].content, "rate this");
    assert!(other_feed.drain().is_empty());

    assert_eq!(db.list_messages(&conv.id).unwrap().len(), 4);
    // Activity moves the conversation to the top of the list.
    assert_eq!(db.list_conversations("alice").unwrap()[0].id, conv.id);

    drop(feed);
    drop(other_feed);
    assert_eq!(db.subscriber_count(), 0);
}
