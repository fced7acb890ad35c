use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::db::models::*;
use crate::report::{AnalysisReport, Category, Scene};
use crate::review::recommendations::Recommendation;
use crate::review::timeline::TimelineStats;
use crate::review::versions::{RatingChange, VersionHistory};
use crate::review::{ChartDatum, Violation};

const BAR_WIDTH: usize = 40;

/// Truncate a string to fit within max_width (respecting unicode width).
pub fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn bar(value: f64, max: f64) -> String {
    let filled = if max <= 0.0 {
        0
    } else {
        ((value / max) * BAR_WIDTH as f64).round() as usize
    };
    "█".repeat(filled.min(BAR_WIDTH))
}

/// Rating, summary and aggregate statistics of one report.
pub fn print_report_overview(title: &str, report: &AnalysisReport) {
    let stats = &report.statistics;
    println!("Scenario: {title}");
    println!("  Rating:      {}", report.overall_rating);
    println!("  Scenes:      {}", report.scenes().len());
    println!("  Sentences:   {}", stats.total_sentences);
    println!(
        "  Problematic: {} ({:.1}%)",
        stats.problematic_sentences, stats.problematic_percentage
    );
    if !report.summary.is_empty() {
        println!("\nSummary:");
        for line in report.summary.lines() {
            println!("  {line}");
        }
    }
    println!("\nViolations:");
    for (category, count) in stats.violations.iter() {
        println!("  {:<16} {count}", category.label());
    }
}

/// The editable parents guide: one block per category with numbered episodes.
pub fn print_parents_guide(violations: &[Violation]) {
    println!("Parents guide:\n");
    for v in violations {
        println!(
            "  {:<16} {:<9} {:>3} scene{} ({:.1}%)",
            v.category.label(),
            v.severity,
            v.count,
            plural(v.count as usize),
            v.percentage
        );
        for (i, e) in v.episodes.iter().enumerate() {
            let mark = if e.is_false_positive { "[fp]" } else { "    " };
            println!(
                "    {i:>2} {mark} {:<10} {}",
                truncate(&e.timestamp, 10),
                truncate(&format!("{}: {}", e.scene, e.description), 60)
            );
        }
        if v.fully_dismissed() {
            println!("       all episodes marked as false positives");
        }
    }
}

pub fn print_charts(data: &[ChartDatum]) {
    let max = data.iter().map(|d| d.count).max().unwrap_or(0) as f64;
    println!("Violations by category:\n");
    for d in data {
        println!(
            "  {:<16} {:<40} {:>4} ({:.1}%)",
            d.label,
            bar(d.count as f64, max),
            d.count,
            d.percentage
        );
    }
}

pub fn print_timeline(timeline: &TimelineStats) {
    if timeline.points.is_empty() {
        println!("No scenes in this report.");
        return;
    }
    println!("Timeline ({} total):\n", timeline.total_duration);
    let header: String = Category::ALL
        .iter()
        .map(|c| format!("{:>4}", &c.key()[..3]))
        .collect();
    println!("  {:<10} {:<8} {header}  {:>5}  INTENSITY", "TIME", "SCENE", "TOTAL");
    println!("  {}", "-".repeat(76));
    for p in &timeline.points {
        let counts: String = p.counts.iter().map(|n| format!("{n:>4}")).collect();
        let strip: String = std::iter::repeat(p.bucket.glyph())
            .take(((p.intensity / 100.0) * 20.0).ceil().max(1.0) as usize)
            .collect();
        println!(
            "  {:<10} {:<8} {counts}  {:>5}  {strip}",
            truncate(&p.timestamp, 10),
            truncate(&p.scene_id, 8),
            p.total
        );
    }
}

pub fn print_scenes(scenes: &[&Scene]) {
    if scenes.is_empty() {
        println!("No scenes match.");
        return;
    }
    println!("{} scene{}:\n", scenes.len(), plural(scenes.len()));
    for s in scenes {
        let labels: Vec<&str> = s
            .violations
            .iter()
            .map(|v| crate::report::category::label_for(v))
            .collect();
        println!(
            "  [{}] {} ({}, {})",
            s.id,
            truncate(&s.title, 40),
            s.timestamp,
            s.severity
        );
        if !labels.is_empty() {
            println!("      {}", truncate(&labels.join(", "), 72));
        }
        if !s.text.is_empty() {
            println!("      {}", truncate(&s.text.replace('\n', " "), 72));
        }
    }
}

pub fn print_recommendations(recs: &[Recommendation]) {
    if recs.is_empty() {
        println!("No recommendations: the rating is within the target.");
        return;
    }
    for r in recs {
        let state = if r.applied { " (applied)" } else { "" };
        println!(
            "{} [{}] {} at {}{state}",
            r.id,
            r.priority.as_str(),
            r.scene,
            r.timestamp
        );
        println!("  Issue:   {}", r.issue);
        println!("  Current: {}", truncate(&r.current_text.replace('\n', " "), 68));
        for (i, s) in r.suggestions.iter().enumerate() {
            println!("  {i}. {} [{}]", truncate(&s.text, 60), s.rating_impact);
            println!("     {}", s.explanation);
        }
        println!();
    }
}

pub fn print_versions(history: &VersionHistory) {
    println!("{} version{}:\n", history.len(), plural(history.len()));
    for (i, v) in history.versions().iter().enumerate() {
        println!(
            "  {:<4} {:<10} {:<5} {:<20} {}",
            v.id,
            history.label(i),
            v.rating,
            v.timestamp.get(..19).unwrap_or(&v.timestamp),
            truncate(&v.changes, 36)
        );
    }
}

pub fn print_comparison(changes: &[RatingChange]) {
    if changes.is_empty() {
        println!("Need at least two scenarios to compare.");
        return;
    }
    for c in changes {
        let movement = match (c.diff, c.trend) {
            (Some(d), Some(t)) => format!("{d:+} ({})", t.as_str()),
            _ => "not comparable".to_string(),
        };
        println!(
            "  {:<30} {:>4} -> {:<4} {:<30} {movement}",
            truncate(&c.from, 30),
            c.from_rating,
            c.to_rating,
            truncate(&c.to, 30)
        );
    }
}

pub fn print_scenario_list(results: &[ScenarioSummary]) {
    if results.is_empty() {
        println!("No scenarios found.");
        return;
    }
    println!("{} scenario{}:\n", results.len(), plural(results.len()));
    println!("  {:<42} {:<8} {:<12} {:>8}", "TITLE", "RATING", "DATE", "SIZE");
    println!("  {}", "-".repeat(74));
    for r in results {
        println!(
            "  {:<42} {:<8} {:<12} {:>8}",
            truncate(&r.title, 40),
            r.rating.as_deref().unwrap_or("-"),
            r.created_at.get(..10).unwrap_or(&r.created_at),
            format_bytes(r.content_bytes.max(0) as u64),
        );
        println!("  id: {}\n", r.id);
    }
}

pub fn print_conversations(conversations: &[Conversation]) {
    if conversations.is_empty() {
        println!("No conversations yet.");
        return;
    }
    for c in conversations {
        println!(
            "  {:<36} {:<30} {}",
            c.id,
            truncate(&c.title, 30),
            c.updated_at.get(..19).unwrap_or(&c.updated_at)
        );
    }
}

pub fn print_message(m: &Message) {
    let who = match m.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    println!("[{}] {who}:", m.created_at.get(11..19).unwrap_or(&m.created_at));
    for line in m.content.lines() {
        println!("  {line}");
    }
}

pub fn print_messages(messages: &[Message]) {
    if messages.is_empty() {
        println!("No messages.");
        return;
    }
    for m in messages {
        print_message(m);
        println!();
    }
}

pub fn print_categories(categories: &[CategoryRecord]) {
    if categories.is_empty() {
        println!("No categories.");
        return;
    }
    for c in categories {
        println!("  {:<24} {}", truncate(&c.name, 24), truncate(&c.description, 50));
        println!("  id: {}", c.id);
    }
}

pub fn print_tests(tests: &[TestRecord]) {
    if tests.is_empty() {
        println!("No tests.");
        return;
    }
    for t in tests {
        println!(
            "  {:<32} {:<20} {}",
            truncate(&t.title, 32),
            t.category_name.as_deref().unwrap_or("-"),
            t.created_at.get(..10).unwrap_or(&t.created_at)
        );
        println!("  id: {}", t.id);
    }
}

/// Print database stats.
pub fn print_stats(stats: &DbStats) {
    println!("Database Statistics:");
    println!("  Conversations: {}", stats.conversations);
    println!("  Messages:      {}", stats.messages);
    println!("  Scenarios:     {}", stats.scenarios);
    println!("  Categories:    {}", stats.categories);
    println!("  Tests:         {}", stats.tests);
    println!("  Admins:        {}", stats.admins);
    println!("  DB Size:       {}", format_bytes(stats.db_size_bytes));
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        // Wide characters take two columns each.
        assert_eq!(truncate("日本語テキスト", 9), "日本語...");
    }

    #[test]
    fn bars_scale_to_max() {
        assert_eq!(bar(0.0, 0.0), "");
        assert_eq!(bar(10.0, 10.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5.0, 10.0).chars().count(), BAR_WIDTH / 2);
    }

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
    }
}
