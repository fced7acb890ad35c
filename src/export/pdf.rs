use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::report::category::label_for;
use crate::report::AnalysisReport;
use crate::review::timeline::{build_timeline, Intensity};

// A4 portrait, in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;

/// The detailed list stops after this many entries.
pub const MAX_DETAILED_VIOLATIONS: usize = 20;

/// Optional pages of the PDF report.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfOptions {
    pub charts: bool,
    pub timeline: bool,
}

/// `scenario-report-<rating>-<unix millis>.pdf`
pub fn file_name(rating: &str, unix_millis: i64) -> String {
    format!("scenario-report-{}-{}.pdf", super::sanitize(rating), unix_millis)
}

pub fn write(out_dir: &Path, report: &AnalysisReport, opts: PdfOptions) -> Result<PathBuf> {
    let bytes = render(report, opts)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;
    let path = out_dir.join(file_name(
        report.overall_rating.label(),
        chrono::Utc::now().timestamp_millis(),
    ));
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write: {}", path.display()))?;
    info!("wrote PDF report {}", path.display());
    Ok(path)
}

/// Lay out the fixed report template and serialize it.
pub fn render(report: &AnalysisReport, opts: PdfOptions) -> Result<Vec<u8>> {
    let mut w = PageWriter::new();
    let stats = &report.statistics;

    w.centered(20.0, "Scenario analysis report");
    w.gap(15.0);
    w.line(MARGIN, 12.0, &format!("Age rating: {}", report.overall_rating));
    w.gap(10.0);
    w.line(MARGIN, 12.0, &format!("Total sentences: {}", stats.total_sentences));
    w.gap(10.0);
    w.line(MARGIN, 12.0, &format!("Problematic sentences: {}", stats.problematic_sentences));
    w.gap(15.0);
    if !report.summary.is_empty() {
        w.wrapped(MARGIN, 10.0, &format!("Summary: {}", report.summary));
        w.gap(10.0);
    }

    w.line(MARGIN, 14.0, "Violation statistics:");
    w.gap(10.0);
    for (category, count) in stats.violations.iter() {
        w.line(MARGIN + 14.0, 10.0, &format!("{}: {}", category.label(), count));
        w.gap(7.0);
    }

    if opts.charts {
        w.new_page();
        w.line(MARGIN, 16.0, "Violation charts");
        w.gap(14.0);
        let max = stats.violations.iter().map(|(_, n)| n).max().unwrap_or(0).max(1);
        let bar_span = PAGE_WIDTH - 2.0 * MARGIN - 130.0;
        for (i, (category, count)) in stats.violations.iter().enumerate() {
            let width = bar_span * count as f32 / max as f32;
            w.line(MARGIN, 10.0, category.label());
            w.bar(MARGIN + 120.0, width, 12.0, BAR_COLORS[i % BAR_COLORS.len()]);
            w.text_at(MARGIN + 126.0 + width, w.y, 9.0, &count.to_string());
            w.gap(22.0);
        }
    }

    if opts.timeline && !report.scenes().is_empty() {
        w.new_page();
        let timeline = build_timeline(report.scenes());
        w.line(MARGIN, 16.0, "Violation timeline");
        w.gap(8.0);
        w.line(MARGIN, 10.0, &format!("Total duration: {}", timeline.total_duration));
        w.gap(14.0);
        let bar_span = PAGE_WIDTH - 2.0 * MARGIN - 90.0;
        for point in &timeline.points {
            w.ensure_space(18.0);
            w.line(MARGIN, 9.0, &point.timestamp);
            let width = (bar_span * (point.intensity / 100.0) as f32).max(1.0);
            w.bar(MARGIN + 80.0, width, 10.0, intensity_color(point.bucket));
            w.gap(16.0);
        }
    }

    let detailed = report.detailed_violations();
    if !detailed.is_empty() {
        w.new_page();
        w.line(MARGIN, 16.0, "Detailed violations");
        w.gap(10.0);
        for (i, v) in detailed.iter().take(MAX_DETAILED_VIOLATIONS).enumerate() {
            w.ensure_space(40.0);
            w.line(MARGIN, 11.0, &format!("{}. {}", i + 1, label_for(&v.category)));
            w.gap(6.0);
            w.line(MARGIN + 14.0, 9.0, &format!("Severity: {}", v.severity));
            w.gap(5.0);
            w.wrapped(MARGIN + 14.0, 9.0, &format!("Text: {}", v.text));
            w.gap(5.0);
        }
    }

    w.finish()
}

type Rgb = (f32, f32, f32);

const BAR_COLORS: [Rgb; 5] = [
    (0.86, 0.20, 0.20),
    (0.97, 0.45, 0.09),
    (0.76, 0.40, 0.85),
    (0.91, 0.70, 0.03),
    (0.18, 0.82, 0.75),
];

fn intensity_color(bucket: Intensity) -> Rgb {
    match bucket {
        Intensity::Clear => (0.60, 0.85, 0.60),
        Intensity::Low => (0.98, 0.85, 0.45),
        Intensity::Elevated => (0.97, 0.65, 0.20),
        Intensity::High => (0.90, 0.40, 0.35),
        Intensity::Peak => (0.80, 0.10, 0.10),
    }
}

/// Encode for the WinAnsi base font; characters outside Latin-1 become '?'.
fn pdf_text(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if (c as u32) < 0x100 { c as u32 as u8 } else { b'?' })
        .collect()
}

/// Rough Helvetica advance: half the font size per character.
fn text_width(s: &str, size: f32) -> f32 {
    s.chars().count() as f32 * size * 0.5
}

/// Greedy word wrap to a width in points.
fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * 0.5)) as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate_len = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if candidate_len > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cursor-based page layout; `y` counts down from the top like the PDF origin.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, dy: f32) {
        self.y -= dy;
        if self.y < MARGIN {
            self.new_page();
        }
    }

    fn text_at(&mut self, x: f32, y: f32, size: f32, text: &str) {
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(pdf_text(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    fn line(&mut self, x: f32, size: f32, text: &str) {
        let y = self.y;
        self.text_at(x, y, size, text);
    }

    fn centered(&mut self, size: f32, text: &str) {
        let x = ((PAGE_WIDTH - text_width(text, size)) / 2.0).max(MARGIN);
        self.line(x, size, text);
    }

    fn wrapped(&mut self, x: f32, size: f32, text: &str) {
        let width = PAGE_WIDTH - x - MARGIN;
        for (i, l) in wrap(text, size, width).iter().enumerate() {
            if i > 0 {
                self.gap(size + 2.0);
            }
            self.line(x, size, l);
        }
    }

    fn bar(&mut self, x: f32, width: f32, height: f32, (r, g, b): Rgb) {
        let y = self.y - 2.0;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in self.pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0_i64.into(), 0_i64.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .context("Failed to serialize PDF report")?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DetailedViolation, Rating, Scene, Statistics, ViolationCounts};

    fn report() -> AnalysisReport {
        AnalysisReport {
            overall_rating: Rating::Sixteen,
            summary: "A heist goes wrong.".into(),
            statistics: Statistics {
                total_sentences: 200,
                problematic_sentences: 12,
                problematic_percentage: 6.0,
                violations: ViolationCounts {
                    violence: 8,
                    profanity: 4,
                    ..Default::default()
                },
            },
            scenes: Some(vec![Scene {
                id: "1".into(),
                timestamp: "00:03:10".into(),
                violations: vec!["violence".into()],
                ..Default::default()
            }]),
            detailed_violations: Some(
                (0..30)
                    .map(|i| DetailedViolation {
                        category: "violence".into(),
                        severity: "high".into(),
                        text: format!("Line {i} with quite a lot of words in it to force the wrapper to break it up"),
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn file_name_carries_rating_and_time() {
        assert_eq!(file_name("16+", 1700000000000), "scenario-report-16+-1700000000000.pdf");
    }

    #[test]
    fn renders_a_loadable_document_with_optional_pages() {
        let plain = render(&report(), PdfOptions::default()).unwrap();
        let full = render(&report(), PdfOptions { charts: true, timeline: true }).unwrap();
        assert!(plain.starts_with(b"%PDF-1.5"));

        let plain_doc = Document::load_mem(&plain).unwrap();
        let full_doc = Document::load_mem(&full).unwrap();
        assert_eq!(full_doc.get_pages().len(), plain_doc.get_pages().len() + 2);
    }

    fn shown_strings(doc: &Document) -> Vec<String> {
        let mut out = Vec::new();
        for page_id in doc.get_pages().into_values() {
            let bytes = doc.get_page_content(page_id).unwrap();
            for op in Content::decode(&bytes).unwrap().operations {
                if op.operator != "Tj" {
                    continue;
                }
                for operand in &op.operands {
                    if let Object::String(raw, _) = operand {
                        out.push(String::from_utf8_lossy(raw).into_owned());
                    }
                }
            }
        }
        out
    }

    #[test]
    fn detailed_list_stops_at_twenty() {
        let doc = Document::load_mem(&render(&report(), PdfOptions::default()).unwrap()).unwrap();
        let shown = shown_strings(&doc);
        assert!(shown.iter().any(|s| s.starts_with("1. ")));
        assert!(shown.iter().any(|s| s.starts_with("20. ")));
        assert!(!shown.iter().any(|s| s.starts_with("21. ")));
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("one two three four five six", 10.0, 60.0);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(lines.join(" "), "one two three four five six");
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(pdf_text("é ж"), vec![0xE9, b' ', b'?']);
    }
}
