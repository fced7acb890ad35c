use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::report::{Category, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Clear,
    Low,
    Elevated,
    High,
    Peak,
}

impl Intensity {
    /// Bucket a 0..=100 intensity value.
    pub fn from_percent(p: f64) -> Self {
        if p <= 0.0 {
            Intensity::Clear
        } else if p < 25.0 {
            Intensity::Low
        } else if p < 50.0 {
            Intensity::Elevated
        } else if p < 75.0 {
            Intensity::High
        } else {
            Intensity::Peak
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Intensity::Clear => '.',
            Intensity::Low => '░',
            Intensity::Elevated => '▒',
            Intensity::High => '▓',
            Intensity::Peak => '█',
        }
    }
}

/// One scene on the violation timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub scene_id: String,
    pub timestamp: String,
    /// Seconds from the start, when the timestamp parses.
    pub time: Option<u64>,
    pub counts: [u64; 5],
    pub total: u64,
    pub intensity: f64,
    pub bucket: Intensity,
}

impl TimelinePoint {
    pub fn count(&self, category: Category) -> u64 {
        Category::ALL
            .iter()
            .position(|c| *c == category)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineStats {
    pub points: Vec<TimelinePoint>,
    pub total_duration: String,
    pub total_seconds: u64,
}

fn clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:(\d+):)?(\d{1,2}):(\d{2})\s*$|^\s*(\d+)\s*s?\s*$")
            .expect("static regex")
    })
}

/// Parse `HH:MM:SS`, `MM:SS` or a bare number of seconds.
pub fn parse_clock(s: &str) -> Option<u64> {
    let caps = clock_re().captures(s)?;
    if let Some(secs) = caps.get(4) {
        return secs.as_str().parse().ok();
    }
    let h: u64 = caps.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let m: u64 = caps.get(2)?.as_str().parse().ok()?;
    let s: u64 = caps.get(3)?.as_str().parse().ok()?;
    h.checked_mul(3600)?.checked_add(m * 60)?.checked_add(s)
}

pub fn format_clock(total: u64) -> String {
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Per-scene category counts with intensity relative to the busiest scene.
pub fn build_timeline(scenes: &[Scene]) -> TimelineStats {
    let mut points: Vec<TimelinePoint> = scenes
        .iter()
        .map(|scene| {
            let mut counts = [0u64; 5];
            for (i, category) in Category::ALL.iter().enumerate() {
                counts[i] = scene
                    .violations
                    .iter()
                    .filter(|v| v.as_str() == category.key())
                    .count() as u64;
            }
            TimelinePoint {
                scene_id: scene.id.clone(),
                timestamp: scene.timestamp.clone(),
                time: parse_clock(&scene.timestamp),
                total: counts.iter().sum(),
                counts,
                intensity: 0.0,
                bucket: Intensity::Clear,
            }
        })
        .collect();

    let max_total = points.iter().map(|p| p.total).max().unwrap_or(0).max(1);
    for p in &mut points {
        p.intensity = p.total as f64 / max_total as f64 * 100.0;
        p.bucket = Intensity::from_percent(p.intensity);
    }

    let total_seconds = scenes
        .iter()
        .filter_map(|s| parse_clock(&s.duration))
        .fold(0u64, u64::saturating_add);

    TimelineStats {
        points,
        total_duration: format_clock(total_seconds),
        total_seconds,
    }
}
