//! Derived views over an [`AnalysisReport`]: the parents guide, chart data,
//! scene filtering, timeline statistics, recommendations and version history.
//!
//! Nothing here is authoritative. Everything is recomputed from the report
//! the service returned, and local edits live only as long as the session.

pub mod filter;
pub mod recommendations;
pub mod session;
pub mod timeline;
pub mod versions;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::{AnalysisReport, Category, Severity};

/// Denominator used when a report carries no scenes.
pub const FALLBACK_SCENE_TOTAL: f64 = 100.0;

/// Length of the scene excerpt shown as an episode description.
const DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ReviewError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("No episode {index} in {category} ({len} episodes)")]
    EpisodeOutOfRange {
        category: Category,
        index: usize,
        len: usize,
    },

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Recommendation not found: {0}")]
    RecommendationNotFound(String),

    #[error("Recommendation {id} has no suggestion {index}")]
    SuggestionOutOfRange { id: String, index: usize },

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Version {0} is already the current version")]
    AlreadyCurrent(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub scene_id: String,
    pub scene: String,
    pub description: String,
    pub timestamp: String,
    #[serde(default)]
    pub is_false_positive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub category: Category,
    pub severity: Severity,
    pub count: u64,
    pub percentage: f64,
    pub episodes: Vec<Episode>,
}

impl Violation {
    /// Every episode was overridden as a false positive.
    pub fn fully_dismissed(&self) -> bool {
        !self.episodes.is_empty() && self.episodes.iter().all(|e| e.is_false_positive)
    }

    pub fn confirmed_episodes(&self) -> usize {
        self.episodes.iter().filter(|e| !e.is_false_positive).count()
    }
}

/// Fixed banding from share of scenes to severity.
///
/// 0 is None, below 10 is Mild, below 25 is Moderate, the rest Severe.
pub fn severity_for(percentage: f64) -> Severity {
    if percentage <= 0.0 {
        Severity::None
    } else if percentage < 10.0 {
        Severity::Mild
    } else if percentage < 25.0 {
        Severity::Moderate
    } else {
        Severity::Severe
    }
}

/// Build the per-category parents-guide entries, in fixed category order.
pub fn build_violations(report: &AnalysisReport) -> Vec<Violation> {
    let scenes = report.scenes();
    let denominator = if scenes.is_empty() {
        FALLBACK_SCENE_TOTAL
    } else {
        scenes.len() as f64
    };

    Category::ALL
        .into_iter()
        .map(|category| {
            let episodes: Vec<Episode> = scenes
                .iter()
                .filter(|s| s.has_category(category))
                .map(|s| Episode {
                    scene_id: s.id.clone(),
                    scene: s.title.clone(),
                    description: excerpt(&s.text, DESCRIPTION_CHARS),
                    timestamp: s.timestamp.clone(),
                    is_false_positive: false,
                })
                .collect();

            let count = if scenes.is_empty() {
                report.statistics.violations.get(category)
            } else {
                episodes.len() as u64
            };
            let percentage = count as f64 / denominator * 100.0;

            Violation {
                category,
                severity: severity_for(percentage),
                count,
                percentage,
                episodes,
            }
        })
        .collect()
}

/// Flip the false-positive override of one episode. Returns the new value.
pub fn toggle_false_positive(
    violations: &mut [Violation],
    category: Category,
    index: usize,
) -> Result<bool, ReviewError> {
    let violation = violations
        .iter_mut()
        .find(|v| v.category == category)
        .ok_or_else(|| ReviewError::UnknownCategory(category.key().to_string()))?;

    let len = violation.episodes.len();
    let episode = violation
        .episodes
        .get_mut(index)
        .ok_or(ReviewError::EpisodeOutOfRange {
            category,
            index,
            len,
        })?;
    episode.is_false_positive = !episode.is_false_positive;
    Ok(episode.is_false_positive)
}

/// One bar/slice of the violation charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDatum {
    pub category: Category,
    pub label: &'static str,
    pub count: u64,
    /// Share of all counted violations, 0..=100.
    pub percentage: f64,
}

/// Chart series from the report statistics.
pub fn chart_data(report: &AnalysisReport) -> Vec<ChartDatum> {
    let counts = &report.statistics.violations;
    let total = counts.total();
    counts
        .iter()
        .map(|(category, count)| ChartDatum {
            category,
            label: category.label(),
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Scene, Statistics, ViolationCounts};
    use pretty_assertions::assert_eq;

    fn scene(id: &str, labels: &[&str]) -> Scene {
        Scene {
            id: id.to_string(),
            title: format!("Scene {id}"),
            timestamp: "00:01:00".to_string(),
            violations: labels.iter().map(|s| s.to_string()).collect(),
            text: format!("Text of {id}"),
            ..Default::default()
        }
    }

    #[test]
    fn banding_is_exact_at_boundaries() {
        assert_eq!(severity_for(0.0), Severity::None);
        assert_eq!(severity_for(0.1), Severity::Mild);
        assert_eq!(severity_for(9.99), Severity::Mild);
        assert_eq!(severity_for(10.0), Severity::Moderate);
        assert_eq!(severity_for(24.99), Severity::Moderate);
        assert_eq!(severity_for(25.0), Severity::Severe);
        assert_eq!(severity_for(100.0), Severity::Severe);
    }

    #[test]
    fn violations_follow_scene_shares() {
        let mut scenes: Vec<Scene> = (0..10).map(|i| scene(&i.to_string(), &[])).collect();
        scenes[0].violations = vec!["violence".into(), "profanity".into()];
        scenes[1].violations = vec!["violence".into()];
        scenes[2].violations = vec!["violence".into()];
        let report = AnalysisReport {
            scenes: Some(scenes),
            ..Default::default()
        };

        let v = build_violations(&report);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0].category, Category::Violence);
        assert_eq!(v[0].count, 3);
        assert_eq!(v[0].percentage, 30.0);
        assert_eq!(v[0].severity, Severity::Severe);
        assert_eq!(v[1].count, 1);
        assert_eq!(v[1].severity, Severity::Moderate);
        assert_eq!(v[2].severity, Severity::None);
        assert_eq!(v[0].episodes[1].scene_id, "1");
    }

    #[test]
    fn zero_scenes_falls_back_to_statistics_over_one_hundred() {
        let report = AnalysisReport {
            statistics: Statistics {
                violations: ViolationCounts {
                    violence: 25,
                    profanity: 9,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };

        let v = build_violations(&report);
        assert_eq!(v[0].percentage, 25.0);
        assert_eq!(v[0].severity, Severity::Severe);
        assert_eq!(v[1].percentage, 9.0);
        assert_eq!(v[1].severity, Severity::Mild);
        assert!(v[3].percentage.is_finite());
        assert_eq!(v[3].severity, Severity::None);
        assert!(v.iter().all(|x| x.episodes.is_empty()));
    }

    #[test]
    fn toggling_twice_restores_flag() {
        let report = AnalysisReport {
            scenes: Some(vec![scene("a", &["fear_elements"])]),
            ..Default::default()
        };
        let mut v = build_violations(&report);
        let original = v.clone();

        assert!(toggle_false_positive(&mut v, Category::FearElements, 0).unwrap());
        assert!(v[4].fully_dismissed());
        assert!(!toggle_false_positive(&mut v, Category::FearElements, 0).unwrap());
        assert_eq!(v, original);
    }

    #[test]
    fn toggling_missing_episode_is_an_error() {
        let mut v = build_violations(&AnalysisReport::default());
        assert_eq!(
            toggle_false_positive(&mut v, Category::Violence, 2),
            Err(ReviewError::EpisodeOutOfRange {
                category: Category::Violence,
                index: 2,
                len: 0
            })
        );
    }

    #[test]
    fn chart_shares_sum_to_hundred() {
        let report = AnalysisReport {
            statistics: Statistics {
                violations: ViolationCounts {
                    violence: 1,
                    profanity: 3,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let data = chart_data(&report);
        assert_eq!(data[1].percentage, 75.0);
        let sum: f64 = data.iter().map(|d| d.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        let empty = chart_data(&AnalysisReport::default());
        assert!(empty.iter().all(|d| d.percentage == 0.0));
    }

    #[test]
    fn excerpt_cuts_on_chars() {
        assert_eq!(excerpt("  short  ", 10), "short");
        assert_eq!(excerpt("привет мир", 6), "привет...");
    }
}
