use std::collections::HashSet;

use tracing::{info, warn};

use super::filter::SceneFilter;
use super::recommendations::{self, Recommendation};
use super::timeline::{build_timeline, TimelineStats};
use super::versions::{Version, VersionHistory};
use super::{build_violations, severity_for, ChartDatum, ReviewError, Violation};
use crate::api::{AnalysisService, ApiError};
use crate::db::models::Scenario;
use crate::report::{AnalysisReport, Category, Rating, Scene};

/// More violation labels than this on one scene triggers a warning.
pub const SCENE_VIOLATION_THRESHOLD: usize = 5;

/// Everything the review screen holds for one scenario.
///
/// Edits made here (false positives, scene text, applied recommendations,
/// restored versions) never go back to the store; they only reach exports.
pub struct ReviewSession {
    pub scenario_id: String,
    pub title: String,
    pub content: String,
    pub report: AnalysisReport,
    pub violations: Vec<Violation>,
    pub recommendations: Vec<Recommendation>,
    pub history: VersionHistory,
    pub filter: SceneFilter,
    pub target: Rating,
}

impl ReviewSession {
    pub fn new(
        scenario_id: &str,
        title: &str,
        content: &str,
        report: AnalysisReport,
        target: Rating,
    ) -> Self {
        let violations = build_violations(&report);
        let recommendations = recommendations::generate(&report, &target);
        let mut history = VersionHistory::new();
        history.record(content, &report.overall_rating, report.scenes(), "Uploaded");
        Self {
            scenario_id: scenario_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            report,
            violations,
            recommendations,
            history,
            filter: SceneFilter::default(),
            target,
        }
    }

    /// Start a session from a stored scenario and its saved analysis.
    pub fn from_scenario(scenario: &Scenario, target: Rating) -> anyhow::Result<Self> {
        use anyhow::Context;

        let data = scenario
            .analysis_data
            .clone()
            .filter(|d| d.get("statistics").is_some())
            .with_context(|| format!("Scenario {} has no analysis report", scenario.id))?;
        let report: AnalysisReport =
            serde_json::from_value(data).context("Failed to parse stored analysis report")?;
        Ok(Self::new(
            &scenario.id,
            &scenario.title,
            &scenario.content,
            report,
            target,
        ))
    }

    pub fn rating(&self) -> &Rating {
        &self.report.overall_rating
    }

    pub fn scene(&self, id: &str) -> Result<&Scene, ReviewError> {
        self.report
            .scenes()
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ReviewError::SceneNotFound(id.to_string()))
    }

    pub fn filtered_scenes(&self) -> Vec<&Scene> {
        self.filter.apply(self.report.scenes())
    }

    pub fn timeline(&self) -> TimelineStats {
        build_timeline(self.report.scenes())
    }

    pub fn chart_data(&self) -> Vec<ChartDatum> {
        super::chart_data(&self.report)
    }

    pub fn toggle_false_positive(&mut self, category: Category, index: usize) -> Result<bool, ReviewError> {
        super::toggle_false_positive(&mut self.violations, category, index)
    }

    /// Violation count on a scene when it exceeds the warning threshold.
    pub fn violation_warning(&self, scene_id: &str) -> Result<Option<usize>, ReviewError> {
        let n = self.scene(scene_id)?.violations.len();
        Ok((n > SCENE_VIOLATION_THRESHOLD).then_some(n))
    }

    /// Replace a scene's text and record the result as a new version.
    pub fn edit_scene(&mut self, scene_id: &str, text: &str) -> Result<&Version, ReviewError> {
        let title = self.replace_scene_text(scene_id, text)?;
        Ok(self.record_version(&format!("Edited scene {title}")))
    }

    /// Send the scene's current text back through the analysis service and
    /// take over the labels it reports.
    pub fn reanalyze_scene(
        &mut self,
        service: &dyn AnalysisService,
        scene_id: &str,
    ) -> Result<Vec<String>, ReanalyzeError> {
        let text = self.scene(scene_id)?.text.clone();
        let result = service.analyze_text(&text)?;

        let labels: Vec<String> = result
            .statistics
            .violations
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(c, _)| c.key().to_string())
            .collect();
        let severity = severity_for(result.statistics.problematic_percentage);

        if let Some(scene) = self
            .report
            .scenes
            .as_mut()
            .and_then(|v| v.iter_mut().find(|s| s.id == scene_id))
        {
            scene.violations = labels.clone();
            scene.severity = severity;
        }
        self.rebuild_violations();
        info!("re-analyzed scene {scene_id}: {labels:?}");
        Ok(labels)
    }

    /// Apply one suggestion of a recommendation to its scene.
    pub fn apply_recommendation(&mut self, id: &str, suggestion: usize) -> Result<&Version, ReviewError> {
        let (scene_id, replacement) = recommendations::resolve(&self.recommendations, id, suggestion)?;
        let title = self.replace_scene_text(&scene_id, &replacement)?;
        recommendations::mark_applied(&mut self.recommendations, id);
        Ok(self.record_version(&format!("Applied recommendation {id} to {title}")))
    }

    /// Make an older version's text, rating and scenes current. History is untouched.
    pub fn restore(&mut self, version_id: &str) -> Result<(), ReviewError> {
        let version = self.history.restore_target(version_id)?;
        self.content = version.content.clone();
        self.report.overall_rating = version.rating.clone();
        if self.report.scenes.is_some() {
            self.report.scenes = Some(version.scenes.clone());
        }
        self.rebuild_violations();
        info!("restored {version_id} of scenario {}", self.scenario_id);
        Ok(())
    }

    fn record_version(&mut self, changes: &str) -> &Version {
        self.history.record(
            &self.content,
            &self.report.overall_rating,
            self.report.scenes(),
            changes,
        )
    }

    fn replace_scene_text(&mut self, scene_id: &str, text: &str) -> Result<String, ReviewError> {
        let scene = self
            .report
            .scenes
            .as_mut()
            .and_then(|v| v.iter_mut().find(|s| s.id == scene_id))
            .ok_or_else(|| ReviewError::SceneNotFound(scene_id.to_string()))?;

        let old = std::mem::replace(&mut scene.text, text.to_string());
        if !old.is_empty() && self.content.contains(&old) {
            self.content = self.content.replacen(&old, text, 1);
        } else {
            warn!("scene {scene_id} text not found in scenario content; content left as is");
        }
        let title = scene.title.clone();
        self.rebuild_violations();
        Ok(title)
    }

    /// Recompute derived violations, keeping false-positive flags of episodes
    /// that survive.
    fn rebuild_violations(&mut self) {
        let dismissed: HashSet<(Category, String)> = self
            .violations
            .iter()
            .flat_map(|v| {
                v.episodes
                    .iter()
                    .filter(|e| e.is_false_positive)
                    .map(move |e| (v.category, e.scene_id.clone()))
            })
            .collect();

        self.violations = build_violations(&self.report);
        for v in &mut self.violations {
            for e in &mut v.episodes {
                e.is_false_positive = dismissed.contains(&(v.category, e.scene_id.clone()));
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReanalyzeError {
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
