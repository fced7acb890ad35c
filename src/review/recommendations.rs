use serde::Serialize;

use super::{excerpt, ReviewError};
use crate::report::{AnalysisReport, Category, Rating, Scene, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    fn from_severity(s: Severity) -> Self {
        match s {
            Severity::Severe => Priority::High,
            Severity::Moderate => Priority::Medium,
            Severity::Mild | Severity::None => Priority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub rating_impact: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: String,
    pub scene_id: String,
    pub scene: String,
    pub timestamp: String,
    pub category: Category,
    pub priority: Priority,
    pub current_text: String,
    pub issue: String,
    pub suggestions: Vec<Suggestion>,
    pub applied: bool,
}

/// Canned rewrites per category: (replacement, explanation).
fn templates(category: Category) -> [(&'static str, &'static str); 2] {
    match category {
        Category::Violence => [
            (
                "The fight happens off screen; we only hear it.",
                "Moving the action off screen removes explicit depiction.",
            ),
            (
                "They shove each other and are pulled apart.",
                "Physical conflict without injury reads as mild.",
            ),
        ],
        Category::Profanity => [
            (
                "He swears under his breath.",
                "Implied language instead of quoted profanity.",
            ),
            (
                "\"Get out of here!\"",
                "Same intent with neutral wording.",
            ),
        ],
        Category::SexualContent => [
            (
                "They kiss; the scene cuts away.",
                "Cutting away keeps intimacy implied.",
            ),
            (
                "The next morning, they share breakfast.",
                "Time skip replaces the explicit scene.",
            ),
        ],
        Category::DrugsAlcohol => [
            (
                "A glass sits untouched on the table.",
                "Presence without consumption lowers the weight.",
            ),
            (
                "He declines the offered drink.",
                "Refusal frames the substance negatively.",
            ),
        ],
        Category::FearElements => [
            (
                "A noise in the dark turns out to be the cat.",
                "Tension released quickly suits younger viewers.",
            ),
            (
                "The shadow passes; the lights come back on.",
                "Shorter threat with a reassuring resolution.",
            ),
        ],
    }
}

/// Mock suggestions for scenes that keep the report above `target`.
///
/// Empty when the overall rating already meets the target.
pub fn generate(report: &AnalysisReport, target: &Rating) -> Vec<Recommendation> {
    if !report.overall_rating.exceeds(target) {
        return Vec::new();
    }

    let impact = format!("{} → {}", report.overall_rating, target);
    let mut out = Vec::new();
    for scene in report.scenes() {
        for category in Category::ALL {
            if !scene.has_category(category) {
                continue;
            }
            out.push(recommendation_for(scene, category, &impact));
        }
    }
    out
}

fn recommendation_for(scene: &Scene, category: Category, impact: &str) -> Recommendation {
    Recommendation {
        id: format!("{}-{}", scene.id, category.key()),
        scene_id: scene.id.clone(),
        scene: scene.title.clone(),
        timestamp: scene.timestamp.clone(),
        category,
        priority: Priority::from_severity(scene.severity),
        current_text: excerpt(&scene.text, 160),
        issue: format!("{} raises the age rating", category.label()),
        suggestions: templates(category)
            .into_iter()
            .map(|(text, explanation)| Suggestion {
                text: text.to_string(),
                rating_impact: impact.to_string(),
                explanation: explanation.to_string(),
            })
            .collect(),
        applied: false,
    }
}

/// Look up a suggestion and return (scene id, replacement text) without marking it.
pub fn resolve(
    recs: &[Recommendation],
    id: &str,
    suggestion: usize,
) -> Result<(String, String), ReviewError> {
    let rec = recs
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| ReviewError::RecommendationNotFound(id.to_string()))?;
    let text = rec
        .suggestions
        .get(suggestion)
        .map(|s| s.text.clone())
        .ok_or_else(|| ReviewError::SuggestionOutOfRange {
            id: id.to_string(),
            index: suggestion,
        })?;
    Ok((rec.scene_id.clone(), text))
}

pub fn mark_applied(recs: &mut [Recommendation], id: &str) {
    if let Some(rec) = recs.iter_mut().find(|r| r.id == id) {
        rec.applied = true;
    }
}

/// Mark a suggestion applied and return (scene id, replacement text).
pub fn apply(
    recs: &mut [Recommendation],
    id: &str,
    suggestion: usize,
) -> Result<(String, String), ReviewError> {
    let resolved = resolve(recs, id, suggestion)?;
    mark_applied(recs, id);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(rating: Rating) -> AnalysisReport {
        AnalysisReport {
            overall_rating: rating,
            scenes: Some(vec![
                Scene {
                    id: "s1".into(),
                    title: "Bar".into(),
                    severity: Severity::Severe,
                    violations: vec!["violence".into(), "drugs_alcohol".into()],
                    text: "He breaks a bottle over the table.".into(),
                    ..Default::default()
                },
                Scene {
                    id: "s2".into(),
                    title: "Park".into(),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn nothing_to_do_at_or_below_target() {
        assert!(generate(&report(Rating::Twelve), &Rating::Twelve).is_empty());
        assert!(generate(&report(Rating::Six), &Rating::Twelve).is_empty());
    }

    #[test]
    fn one_recommendation_per_flagged_category() {
        let recs = generate(&report(Rating::Eighteen), &Rating::Twelve);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "s1-violence");
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[1].category, Category::DrugsAlcohol);
        assert_eq!(recs[0].suggestions[0].rating_impact, "18+ → 12+");
    }

    #[test]
    fn apply_marks_only_the_chosen_recommendation() {
        let mut recs = generate(&report(Rating::Sixteen), &Rating::Six);
        let (scene, text) = apply(&mut recs, "s1-violence", 1).unwrap();
        assert_eq!(scene, "s1");
        assert_eq!(text, "They shove each other and are pulled apart.");
        assert!(recs[0].applied);
        assert!(!recs[1].applied);

        assert!(matches!(
            apply(&mut recs, "s1-violence", 5),
            Err(ReviewError::SuggestionOutOfRange { .. })
        ));
        assert!(matches!(
            apply(&mut recs, "nope", 0),
            Err(ReviewError::RecommendationNotFound(_))
        ));
    }
}
