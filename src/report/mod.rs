pub mod category;
pub mod rating;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use category::Category;
pub use rating::Rating;

/// Analysis result as returned by the analysis service.
///
/// Every field is optional on the wire; absent or null fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    #[serde(deserialize_with = "null_default")]
    pub file_id: String,
    #[serde(deserialize_with = "null_default")]
    pub filename: String,
    #[serde(deserialize_with = "null_default")]
    pub overall_rating: Rating,
    #[serde(deserialize_with = "null_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_default")]
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<Scene>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_violations: Option<Vec<DetailedViolation>>,
}

impl AnalysisReport {
    pub fn scenes(&self) -> &[Scene] {
        self.scenes.as_deref().unwrap_or(&[])
    }

    pub fn detailed_violations(&self) -> &[DetailedViolation] {
        self.detailed_violations.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    #[serde(deserialize_with = "null_default")]
    pub total_sentences: u64,
    #[serde(deserialize_with = "null_default")]
    pub problematic_sentences: u64,
    #[serde(deserialize_with = "null_default")]
    pub problematic_percentage: f64,
    #[serde(deserialize_with = "null_default")]
    pub violations: ViolationCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolationCounts {
    #[serde(deserialize_with = "null_default")]
    pub violence: u64,
    #[serde(deserialize_with = "null_default")]
    pub profanity: u64,
    #[serde(deserialize_with = "null_default")]
    pub sexual_content: u64,
    #[serde(deserialize_with = "null_default")]
    pub drugs_alcohol: u64,
    #[serde(deserialize_with = "null_default")]
    pub fear_elements: u64,
}

impl ViolationCounts {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Violence => self.violence,
            Category::Profanity => self.profanity,
            Category::SexualContent => self.sexual_content,
            Category::DrugsAlcohol => self.drugs_alcohol,
            Category::FearElements => self.fear_elements,
        }
    }

    /// Counts in the fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, n)| n).sum()
    }
}

/// Scene severity. Labels are matched without regard to case; `low`,
/// `medium` and `high` are accepted as aliases and anything else reads as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" | "low" => Severity::Mild,
            "moderate" | "medium" => Severity::Moderate,
            "severe" | "high" => Severity::Severe,
            _ => Severity::None,
        }
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_default")]
    pub duration: String,
    /// Raw category keys; unknown keys are kept as-is.
    #[serde(deserialize_with = "null_default")]
    pub violations: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub severity: Severity,
    #[serde(deserialize_with = "null_default")]
    pub text: String,
}

impl Scene {
    pub fn has_category(&self, category: Category) -> bool {
        self.violations.iter().any(|v| v == category.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedViolation {
    #[serde(deserialize_with = "null_default")]
    pub category: String,
    #[serde(deserialize_with = "null_default")]
    pub severity: String,
    #[serde(deserialize_with = "null_default")]
    pub text: String,
}

/// Reads `null` the same way as an absent field.
fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_missing_fields() {
        let report: AnalysisReport =
            serde_json::from_str(r#"{"overall_rating":"12+","statistics":{"violations":{"violence":3}}}"#)
                .unwrap();
        assert_eq!(report.overall_rating, Rating::Twelve);
        assert_eq!(report.statistics.violations.violence, 3);
        assert_eq!(report.statistics.violations.total(), 3);
        assert!(report.scenes().is_empty());
        assert!(report.summary.is_empty());
    }

    #[test]
    fn scene_keeps_unknown_labels() {
        let scene: Scene = serde_json::from_str(
            r#"{"id":"s1","violations":["violence","gambling"],"severity":"Moderate"}"#,
        )
        .unwrap();
        assert!(scene.has_category(Category::Violence));
        assert!(!scene.has_category(Category::Profanity));
        assert_eq!(scene.violations.len(), 2);
        assert_eq!(scene.severity, Severity::Moderate);
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let report: AnalysisReport = serde_json::from_str(
            r#"{"status":"done","file_id":null,"filename":"a.txt","overall_rating":null,
                "summary":null,"statistics":{"total_sentences":null,"problematic_percentage":null,
                "violations":{"violence":null,"profanity":2}},
                "scenes":[{"id":"s1","title":null,"violations":null,"severity":null,"text":null}],
                "detailed_violations":null}"#,
        )
        .unwrap();
        assert_eq!(report.file_id, "");
        assert_eq!(report.filename, "a.txt");
        assert_eq!(report.overall_rating, Rating::default());
        assert_eq!(report.statistics.total_sentences, 0);
        assert_eq!(report.statistics.violations.total(), 2);
        assert_eq!(report.scenes()[0].severity, Severity::None);
        assert!(report.scenes()[0].violations.is_empty());
        assert!(report.detailed_violations().is_empty());
    }

    #[test]
    fn severity_labels_are_lenient() {
        let parse = |label: &str| -> Severity {
            let scene: Scene = serde_json::from_str(&format!(r#"{{"severity":"{label}"}}"#)).unwrap();
            scene.severity
        };
        assert_eq!(parse("high"), Severity::Severe);
        assert_eq!(parse("moderate"), Severity::Moderate);
        assert_eq!(parse("Low"), Severity::Mild);
        assert_eq!(parse("catastrophic"), Severity::None);
        assert_eq!(serde_json::to_string(&Severity::Severe).unwrap(), r#""Severe""#);
    }
}
