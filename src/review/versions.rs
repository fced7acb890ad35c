use serde::Serialize;

use super::ReviewError;
use crate::report::rating::{self, Rating, Trend};
use crate::report::Scene;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Version {
    pub id: String,
    pub timestamp: String,
    pub content: String,
    pub rating: Rating,
    pub changes: String,
    /// Scene list as it stood when this version was recorded.
    #[serde(skip_serializing)]
    pub scenes: Vec<Scene>,
}

/// Session-local edit history of one scenario, newest first.
///
/// Index 0 is the current version. Restoring copies an older entry's text,
/// rating and scenes into the current state; the list itself is never rewritten.
#[derive(Debug, Clone, Default)]
pub struct VersionHistory {
    versions: Vec<Version>,
    next: u32,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new current version.
    pub fn record(&mut self, content: &str, rating: &Rating, scenes: &[Scene], changes: &str) -> &Version {
        self.next += 1;
        let version = Version {
            id: format!("v{}", self.next),
            timestamp: chrono::Utc::now().to_rfc3339(),
            content: content.to_string(),
            rating: rating.clone(),
            changes: changes.to_string(),
            scenes: scenes.to_vec(),
        };
        self.versions.insert(0, version);
        &self.versions[0]
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Display label: "current" for index 0, otherwise "version N" counting from the oldest.
    pub fn label(&self, index: usize) -> String {
        if index == 0 {
            "current".to_string()
        } else {
            format!("version {}", self.versions.len() - index)
        }
    }

    /// Look up an older version to restore from.
    pub fn restore_target(&self, id: &str) -> Result<&Version, ReviewError> {
        let index = self
            .versions
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| ReviewError::VersionNotFound(id.to_string()))?;
        if index == 0 {
            return Err(ReviewError::AlreadyCurrent(id.to_string()));
        }
        Ok(&self.versions[index])
    }
}

/// Rating movement between two consecutive entries of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingChange {
    pub from: String,
    pub to: String,
    pub from_rating: Rating,
    pub to_rating: Rating,
    /// Difference in years; None when a rating is not one of the fixed brackets.
    pub diff: Option<i16>,
    pub trend: Option<Trend>,
}

/// Compare each labelled rating with the one before it, oldest first.
pub fn rating_changes(entries: &[(String, Rating)]) -> Vec<RatingChange> {
    entries
        .windows(2)
        .map(|pair| {
            let (from, from_rating) = &pair[0];
            let (to, to_rating) = &pair[1];
            let cmp = rating::compare(from_rating, to_rating);
            RatingChange {
                from: from.clone(),
                to: to.clone(),
                from_rating: from_rating.clone(),
                to_rating: to_rating.clone(),
                diff: cmp.map(|(d, _)| d),
                trend: cmp.map(|(_, t)| t),
            }
        })
        .collect()
}
