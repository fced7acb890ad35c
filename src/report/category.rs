use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of violation categories reported by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Violence,
    Profanity,
    SexualContent,
    DrugsAlcohol,
    FearElements,
}

impl Category {
    /// Fixed display order, matching the order of the statistics object.
    pub const ALL: [Category; 5] = [
        Category::Violence,
        Category::Profanity,
        Category::SexualContent,
        Category::DrugsAlcohol,
        Category::FearElements,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Violence => "violence",
            Category::Profanity => "profanity",
            Category::SexualContent => "sexual_content",
            Category::DrugsAlcohol => "drugs_alcohol",
            Category::FearElements => "fear_elements",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Violence => "Violence",
            Category::Profanity => "Profanity",
            Category::SexualContent => "Sexual content",
            Category::DrugsAlcohol => "Drugs/Alcohol",
            Category::FearElements => "Fear elements",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.key() == s.trim())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

/// Display label for a raw category key, falling back to the key itself.
pub fn label_for(key: &str) -> &str {
    Category::from_key(key).map(|c| c.label()).unwrap_or(key)
}
