use std::collections::BTreeSet;

use crate::report::Scene;

/// Filters that can be applied to a report's scene list.
#[derive(Debug, Clone, Default)]
pub struct SceneFilter {
    /// Case-insensitive substring over title and text.
    pub query: Option<String>,
    /// Keep scenes carrying any of these raw category keys.
    pub categories: BTreeSet<String>,
}

impl SceneFilter {
    pub fn is_empty(&self) -> bool {
        self.query.as_deref().map_or(true, |q| q.trim().is_empty()) && self.categories.is_empty()
    }

    /// Select or deselect a category. Returns whether it is now selected.
    pub fn toggle_category(&mut self, key: &str) -> bool {
        if self.categories.remove(key) {
            false
        } else {
            self.categories.insert(key.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.query = None;
        self.categories.clear();
    }

    pub fn matches(&self, scene: &Scene) -> bool {
        if let Some(q) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            if !scene.title.to_lowercase().contains(&q) && !scene.text.to_lowercase().contains(&q) {
                return false;
            }
        }

        if !self.categories.is_empty()
            && !scene.violations.iter().any(|v| self.categories.contains(v))
        {
            return false;
        }

        true
    }

    pub fn apply<'a>(&self, scenes: &'a [Scene]) -> Vec<&'a Scene> {
        scenes.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Distinct violation labels over all scenes, in first-seen order.
pub fn available_categories(scenes: &[Scene]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for label in scenes.iter().flat_map(|s| s.violations.iter()) {
        if seen.insert(label.as_str()) {
            out.push(label.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenes() -> Vec<Scene> {
        vec![
            Scene {
                id: "1".into(),
                title: "Kitchen argument".into(),
                text: "They shout.".into(),
                violations: vec!["profanity".into()],
                ..Default::default()
            },
            Scene {
                id: "2".into(),
                title: "Alley".into(),
                text: "A KNIFE flashes.".into(),
                violations: vec!["violence".into(), "fear_elements".into()],
                ..Default::default()
            },
            Scene {
                id: "3".into(),
                title: "Morning".into(),
                text: "Breakfast, knife and butter.".into(),
                ..Default::default()
            },
        ]
    }

    fn ids(v: Vec<&Scene>) -> Vec<&str> {
        v.into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let s = scenes();
        let f = SceneFilter::default();
        assert!(f.is_empty());
        assert_eq!(f.apply(&s).len(), 3);
    }

    #[test]
    fn query_is_case_insensitive_over_title_and_text() {
        let s = scenes();
        let f = SceneFilter {
            query: Some("knife".into()),
            ..Default::default()
        };
        assert_eq!(ids(f.apply(&s)), vec!["2", "3"]);
    }

    #[test]
    fn categories_and_query_combine() {
        let s = scenes();
        let mut f = SceneFilter {
            query: Some("knife".into()),
            ..Default::default()
        };
        assert!(f.toggle_category("violence"));
        assert_eq!(ids(f.apply(&s)), vec!["2"]);

        assert!(!f.toggle_category("violence"));
        f.toggle_category("profanity");
        assert!(f.apply(&s).is_empty());

        f.clear();
        assert!(f.is_empty());
    }

    #[test]
    fn available_categories_are_distinct() {
        assert_eq!(
            available_categories(&scenes()),
            vec!["profanity", "violence", "fear_elements"]
        );
    }
}
