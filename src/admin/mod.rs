use std::collections::BTreeSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::db::admin::ADMIN_ROLE;
use crate::db::models::{NewScenario, Scenario};
use crate::db::Database;

/// Fail unless `user_id` holds the admin role.
pub fn require_admin(db: &Database, user_id: &str) -> Result<()> {
    if !db.has_role(user_id, ADMIN_ROLE)? {
        bail!("Access denied: {user_id} does not have admin rights");
    }
    Ok(())
}

/// Grant a role. Only admins may do this, except while no admin exists yet.
pub fn grant(db: &Database, acting_user: &str, target_user: &str, role: &str) -> Result<()> {
    if db.admin_count()? > 0 {
        require_admin(db, acting_user)?;
    } else if role != ADMIN_ROLE {
        bail!("Grant the first admin role before assigning other roles");
    }
    db.grant_role(target_user, role)
}

/// Locally computed placeholder analysis for manual scenario intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockAnalysis {
    pub age_rating: String,
    pub sentiment: String,
    pub themes: Vec<String>,
    pub characters: usize,
    pub scenes: usize,
    /// Estimated running time in minutes.
    pub duration: usize,
    pub score: u32,
}

/// Words per minute of screen time used for the duration estimate.
const WORDS_PER_MINUTE: usize = 150;

/// Build the placeholder analysis from the script text alone.
///
/// Scenes are counted from `INT.`/`EXT.` sluglines, characters from distinct
/// all-caps cue lines.
pub fn mock_analysis(content: &str) -> MockAnalysis {
    let mut scenes = 0;
    let mut characters = BTreeSet::new();
    for line in content.lines().map(str::trim) {
        if line.starts_with("INT.") || line.starts_with("EXT.") {
            scenes += 1;
        } else if is_character_cue(line) {
            characters.insert(line.to_string());
        }
    }
    let words = content.split_whitespace().count();
    let duration = words.div_ceil(WORDS_PER_MINUTE);

    MockAnalysis {
        age_rating: "16+".to_string(),
        sentiment: "Positive".to_string(),
        themes: vec![
            "Adventure".to_string(),
            "Friendship".to_string(),
            "Growth".to_string(),
        ],
        characters: characters.len(),
        scenes: scenes.max(1),
        duration,
        score: 70 + (words % 30) as u32,
    }
}

fn is_character_cue(line: &str) -> bool {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty()
        && line.chars().count() <= 30
        && letters.iter().all(|c| c.is_uppercase())
        && !line.ends_with(':')
}

/// Store a manually entered scenario with its placeholder analysis.
pub fn analyze_scenario(db: &Database, user_id: &str, title: &str, content: &str) -> Result<(Scenario, MockAnalysis)> {
    if title.trim().is_empty() || content.trim().is_empty() {
        bail!("Both a title and scenario text are required");
    }
    let analysis = mock_analysis(content);
    let scenario = db.insert_scenario(&NewScenario {
        user_id: user_id.to_string(),
        title: title.trim().to_string(),
        content: content.to_string(),
        analysis_data: Some(serde_json::to_value(&analysis)?),
    })?;
    Ok((scenario, analysis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_admin_can_bootstrap_then_gate_applies() {
        let db = Database::open_in_memory().unwrap();
        assert!(require_admin(&db, "alice").is_err());
        assert!(grant(&db, "alice", "alice", "analyst").is_err());

        grant(&db, "alice", "alice", ADMIN_ROLE).unwrap();
        require_admin(&db, "alice").unwrap();

        assert!(grant(&db, "mallory", "mallory", ADMIN_ROLE).is_err());
        grant(&db, "alice", "bob", "analyst").unwrap();
        assert!(db.has_role("bob", "analyst").unwrap());
        assert!(require_admin(&db, "bob").is_err());
    }

    #[test]
    fn mock_analysis_counts_sluglines_and_cues() {
        let script = "INT. KITCHEN - DAY\n\nANNA\nMorning.\n\nBOB\nHi.\n\nEXT. GARDEN - DAY\n\nANNA\nLook!\n";
        let a = mock_analysis(script);
        assert_eq!(a.scenes, 2);
        assert_eq!(a.characters, 2);
        assert_eq!(a.duration, 1);
        assert!((70..100).contains(&a.score));
    }

    #[test]
    fn analyze_requires_title_and_text() {
        let db = Database::open_in_memory().unwrap();
        assert!(analyze_scenario(&db, "u", " ", "text").is_err());
        let (scenario, analysis) = analyze_scenario(&db, "u", "Draft", "INT. ROOM\nHello").unwrap();
        assert_eq!(analysis.scenes, 1);
        let stored = db.get_scenario(&scenario.id).unwrap().unwrap();
        assert_eq!(stored.analysis_data.unwrap()["age_rating"], "16+");
    }
}
