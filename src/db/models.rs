use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => anyhow::bail!("Unknown message role: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub analysis_data: Option<serde_json::Value>,
    pub created_at: String,
}

/// Data needed to insert a new scenario (no auto-generated fields).
#[derive(Debug, Clone)]
pub struct NewScenario {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub analysis_data: Option<serde_json::Value>,
}

/// Listing row for `screview scenarios list`.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub id: String,
    pub title: String,
    pub rating: Option<String>,
    pub content_bytes: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// Stats returned by `screview info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStats {
    pub conversations: i64,
    pub messages: i64,
    pub scenarios: i64,
    pub categories: i64,
    pub tests: i64,
    pub admins: i64,
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_column_text() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!(Role::Assistant.as_str().parse::<Role>().unwrap(), Role::Assistant);
        assert!("system".parse::<Role>().is_err());
    }
}
