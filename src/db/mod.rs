pub mod admin;
pub mod feed;
pub mod migrations;
pub mod models;
pub mod schema;

use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use feed::{MessageFeed, Subscription};
use models::*;

pub struct Database {
    pub conn: Connection,
    pub path: PathBuf,
    feed: Arc<MessageFeed>,
}

/// Current UTC time with millisecond precision, sortable as text.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA cache_size = -16000;",
        )?;

        let db = Self::init(conn, path.to_path_buf())?;
        info!("Opened database: {}", path.display());
        Ok(db)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, path: PathBuf) -> Result<Self> {
        schema::create_schema(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Database {
            conn,
            path,
            feed: Arc::new(MessageFeed::default()),
        })
    }

    /// Default database path: ~/.screview/screview.db
    pub fn default_db_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".screview").join("screview.db"))
    }

    pub fn schema_version(&self) -> Result<Option<String>> {
        let v = self
            .conn
            .query_row(
                "SELECT value FROM screview_meta WHERE key = 'schema_version'",
                [],
                |r| r.get(0),
            )
            .optional()?;
        Ok(v)
    }

    // ---- conversations -------------------------------------------------

    pub fn create_conversation(&self, user_id: &str, title: &str) -> Result<Conversation> {
        let now = now_timestamp();
        let conv = Conversation {
            id: new_id(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO conversations (id, user_id, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![conv.id, conv.user_id, conv.title, conv.created_at, conv.updated_at],
        )?;
        info!("Created conversation {} ({})", conv.title, conv.id);
        Ok(conv)
    }

    /// Conversations for a user, most recently active first.
    pub fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, created_at, updated_at
             FROM conversations WHERE user_id = ?1
             ORDER BY updated_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([user_id], row_to_conversation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let conv = self
            .conn
            .query_row(
                "SELECT id, user_id, title, created_at, updated_at FROM conversations WHERE id = ?1",
                [id],
                row_to_conversation,
            )
            .optional()?;
        Ok(conv)
    }

    // ---- messages ------------------------------------------------------

    /// Insert a message, bump its conversation and notify subscribers.
    pub fn insert_message(&self, conversation_id: &str, role: Role, content: &str) -> Result<Message> {
        let message = Message {
            id: new_id(),
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            created_at: now_timestamp(),
        };

        let tx = self.conn.unchecked_transaction()?;
        let touched = tx.execute(
            "UPDATE conversations SET updated_at = ?2 WHERE id = ?1",
            rusqlite::params![conversation_id, message.created_at],
        )?;
        if touched == 0 {
            bail!("Conversation not found: {conversation_id}");
        }
        tx.execute(
            "INSERT INTO messages (id, conversation_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                message.id,
                message.conversation_id,
                message.role.as_str(),
                message.content,
                message.created_at,
            ],
        )?;
        tx.commit()?;

        self.feed.publish(&message);
        Ok(message)
    }

    /// Messages of a conversation in insertion order.
    pub fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, conversation_id, role, content, created_at
             FROM messages WHERE conversation_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([conversation_id], |row| {
            let role: String = row.get(2)?;
            Ok(Message {
                id: row.get(0)?,
                conversation_id: row.get(1)?,
                role: role.parse().unwrap_or(Role::Assistant),
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Receive every message inserted into `conversation_id` from now on.
    pub fn subscribe(&self, conversation_id: &str) -> Subscription {
        self.feed.subscribe(conversation_id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    // ---- scenarios -----------------------------------------------------

    pub fn insert_scenario(&self, s: &NewScenario) -> Result<Scenario> {
        let scenario = Scenario {
            id: new_id(),
            user_id: s.user_id.clone(),
            title: s.title.clone(),
            content: s.content.clone(),
            analysis_data: s.analysis_data.clone(),
            created_at: now_timestamp(),
        };
        let analysis_json = scenario
            .analysis_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO scenarios (id, user_id, title, content, analysis_data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                scenario.id,
                scenario.user_id,
                scenario.title,
                scenario.content,
                analysis_json,
                scenario.created_at,
            ],
        )?;
        info!("Stored scenario {} ({})", scenario.title, scenario.id);
        Ok(scenario)
    }

    pub fn get_scenario(&self, id: &str) -> Result<Option<Scenario>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, content, analysis_data, created_at
             FROM scenarios WHERE id = ?1",
        )?;
        let result = stmt
            .query_row([id], |row| {
                let analysis: Option<String> = row.get(4)?;
                Ok(Scenario {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    analysis_data: analysis.and_then(|s| serde_json::from_str(&s).ok()),
                    created_at: row.get(5)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    /// Scenarios newest first.
    pub fn list_scenarios(&self, user_id: Option<&str>, limit: usize) -> Result<Vec<ScenarioSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, json_extract(analysis_data, '$.overall_rating'),
                    length(CAST(content AS BLOB)), created_at
             FROM scenarios
             WHERE ?1 IS NULL OR user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(rusqlite::params![user_id, limit as i64], |row| {
            Ok(ScenarioSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                rating: row.get(2)?,
                content_bytes: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete_scenario(&self, id: &str) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM scenarios WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<DbStats> {
        let count = |sql: &str| -> Result<i64> { Ok(self.conn.query_row(sql, [], |r| r.get(0))?) };

        let db_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(DbStats {
            conversations: count("SELECT COUNT(*) FROM conversations")?,
            messages: count("SELECT COUNT(*) FROM messages")?,
            scenarios: count("SELECT COUNT(*) FROM scenarios")?,
            categories: count("SELECT COUNT(*) FROM categories")?,
            tests: count("SELECT COUNT(*) FROM tests")?,
            admins: count("SELECT COUNT(*) FROM user_roles WHERE role = 'admin'")?,
            db_size_bytes,
        })
    }
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
