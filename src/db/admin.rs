use anyhow::{Context, Result};

use super::models::{CategoryRecord, TestRecord};
use super::{new_id, now_timestamp, Database};

pub const ADMIN_ROLE: &str = "admin";

impl Database {
    pub fn grant_role(&self, user_id: &str, role: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
            rusqlite::params![user_id, role],
        )?;
        Ok(())
    }

    pub fn revoke_role(&self, user_id: &str, role: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM user_roles WHERE user_id = ?1 AND role = ?2",
            rusqlite::params![user_id, role],
        )?;
        Ok(n > 0)
    }

    pub fn has_role(&self, user_id: &str, role: &str) -> Result<bool> {
        let found: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM user_roles WHERE user_id = ?1 AND role = ?2",
            rusqlite::params![user_id, role],
            |r| r.get(0),
        )?;
        Ok(found)
    }

    pub fn admin_count(&self) -> Result<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM user_roles WHERE role = ?1",
            [ADMIN_ROLE],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    // ---- categories ----------------------------------------------------

    pub fn create_category(&self, name: &str, description: &str) -> Result<CategoryRecord> {
        let rec = CategoryRecord {
            id: new_id(),
            name: name.trim().to_string(),
            description: description.to_string(),
            created_at: now_timestamp(),
        };
        self.conn
            .execute(
                "INSERT INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![rec.id, rec.name, rec.description, rec.created_at],
            )
            .with_context(|| format!("Failed to create category: {}", rec.name))?;
        Ok(rec)
    }

    /// Categories newest first.
    pub fn list_categories(&self) -> Result<Vec<CategoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at FROM categories
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Look a category up by id or by exact name.
    pub fn find_category(&self, id_or_name: &str) -> Result<Option<CategoryRecord>> {
        Ok(self
            .list_categories()?
            .into_iter()
            .find(|c| c.id == id_or_name || c.name == id_or_name))
    }

    pub fn delete_category(&self, id: &str) -> Result<bool> {
        let n = self.conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
        Ok(n > 0)
    }

    // ---- tests ---------------------------------------------------------

    pub fn create_test(&self, title: &str, content: &str, category_id: Option<&str>) -> Result<TestRecord> {
        let id = new_id();
        let created_at = now_timestamp();
        self.conn.execute(
            "INSERT INTO tests (id, category_id, title, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, category_id, title, content, created_at],
        )?;
        let category_name = match category_id {
            Some(cid) => self
                .conn
                .query_row("SELECT name FROM categories WHERE id = ?1", [cid], |r| r.get(0))
                .ok(),
            None => None,
        };
        Ok(TestRecord {
            id,
            category_id: category_id.map(str::to_string),
            category_name,
            title: title.to_string(),
            content: content.to_string(),
            created_at,
        })
    }

    /// Tests newest first, joined with their category name.
    pub fn list_tests(&self) -> Result<Vec<TestRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.category_id, c.name, t.title, t.content, t.created_at
             FROM tests t LEFT JOIN categories c ON c.id = t.category_id
             ORDER BY t.created_at DESC, t.rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TestRecord {
                id: row.get(0)?,
                category_id: row.get(1)?,
                category_name: row.get(2)?,
                title: row.get(3)?,
                content: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete_test(&self, id: &str) -> Result<bool> {
        let n = self.conn.execute("DELETE FROM tests WHERE id = ?1", [id])?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.admin_count().unwrap(), 0);
        db.grant_role("alice", ADMIN_ROLE).unwrap();
        db.grant_role("alice", ADMIN_ROLE).unwrap();
        assert_eq!(db.admin_count().unwrap(), 1);
        assert!(db.has_role("alice", ADMIN_ROLE).unwrap());
        assert!(!db.has_role("bob", ADMIN_ROLE).unwrap());
        assert!(db.revoke_role("alice", ADMIN_ROLE).unwrap());
        assert!(!db.has_role("alice", ADMIN_ROLE).unwrap());
    }

    #[test]
    fn tests_carry_category_name_and_survive_category_delete() {
        let db = Database::open_in_memory().unwrap();
        let cat = db.create_category("Violence", "Fights and weapons").unwrap();
        let t = db.create_test("Bar fight", "He swings a bottle.", Some(&cat.id)).unwrap();
        assert_eq!(t.category_name.as_deref(), Some("Violence"));

        let listed = db.list_tests().unwrap();
        assert_eq!(listed[0].category_name.as_deref(), Some("Violence"));

        assert!(db.delete_category(&cat.id).unwrap());
        let listed = db.list_tests().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category_id, None);
        assert_eq!(listed[0].category_name, None);

        assert!(db.delete_test(&t.id).unwrap());
        assert!(db.list_tests().unwrap().is_empty());
    }

    #[test]
    fn duplicate_category_name_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_category("Profanity", "").unwrap();
        assert!(db.create_category("Profanity", "again").is_err());
        assert!(db.find_category("Profanity").unwrap().is_some());
    }
}
