//! User repository for database operations

use crate::db::{Database, DbError, DbResult};
use crate::types::User;

#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn find_by_id(&self, id: i64) -> DbResult<Option<User>> {
        self.db.query_one(
            "SELECT id, username, created_at FROM users WHERE id = ?1",
            [id],
            User::from_row,
        )
    }

    pub fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.db.query_one(
            "SELECT id, username, created_at FROM users WHERE username = ?1",
            [username],
            User::from_row,
        )
    }

    /// Plain insert; fails with a UNIQUE violation if the name is taken
    pub fn insert(&self, username: &str) -> DbResult<User> {
        let id = self
            .db
            .insert("INSERT INTO users (username) VALUES (?1)", [username])?;

        self.find_by_id(id)?.ok_or(DbError::NotFound)
    }

    /// Return the user with this name, inserting it if unseen.
    ///
    /// The flag is true when this call created the row. A concurrent insert
    /// of the same name surfaces as a UNIQUE violation and is resolved by
    /// reading the winner's row.
    pub fn get_or_create(&self, username: &str) -> DbResult<(User, bool)> {
        if let Some(user) = self.find_by_username(username)? {
            return Ok((user, false));
        }
        self.insert_or_reread(username)
    }

    /// Insert step of `get_or_create`, run after the lookup missed
    fn insert_or_reread(&self, username: &str) -> DbResult<(User, bool)> {
        match self.insert(username) {
            Ok(user) => {
                tracing::debug!("Created user {} ({})", user.username, user.id);
                Ok((user, true))
            }
            Err(e) if e.is_unique_violation() => {
                tracing::warn!("Concurrent creation of user {}, re-reading", username);
                let user = self.find_by_username(username)?.ok_or(e)?;
                Ok((user, false))
            }
            Err(e) => Err(e),
        }
    }

    pub fn count(&self) -> DbResult<i64> {
        let count = self
            .db
            .query_one("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count.unwrap_or(0))
    }
}
