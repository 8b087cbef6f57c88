//! Schema shape detection and shared DDL
//!
//! The store is either in the flat legacy shape (one `todos` table keyed by a
//! free-form username) or in the normalized users/lists/todos shape. Which one
//! is live is decided by the migration ledger, once, and never flips back.

use rusqlite::Connection;
use serde::Serialize;

use super::migrations::{LEDGER_TABLE, NORMALIZE_USERS_LISTS_TODOS};
use super::DbResult;

pub const TODOS_TABLE: &str = "todos";
/// Staging name for the normalized todos table until it is promoted
pub const TODOS_STAGING_TABLE: &str = "todos_new";
/// Where the legacy table is kept after normalization
pub const TODOS_ARCHIVE_TABLE: &str = "todos_legacy";

pub const DEFAULT_LIST_NAME: &str = "My Tasks";

pub(crate) const LEGACY_TODOS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

pub(crate) const LEGACY_TODOS_INDEXES: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_legacy_todos_completed ON todos(completed);
    CREATE INDEX IF NOT EXISTS idx_legacy_todos_created_at ON todos(created_at);
"#;

pub(crate) const LEGACY_USERNAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_legacy_todos_username ON todos(username)";

pub(crate) const NORMALIZED_TABLES_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS todo_lists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(name, user_id)
    );

    CREATE TABLE IF NOT EXISTS todos_new (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0,
        list_id INTEGER NOT NULL REFERENCES todo_lists(id) ON DELETE CASCADE,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

pub(crate) const NORMALIZED_INDEXES: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_todo_lists_user_id ON todo_lists(user_id);
    CREATE UNIQUE INDEX IF NOT EXISTS idx_todo_lists_name_user ON todo_lists(name, user_id);
    CREATE INDEX IF NOT EXISTS idx_todos_list_id ON todos(list_id);
    CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos(completed);
    CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at);
"#;

/// Which todo table layout is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaShape {
    /// Single `todos` table with a `username` column
    Legacy,
    /// `users` → `todo_lists` → `todos`
    Normalized,
}

impl SchemaShape {
    /// Read the ledger to decide the live shape.
    ///
    /// A store without a ledger has never been migrated and is legacy.
    pub fn detect(conn: &Connection) -> DbResult<Self> {
        if !table_exists(conn, LEDGER_TABLE)? {
            return Ok(SchemaShape::Legacy);
        }

        let normalized: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM migrations WHERE name = ?1",
            [NORMALIZE_USERS_LISTS_TODOS],
            |row| row.get(0),
        )?;

        Ok(if normalized {
            SchemaShape::Normalized
        } else {
            SchemaShape::Legacy
        })
    }

    pub fn is_normalized(self) -> bool {
        matches!(self, SchemaShape::Normalized)
    }
}

pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )
}

pub fn index_exists(conn: &Connection, index: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'index' AND name = ?1",
        [index],
        |row| row.get(0),
    )
}

/// Live column check against `PRAGMA table_info`
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |row| row.get(0),
    )
}

/// Row count of a table whose name comes from this module's constants
pub fn row_count(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
}
