//! Migration support tooling
//!
//! This module provides utilities for:
//! - Backing up the database file before a schema change
//! - Verifying data integrity after the normalization migration

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use super::migrations::DEFAULT_OWNER_USERNAME;
use super::schema::{table_exists, DEFAULT_LIST_NAME, TODOS_ARCHIVE_TABLE};
use super::{DbError, DbResult};

/// Backup an existing database file
///
/// Creates a backup with timestamp: `todos.db.backup.YYYYMMDD_HHMMSS`
pub fn backup_database(db_path: &Path) -> DbResult<PathBuf> {
    if !db_path.exists() {
        return Err(DbError::Backup(format!(
            "Database file does not exist: {}",
            db_path.display()
        )));
    }

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let backup_path = db_path.with_extension(format!("db.backup.{}", timestamp));

    fs::copy(db_path, &backup_path)?;

    tracing::info!("Created database backup: {}", backup_path.display());
    Ok(backup_path)
}

/// Verify data integrity of the normalized schema
///
/// Checks:
/// - All foreign key constraints are satisfied
/// - Every user owns at least one list
/// - No todo points at a missing list
/// - Every archived legacy row made it into the default owner's list
///
/// Returns human-readable warnings; an empty vector means a clean store.
pub fn verify_migration(conn: &Connection) -> DbResult<Vec<String>> {
    let mut warnings = Vec::new();

    let fk_violations: Vec<String> = conn
        .prepare("PRAGMA foreign_key_check")?
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<_, _>>()?;

    for table in fk_violations {
        warnings.push(format!("Foreign key violation in table: {}", table));
    }

    let listless_users: i64 = conn.query_row(
        r#"SELECT COUNT(*) FROM users u
           WHERE NOT EXISTS (SELECT 1 FROM todo_lists l WHERE l.user_id = u.id)"#,
        [],
        |row| row.get(0),
    )?;

    if listless_users > 0 {
        warnings.push(format!("Found {} users without any list", listless_users));
    }

    let orphaned_todos: i64 = conn.query_row(
        r#"SELECT COUNT(*) FROM todos
           WHERE list_id NOT IN (SELECT id FROM todo_lists)"#,
        [],
        |row| row.get(0),
    )?;

    if orphaned_todos > 0 {
        warnings.push(format!(
            "Found {} orphaned todos (list doesn't exist)",
            orphaned_todos
        ));
    }

    if table_exists(conn, TODOS_ARCHIVE_TABLE)? {
        let archived: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TODOS_ARCHIVE_TABLE),
            [],
            |row| row.get(0),
        )?;

        // Archived ids that are missing from the live table
        let missing: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} a WHERE NOT EXISTS (SELECT 1 FROM todos t WHERE t.id = a.id)",
                TODOS_ARCHIVE_TABLE
            ),
            [],
            |row| row.get(0),
        )?;

        if missing > 0 {
            warnings.push(format!(
                "Record count mismatch: {} of {} legacy todos missing after migration",
                missing, archived
            ));
        }

        if archived > 0 {
            let in_default_list: i64 = conn.query_row(
                r#"SELECT COUNT(*) FROM todos t
                   JOIN todo_lists l ON l.id = t.list_id
                   JOIN users u ON u.id = l.user_id
                   WHERE u.username = ?1 AND l.name = ?2"#,
                params![DEFAULT_OWNER_USERNAME, DEFAULT_LIST_NAME],
                |row| row.get(0),
            )?;

            if in_default_list < archived - missing {
                warnings.push(format!(
                    "Default list holds {} todos, expected at least {}",
                    in_default_list,
                    archived - missing
                ));
            }
        }
    }

    Ok(warnings)
}
