//! Database migrations
//!
//! Migrations are applied in a fixed order and recorded by name in the
//! `migrations` ledger. A recorded name is never applied again. Each
//! migration body and its ledger row commit together, and every phase of the
//! normalization checks live table state first so that a rerun against a
//! half-migrated file converges instead of duplicating rows.

use rusqlite::{params, Connection};
use serde::Serialize;

use super::schema::{
    column_exists, row_count, table_exists, DEFAULT_LIST_NAME, LEGACY_TODOS_DDL,
    LEGACY_TODOS_INDEXES, LEGACY_USERNAME_INDEX, NORMALIZED_INDEXES, NORMALIZED_TABLES_DDL,
    TODOS_ARCHIVE_TABLE, TODOS_STAGING_TABLE, TODOS_TABLE,
};
use super::{DbError, DbResult};

pub const LEDGER_TABLE: &str = "migrations";

pub const CREATE_TODOS_TABLE: &str = "create_todos_table";
pub const ADD_USERNAME_TO_TODOS: &str = "add_username_to_todos";
pub const NORMALIZE_USERS_LISTS_TODOS: &str = "normalize_users_lists_todos";

/// Owner assigned to every todo that predates per-user lists
pub const DEFAULT_OWNER_USERNAME: &str = "default_user";

struct Migration {
    name: &'static str,
    apply: fn(&Connection) -> DbResult<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: CREATE_TODOS_TABLE,
        apply: create_todos_table,
    },
    Migration {
        name: ADD_USERNAME_TO_TODOS,
        apply: add_username_to_todos,
    },
    Migration {
        name: NORMALIZE_USERS_LISTS_TODOS,
        apply: normalize_users_lists_todos,
    },
];

/// Outcome of one `apply_all` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Names of every known migration, in application order
pub fn known_migrations() -> Vec<&'static str> {
    MIGRATIONS.iter().map(|m| m.name).collect()
}

/// Run all pending migrations
pub fn apply_all(conn: &Connection) -> DbResult<MigrationReport> {
    ensure_ledger(conn)?;

    let mut report = MigrationReport::default();

    for migration in MIGRATIONS {
        if is_recorded(conn, migration.name).phase(migration.name, "ledger lookup")? {
            tracing::debug!("Skipping migration {}: already applied", migration.name);
            report.skipped.push(migration.name);
            continue;
        }

        tracing::info!("Running migration {}", migration.name);

        let tx = conn
            .unchecked_transaction()
            .phase(migration.name, "begin transaction")?;
        (migration.apply)(&tx)?;
        tx.execute(
            "INSERT INTO migrations (name) VALUES (?1)",
            [migration.name],
        )
        .phase(migration.name, "record completion")?;
        tx.commit().phase(migration.name, "commit")?;

        tracing::info!("Applied migration {}", migration.name);
        report.applied.push(migration.name);
    }

    Ok(report)
}

/// Migrations not yet present in the ledger
pub fn pending(conn: &Connection) -> DbResult<Vec<&'static str>> {
    if !table_exists(conn, LEDGER_TABLE)? {
        return Ok(known_migrations());
    }

    let mut pending = Vec::new();
    for migration in MIGRATIONS {
        if !is_recorded(conn, migration.name)? {
            pending.push(migration.name);
        }
    }
    Ok(pending)
}

/// Ledger contents in execution order
pub fn applied_migrations(conn: &Connection) -> DbResult<Vec<String>> {
    if !table_exists(conn, LEDGER_TABLE)? {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare("SELECT name FROM migrations ORDER BY id")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

fn ensure_ledger(conn: &Connection) -> DbResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            executed_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#,
        [],
    )
    .phase("ledger", "create ledger table")?;
    Ok(())
}

fn is_recorded(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM migrations WHERE name = ?1",
        [name],
        |row| row.get(0),
    )
}

fn create_todos_table(conn: &Connection) -> DbResult<()> {
    const NAME: &str = CREATE_TODOS_TABLE;

    conn.execute_batch(LEGACY_TODOS_DDL)
        .phase(NAME, "create legacy table")?;
    conn.execute_batch(LEGACY_TODOS_INDEXES)
        .phase(NAME, "create legacy indexes")?;
    Ok(())
}

/// Detects the column by live introspection rather than trusting the
/// ledger, so stores where it was added by hand still get recorded.
fn add_username_to_todos(conn: &Connection) -> DbResult<()> {
    const NAME: &str = ADD_USERNAME_TO_TODOS;

    if column_exists(conn, TODOS_TABLE, "username").phase(NAME, "inspect columns")? {
        tracing::debug!("Column todos.username already present");
    } else {
        conn.execute(
            "ALTER TABLE todos ADD COLUMN username TEXT NOT NULL DEFAULT ''",
            [],
        )
        .phase(NAME, "add username column")?;
    }

    conn.execute(LEGACY_USERNAME_INDEX, [])
        .phase(NAME, "create username index")?;
    Ok(())
}

fn normalize_users_lists_todos(conn: &Connection) -> DbResult<()> {
    const NAME: &str = NORMALIZE_USERS_LISTS_TODOS;

    conn.execute_batch(NORMALIZED_TABLES_DDL)
        .phase(NAME, "create tables")?;

    // A `todos` table with list_id has already been promoted
    let legacy_live = table_exists(conn, TODOS_TABLE).phase(NAME, "inspect tables")?
        && !column_exists(conn, TODOS_TABLE, "list_id").phase(NAME, "inspect columns")?;

    if legacy_live {
        let legacy_rows = row_count(conn, TODOS_TABLE).phase(NAME, "count legacy rows")?;

        if legacy_rows > 0 {
            let list_id = ensure_default_owner_list(conn).phase(NAME, "create default owner")?;
            let copied = conn
                .execute(
                    r#"
                    INSERT OR IGNORE INTO todos_new (id, text, completed, list_id, created_at)
                    SELECT id, text, COALESCE(completed, 0), ?1,
                           COALESCE(created_at, CURRENT_TIMESTAMP)
                    FROM todos
                "#,
                    [list_id],
                )
                .phase(NAME, "copy legacy rows")?;
            tracing::info!(
                "Copied {} of {} legacy todos into list {}",
                copied,
                legacy_rows,
                list_id
            );
        }

        conn.execute_batch(&format!(
            "ALTER TABLE {} RENAME TO {}",
            TODOS_TABLE, TODOS_ARCHIVE_TABLE
        ))
        .phase(NAME, "archive legacy table")?;
    }

    let promote = table_exists(conn, TODOS_STAGING_TABLE).phase(NAME, "inspect tables")?
        && !table_exists(conn, TODOS_TABLE).phase(NAME, "inspect tables")?;
    if promote {
        conn.execute_batch(&format!(
            "ALTER TABLE {} RENAME TO {}",
            TODOS_STAGING_TABLE, TODOS_TABLE
        ))
        .phase(NAME, "promote normalized table")?;
    }

    conn.execute_batch(NORMALIZED_INDEXES)
        .phase(NAME, "create indexes")?;
    Ok(())
}

/// Get-or-create the default owner and its default list, keyed by name.
fn ensure_default_owner_list(conn: &Connection) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO users (username) VALUES (?1)",
        [DEFAULT_OWNER_USERNAME],
    )?;
    let user_id: i64 = conn.query_row(
        "SELECT id FROM users WHERE username = ?1",
        [DEFAULT_OWNER_USERNAME],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO todo_lists (name, user_id) VALUES (?1, ?2)",
        params![DEFAULT_LIST_NAME, user_id],
    )?;
    conn.query_row(
        "SELECT id FROM todo_lists WHERE name = ?1 AND user_id = ?2",
        params![DEFAULT_LIST_NAME, user_id],
        |row| row.get(0),
    )
}

trait PhaseExt<T> {
    fn phase(self, migration: &'static str, phase: &'static str) -> DbResult<T>;
}

impl<T> PhaseExt<T> for rusqlite::Result<T> {
    fn phase(self, migration: &'static str, phase: &'static str) -> DbResult<T> {
        self.map_err(|source| DbError::Migration {
            migration,
            phase,
            source,
        })
    }
}
