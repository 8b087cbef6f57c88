//! Migration tests to ensure database schema integrity

#[path = "../common/mod.rs"]
mod common;

use rusqlite::{params, Connection};
use tempfile::tempdir;

use common::fixtures::{self, LegacyTodo};
use common::TestContext;
use todo_lists_lib::db::migrations::{self, DEFAULT_OWNER_USERNAME};
use todo_lists_lib::db::schema::{column_exists, table_exists, SchemaShape};
use todo_lists_lib::db::{verify_migration, Database};

fn open(path: &std::path::Path) -> Connection {
    let conn = Connection::open(path).expect("Failed to open database");
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .expect("Failed to enable foreign keys");
    conn
}

/// Snapshot of (id, text, completed, created_at) ordered by id
fn todo_rows(conn: &Connection, table: &str) -> Vec<(i64, String, bool, String)> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, text, completed, created_at FROM {} ORDER BY id",
            table
        ))
        .expect("Failed to prepare snapshot");
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
        .expect("Failed to query snapshot")
        .collect::<Result<_, _>>()
        .expect("Failed to read snapshot")
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0))
        .expect("Failed to count")
}

#[test]
fn test_migrations_run_successfully() {
    let ctx = TestContext::new();

    assert_eq!(ctx.state.shape, SchemaShape::Normalized);
    assert_eq!(
        ctx.scalar("SELECT COUNT(*) FROM migrations"),
        migrations::known_migrations().len() as i64
    );

    ctx.db()
        .with_connection(|conn| {
            for table in ["users", "todo_lists", "todos", "migrations"] {
                assert!(table_exists(conn, table)?, "{} should exist", table);
            }
            assert!(column_exists(conn, "todos", "list_id")?);
            assert!(!column_exists(conn, "todos", "username")?);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_legacy_rows_land_in_default_list() {
    let rows = fixtures::legacy_rows();
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let conn = open(&temp_dir.path().join("legacy.db"));
    fixtures::seed_legacy_store(&conn, &rows);
    let before = todo_rows(&conn, "todos");

    migrations::apply_all(&conn).expect("Migrations should succeed");

    let after = todo_rows(&conn, "todos");
    assert_eq!(before, after, "id, text, completed and created_at survive");

    let owner_list: i64 = conn
        .query_row(
            r#"SELECT l.id FROM todo_lists l JOIN users u ON u.id = l.user_id
               WHERE u.username = ?1 AND l.name = 'My Tasks'"#,
            [DEFAULT_OWNER_USERNAME],
            |row| row.get(0),
        )
        .expect("Default owner list should exist");
    assert_eq!(
        count(&conn, &format!("SELECT COUNT(*) FROM todos WHERE list_id = {}", owner_list)),
        rows.len() as i64
    );

    // The legacy table is archived, not dropped
    assert_eq!(todo_rows(&conn, "todos_legacy"), before);
    assert!(verify_migration(&conn).unwrap().is_empty());
}

#[test]
fn test_migrations_are_idempotent() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let conn = open(&temp_dir.path().join("twice.db"));
    fixtures::seed_legacy_store(&conn, &fixtures::legacy_rows());

    migrations::apply_all(&conn).expect("First migration should succeed");
    let todos = todo_rows(&conn, "todos");
    let users = count(&conn, "SELECT COUNT(*) FROM users");
    let lists = count(&conn, "SELECT COUNT(*) FROM todo_lists");

    let report = migrations::apply_all(&conn).expect("Second migration should succeed");
    assert!(report.is_noop());
    assert_eq!(report.skipped, migrations::known_migrations());

    assert_eq!(todo_rows(&conn, "todos"), todos);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM users"), users);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM todo_lists"), lists);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM migrations"),
        migrations::known_migrations().len() as i64
    );
}

#[test]
fn test_partial_copy_converges() {
    let rows = fixtures::legacy_rows();
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let conn = open(&temp_dir.path().join("partial.db"));
    fixtures::seed_legacy_store(&conn, &rows);

    // Simulate a crash after the first two migrations and part of the copy
    conn.execute_batch(
        r#"
        CREATE TABLE migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            executed_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        INSERT INTO migrations (name) VALUES ('create_todos_table');
        ALTER TABLE todos ADD COLUMN username TEXT NOT NULL DEFAULT '';
        INSERT INTO migrations (name) VALUES ('add_username_to_todos');

        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE todo_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(name, user_id)
        );
        CREATE TABLE todos_new (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            completed BOOLEAN NOT NULL DEFAULT 0,
            list_id INTEGER NOT NULL REFERENCES todo_lists(id) ON DELETE CASCADE,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        INSERT INTO users (username) VALUES ('default_user');
        INSERT INTO todo_lists (name, user_id) VALUES ('My Tasks', 1);
        INSERT INTO todos_new (id, text, completed, list_id, created_at)
            SELECT id, text, completed, 1, created_at FROM todos WHERE id = 1;
        "#,
    )
    .expect("Failed to stage partial migration");

    let report = migrations::apply_all(&conn).expect("Rerun should converge");
    assert_eq!(report.applied, vec![migrations::NORMALIZE_USERS_LISTS_TODOS]);

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM todos"), rows.len() as i64);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM users"), 1);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM todo_lists"), 1);
    assert!(verify_migration(&conn).unwrap().is_empty());
}

#[test]
fn test_username_added_by_hand_is_recorded() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let conn = open(&temp_dir.path().join("manual.db"));
    fixtures::seed_legacy_store(&conn, &[LegacyTodo::new("Water plants", false, "2024-02-01 08:00:00")]);
    conn.execute("ALTER TABLE todos ADD COLUMN username TEXT", [])
        .expect("Failed to add column by hand");

    let report = migrations::apply_all(&conn).expect("Migrations should succeed");
    assert!(report.applied.contains(&migrations::ADD_USERNAME_TO_TODOS));
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM todos"), 1);
}

#[test]
fn test_deleting_user_cascades() {
    let ctx = TestContext::with_legacy_rows(&fixtures::legacy_rows());
    let alice = ctx.user("alice");
    let list = ctx.state.list_service.create_list(alice.id, "Groceries").unwrap();
    ctx.state
        .todo_service
        .create_todo_in_list(alice.id, list.id, "Eggs")
        .unwrap();

    let alice_lists = format!("SELECT COUNT(*) FROM todo_lists WHERE user_id = {}", alice.id);
    assert_eq!(ctx.scalar(&alice_lists), 2);

    ctx.db()
        .execute("DELETE FROM users WHERE id = ?1", params![alice.id])
        .unwrap();

    assert_eq!(ctx.scalar(&alice_lists), 0);
    assert_eq!(ctx.scalar("SELECT COUNT(*) FROM todos WHERE text = 'Eggs'"), 0);
    // Migrated rows of the default owner are untouched
    assert_eq!(ctx.scalar("SELECT COUNT(*) FROM todos"), 3);
}

#[test]
fn test_foreign_keys_enforced() {
    let ctx = TestContext::new();

    let orphan = ctx.db().execute(
        "INSERT INTO todos (text, completed, list_id) VALUES ('orphan', 0, 9999)",
        [],
    );
    assert!(orphan.is_err(), "todo with a missing list should be rejected");

    let listless = ctx.db().execute(
        "INSERT INTO todo_lists (name, user_id) VALUES ('Nowhere', 9999)",
        [],
    );
    assert!(listless.is_err(), "list with a missing user should be rejected");
}

#[test]
fn test_reopening_store_skips_everything() {
    let ctx = TestContext::with_legacy_rows(&fixtures::legacy_rows());
    let path = ctx.db_path();
    let before = ctx.scalar("SELECT COUNT(*) FROM todos");

    let db = Database::open(&path, 1).expect("Failed to reopen");
    let report = db
        .with_connection(migrations::apply_all)
        .expect("Reopen should succeed");

    assert!(report.is_noop());
    assert_eq!(ctx.scalar("SELECT COUNT(*) FROM todos"), before);
}
