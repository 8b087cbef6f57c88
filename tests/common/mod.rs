//! Common test utilities and helpers
//!
//! This module provides shared test infrastructure for integration tests.

#![allow(dead_code)]


use std::path::PathBuf;

use rusqlite::Connection;
use tempfile::TempDir;

use todo_lists_lib::db::{prepare_storage, Database};
use todo_lists_lib::{AppState, StorageConfig, User};

/// Test context that holds all resources needed for testing
pub struct TestContext {
    /// Migrated services over a fresh store
    pub state: AppState,
    /// Temporary directory holding the database file
    pub temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with a fresh database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = open_state(&temp_dir);
        Self { state, temp_dir }
    }

    /// Create a test context over a legacy store seeded with `rows`
    pub fn with_legacy_rows(rows: &[fixtures::LegacyTodo]) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = StorageConfig::in_dir(temp_dir.path());
        let conn = Connection::open(config.db_path()).expect("Failed to open legacy store");
        fixtures::seed_legacy_store(&conn, rows);
        drop(conn);

        let state = open_state(&temp_dir);
        Self { state, temp_dir }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub fn db_path(&self) -> PathBuf {
        StorageConfig::in_dir(self.temp_dir.path()).db_path()
    }

    /// Resolve (or create) a user through the service layer
    pub fn user(&self, username: &str) -> User {
        self.state
            .user_service
            .get_or_create_user(username)
            .expect("Failed to create user")
    }

    /// Run a single scalar query, for assertions on raw table state
    pub fn scalar(&self, sql: &str) -> i64 {
        self.db()
            .with_connection(|conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
            .expect("Failed to run scalar query")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn open_state(temp_dir: &TempDir) -> AppState {
    let config = StorageConfig {
        backup_before_migrate: false,
        ..StorageConfig::in_dir(temp_dir.path())
    };
    let storage = prepare_storage(&config).expect("Failed to prepare storage");
    AppState::new(storage)
}
