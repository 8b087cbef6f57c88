//! Todo Lists - storage core
//!
//! This library provides a multi-user todo store: a pooled SQLite
//! connection, the migration runner that moves a flat legacy table into
//! users, lists and todos, a schema-aware todo repository, and the user
//! and list services built on top.

pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod types;

use std::sync::Arc;

use db::{Database, PreparedStorage, SchemaShape};
use services::{ListService, TodoService, UserService};

/// Application state shared with an outer transport layer
pub struct AppState {
    /// Database handle, already migrated
    pub db: Database,
    /// Schema layout detected at startup
    pub shape: SchemaShape,
    pub user_service: Arc<UserService>,
    pub list_service: Arc<ListService>,
    pub todo_service: Arc<TodoService>,
}

impl AppState {
    /// Build the services from storage that finished migrating
    pub fn new(storage: PreparedStorage) -> Self {
        let (db, shape) = storage.into_parts();
        Self {
            user_service: Arc::new(UserService::new(db.clone())),
            list_service: Arc::new(ListService::new(db.clone())),
            todo_service: Arc::new(TodoService::new(db.clone(), shape)),
            db,
            shape,
        }
    }
}

// Re-export commonly used types
pub use config::StorageConfig;
pub use error::{AppError, AppResult};
pub use types::*;
