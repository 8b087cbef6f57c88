//! Database layer for todo lists
//!
//! This module provides connection management, the migration runner that
//! moves the flat legacy table into the normalized schema, schema shape
//! detection, and repository implementations for all data access.

pub mod connection;
pub mod migration_tool;
pub mod migrations;
pub mod repositories;
pub mod schema;
pub mod storage;

pub use connection::{Database, DbError, DbPool, DbResult};
pub use migration_tool::{backup_database, verify_migration};
pub use migrations::{apply_all, MigrationReport};
pub use repositories::{TodoListRepository, TodoRepository, UserRepository};
pub use schema::SchemaShape;
pub use storage::{prepare_storage, PreparedStorage};
