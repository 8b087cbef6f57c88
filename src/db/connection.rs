//! Database connection management

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Params, Row};
use thiserror::Error;

use crate::config::StorageConfig;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Migration '{migration}' failed during {phase}: {source}")]
    Migration {
        migration: &'static str,
        phase: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Operation '{0}' requires the normalized schema")]
    RequiresNormalizedSchema(&'static str),
    #[error("Backup error: {0}")]
    Backup(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not found")]
    NotFound,
}

impl DbError {
    /// True when SQLite rejected a write because of a UNIQUE constraint
    pub fn is_unique_violation(&self) -> bool {
        let source = match self {
            DbError::Rusqlite(e) => e,
            DbError::Migration { source, .. } => source,
            _ => return false,
        };
        matches!(
            source,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbResult<T> = Result<T, DbError>;

/// Handle to the application database.
///
/// Every call checks a connection out of the pool for exactly one statement
/// and returns it afterwards, so a pool of size one never deadlocks as long as
/// callers do not call back into `Database` from inside `with_connection`.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path, pool_size: u32) -> DbResult<Self> {
        tracing::info!("Opening database at {:?}", path);

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                r#"
                PRAGMA journal_mode = WAL;
                PRAGMA foreign_keys = ON;
                PRAGMA synchronous = NORMAL;
            "#,
            )?;
            Ok(())
        });

        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;
        Ok(Self { pool })
    }

    /// Open the database described by `config`, creating its directory first
    pub fn open_in_dir(config: &StorageConfig) -> DbResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        Self::open(&config.db_path(), config.pool_size)
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run a statement that returns no rows; yields the affected row count
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> DbResult<usize> {
        let conn = self.pool.get()?;
        Ok(conn.execute(sql, params)?)
    }

    /// Run an INSERT and return the rowid it produced
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> DbResult<i64> {
        let conn = self.pool.get()?;
        conn.execute(sql, params)?;
        Ok(conn.last_insert_rowid())
    }

    pub fn query_one<T, P, F>(&self, sql: &str, params: P, f: F) -> DbResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.pool.get()?;
        Ok(conn.query_row(sql, params, f).optional()?)
    }

    pub fn query_many<T, P, F>(&self, sql: &str, params: P, f: F) -> DbResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, f)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Execute a function with a single checked-out connection.
    ///
    /// Used for multi-statement work such as migrations and introspection.
    pub fn with_connection<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.pool.get()?;
        f(&conn)
    }

    /// Release the pool. Connections close once every clone is dropped.
    pub fn close(self) {
        tracing::info!("Closing database");
        drop(self.pool);
    }
}

// Helper trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
