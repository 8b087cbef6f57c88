//! Storage configuration
//!
//! Values come from the environment with sensible defaults, so the same
//! binary runs unconfigured on a developer machine.

use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "TODO_DATA_DIR";
pub const DB_FILE_ENV: &str = "TODO_DB_FILE";
pub const POOL_SIZE_ENV: &str = "TODO_DB_POOL_SIZE";
pub const BACKUP_ENV: &str = "TODO_DB_BACKUP";

const DEFAULT_DB_FILE: &str = "todos.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding the database file; created on open
    pub data_dir: PathBuf,
    pub file_name: String,
    /// Connections kept by the pool. One is the normal deployment.
    pub pool_size: u32,
    /// Copy the database file aside before applying pending migrations
    pub backup_before_migrate: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: home.join(".todo-lists"),
            file_name: DEFAULT_DB_FILE.to_string(),
            pool_size: 1,
            backup_before_migrate: true,
        }
    }
}

impl StorageConfig {
    /// Build a config from `TODO_*` environment variables.
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Config rooted at an explicit directory, other fields defaulted
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup(DB_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.file_name = file;
        }
        match lookup(POOL_SIZE_ENV).map(|v| v.trim().parse::<u32>()) {
            Some(Ok(size)) if size > 0 => config.pool_size = size,
            Some(_) => tracing::warn!("Ignoring invalid {} value", POOL_SIZE_ENV),
            None => {}
        }
        if let Some(flag) = lookup(BACKUP_ENV) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.backup_before_migrate = true,
                "0" | "false" | "no" | "off" => config.backup_before_migrate = false,
                _ => tracing::warn!("Ignoring invalid {} value: {}", BACKUP_ENV, flag),
            }
        }

        config
    }
}
