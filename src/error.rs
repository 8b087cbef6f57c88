//! Error types and result aliases for todo lists

use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing row, or a row owned by someone else
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violations and the last-list rule
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::RequiresNormalizedSchema(_) => AppError::Validation(err.to_string()),
            e if e.is_unique_violation() => AppError::Conflict(e.to_string()),
            e => AppError::Database(e),
        }
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;

/// Error response structure for an outer API layer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => ("CONFLICT", msg.clone()),
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        };

        let details = match &err {
            AppError::Database(DbError::Migration {
                migration, phase, ..
            }) => Some(serde_json::json!({ "migration": migration, "phase": phase })),
            _ => None,
        };

        ErrorResponse {
            code: code.to_string(),
            message,
            details,
        }
    }
}

// Convenience trait for adding context to errors
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: Into<AppError>> ResultExt<T> for Result<T, E> {
    /// Storage failures are wrapped with the operation name; domain errors
    /// (validation, not found, conflict) pass through unchanged.
    fn with_context<F, S>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| match e.into() {
            AppError::Database(db) => AppError::Internal(format!("{}: {}", f().into(), db)),
            other => other,
        })
    }
}
