//! Input validation for user-supplied names and text
//!
//! Every value is trimmed first; the length rules apply to the trimmed
//! value and count characters, not bytes.

use validator::Validate;

use crate::error::{AppError, AppResult};

pub const MAX_USERNAME_CHARS: usize = 50;
pub const MAX_LIST_NAME_CHARS: usize = 100;
pub const MAX_TODO_TEXT_CHARS: usize = 500;

// Attribute limits mirror the MAX_* constants above
#[derive(Debug, Validate)]
struct UsernameInput {
    #[validate(length(min = 1, max = 50))]
    value: String,
}

#[derive(Debug, Validate)]
struct ListNameInput {
    #[validate(length(min = 1, max = 100))]
    value: String,
}

#[derive(Debug, Validate)]
struct TodoTextInput {
    #[validate(length(min = 1, max = 500))]
    value: String,
}

/// Trimmed username, 1–50 characters
pub fn username(raw: &str) -> AppResult<String> {
    let input = UsernameInput {
        value: raw.trim().to_string(),
    };
    match input.validate() {
        Ok(()) => Ok(input.value),
        Err(_) => Err(rule_violation("Username", &input.value, MAX_USERNAME_CHARS)),
    }
}

/// Trimmed list name, 1–100 characters
pub fn list_name(raw: &str) -> AppResult<String> {
    let input = ListNameInput {
        value: raw.trim().to_string(),
    };
    match input.validate() {
        Ok(()) => Ok(input.value),
        Err(_) => Err(rule_violation("List name", &input.value, MAX_LIST_NAME_CHARS)),
    }
}

/// Trimmed todo text, 1–500 characters
pub fn todo_text(raw: &str) -> AppResult<String> {
    let input = TodoTextInput {
        value: raw.trim().to_string(),
    };
    match input.validate() {
        Ok(()) => Ok(input.value),
        Err(_) => Err(rule_violation("Todo text", &input.value, MAX_TODO_TEXT_CHARS)),
    }
}

fn rule_violation(field: &str, trimmed: &str, max: usize) -> AppError {
    if trimmed.is_empty() {
        AppError::Validation(format!("{} cannot be empty", field))
    } else {
        AppError::Validation(format!(
            "{} must be at most {} characters (got {})",
            field,
            max,
            trimmed.chars().count()
        ))
    }
}
