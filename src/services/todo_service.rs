//! Todo service: the owner-facing contract over the schema-aware repository

use crate::db::{Database, SchemaShape, TodoRepository};
use crate::error::{AppError, AppResult};
use crate::services::validation;
use crate::types::Todo;

/// Cross-owner access is reported exactly like a missing row, so callers
/// cannot probe for other users' ids.
pub const NOT_FOUND_OBSCURES_FORBIDDEN: bool = true;

pub struct TodoService {
    repo: TodoRepository,
}

impl TodoService {
    pub fn new(db: Database, shape: SchemaShape) -> Self {
        Self {
            repo: TodoRepository::new(db, shape),
        }
    }

    pub fn schema_is_normalized(&self) -> bool {
        self.repo.schema_is_normalized()
    }

    pub fn list_todos_for_owner(&self, owner: &str) -> AppResult<Vec<Todo>> {
        let owner = validation::username(owner)?;
        Ok(self.repo.list_for_owner(&owner)?)
    }

    pub fn create_todo_for_owner(&self, owner: &str, text: &str) -> AppResult<Todo> {
        let owner = validation::username(owner)?;
        let text = validation::todo_text(text)?;
        let todo = self.repo.create_for_owner(&owner, &text)?;
        tracing::debug!("Created todo {} for {}", todo.id, owner);
        Ok(todo)
    }

    pub fn set_completion(&self, owner: &str, todo_id: i64, completed: bool) -> AppResult<Todo> {
        let owner = validation::username(owner)?;
        self.repo
            .set_completion(&owner, todo_id, completed)?
            .ok_or_else(|| todo_not_found(todo_id))
    }

    pub fn delete_todo(&self, owner: &str, todo_id: i64) -> AppResult<()> {
        let owner = validation::username(owner)?;
        if self.repo.delete(&owner, todo_id)? {
            Ok(())
        } else {
            Err(todo_not_found(todo_id))
        }
    }

    /// Move a todo to another list of the same owner; only `list_id` changes
    pub fn move_to_list(&self, todo_id: i64, target_list_id: i64, owner_id: i64) -> AppResult<Todo> {
        self.repo
            .move_to_list(todo_id, target_list_id, owner_id)?
            .ok_or_else(|| todo_not_found(todo_id))
    }

    pub fn list_todos_in_list(&self, owner_id: i64, list_id: i64) -> AppResult<Vec<Todo>> {
        self.repo
            .list_in_list(owner_id, list_id)?
            .ok_or_else(|| AppError::NotFound(format!("List {}", list_id)))
    }

    pub fn create_todo_in_list(&self, owner_id: i64, list_id: i64, text: &str) -> AppResult<Todo> {
        let text = validation::todo_text(text)?;
        self.repo
            .create_in_list(owner_id, list_id, &text)?
            .ok_or_else(|| AppError::NotFound(format!("List {}", list_id)))
    }

    pub fn update_todo_text(&self, owner_id: i64, todo_id: i64, text: &str) -> AppResult<Todo> {
        let text = validation::todo_text(text)?;
        self.repo
            .update_text(owner_id, todo_id, &text)?
            .ok_or_else(|| todo_not_found(todo_id))
    }
}

fn todo_not_found(todo_id: i64) -> AppError {
    AppError::NotFound(format!("Todo {}", todo_id))
}
