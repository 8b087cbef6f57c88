//! List service for managing a user's todo lists

use crate::db::{Database, TodoListRepository, UserRepository};
use crate::error::{AppError, AppResult};
use crate::services::validation;
use crate::types::{TodoList, TodoListSummary};

pub struct ListService {
    user_repo: UserRepository,
    list_repo: TodoListRepository,
}

impl ListService {
    pub fn new(db: Database) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            list_repo: TodoListRepository::new(db),
        }
    }

    /// Create a list; names are unique per user and compared exactly
    pub fn create_list(&self, user_id: i64, name: &str) -> AppResult<TodoList> {
        let name = validation::list_name(name)?;

        if self.user_repo.find_by_id(user_id)?.is_none() {
            return Err(AppError::NotFound(format!("User {}", user_id)));
        }
        if self.list_repo.find_by_name(user_id, &name)?.is_some() {
            return Err(duplicate_name(&name));
        }

        // The UNIQUE(name, user_id) constraint still catches a racing insert
        match self.list_repo.insert(user_id, &name) {
            Ok(list) => {
                tracing::debug!("Created list {} ({}) for user {}", list.name, list.id, user_id);
                Ok(list)
            }
            Err(e) if e.is_unique_violation() => Err(duplicate_name(&name)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_lists(&self, user_id: i64) -> AppResult<Vec<TodoListSummary>> {
        Ok(self.list_repo.summaries_for_user(user_id)?)
    }

    pub fn get_list(&self, user_id: i64, list_id: i64) -> AppResult<TodoList> {
        self.list_repo
            .find_owned(user_id, list_id)?
            .ok_or_else(|| list_not_found(list_id))
    }

    /// Rename a list. Renaming to its current name is accepted unchanged.
    pub fn rename_list(&self, user_id: i64, list_id: i64, name: &str) -> AppResult<TodoList> {
        let name = validation::list_name(name)?;
        let list = self.get_list(user_id, list_id)?;

        if list.name == name {
            return Ok(list);
        }
        if let Some(other) = self.list_repo.find_by_name(user_id, &name)? {
            if other.id != list_id {
                return Err(duplicate_name(&name));
            }
        }

        match self.list_repo.rename(list_id, &name) {
            Ok(_) => {}
            Err(e) if e.is_unique_violation() => return Err(duplicate_name(&name)),
            Err(e) => return Err(e.into()),
        }

        self.get_list(user_id, list_id)
    }

    /// Delete a list and, by cascade, its todos. The last list is kept.
    pub fn delete_list(&self, user_id: i64, list_id: i64) -> AppResult<()> {
        self.get_list(user_id, list_id)?;

        if self.list_repo.count_for_user(user_id)? <= 1 {
            return Err(last_list());
        }

        // Re-checked atomically in case another delete won the race
        if self.list_repo.delete_unless_last(user_id, list_id)? == 0 {
            return Err(last_list());
        }

        tracing::debug!("Deleted list {} of user {}", list_id, user_id);
        Ok(())
    }

    pub fn default_list(&self, user_id: i64) -> AppResult<TodoList> {
        if self.user_repo.find_by_id(user_id)?.is_none() {
            return Err(AppError::NotFound(format!("User {}", user_id)));
        }
        Ok(self.list_repo.default_for_user(user_id)?)
    }
}

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict(format!("A list named '{}' already exists", name))
}

fn last_list() -> AppError {
    AppError::Conflict("Cannot delete the only remaining list".to_string())
}

fn list_not_found(list_id: i64) -> AppError {
    AppError::NotFound(format!("List {}", list_id))
}
