//! User service for resolving owners by username

use crate::db::{Database, TodoListRepository, UserRepository};
use crate::error::{AppError, AppResult, ResultExt};
use crate::services::validation;
use crate::types::User;

pub struct UserService {
    user_repo: UserRepository,
    list_repo: TodoListRepository,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            list_repo: TodoListRepository::new(db),
        }
    }

    /// Return the user for `username`, creating it on first reference.
    ///
    /// The name is trimmed and must be 1–50 characters. A new user always
    /// leaves this call owning at least its default "My Tasks" list.
    pub fn get_or_create_user(&self, username: &str) -> AppResult<User> {
        let username = validation::username(username)?;

        let (user, created) = self
            .user_repo
            .get_or_create(&username)
            .with_context(|| format!("resolving user {}", username))?;

        // Also heals a user left without lists by an interrupted creation
        self.list_repo
            .default_for_user(user.id)
            .with_context(|| format!("creating default list for {}", username))?;

        if created {
            tracing::info!("Created user {} ({})", user.username, user.id);
        }
        Ok(user)
    }

    pub fn find_user(&self, username: &str) -> AppResult<User> {
        let username = validation::username(username)?;
        self.user_repo
            .find_by_username(&username)?
            .ok_or_else(|| AppError::NotFound(format!("User {}", username)))
    }

    pub fn get_user(&self, user_id: i64) -> AppResult<User> {
        self.user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }
}
