//! Service layer for todo lists
//!
//! Services validate input, apply the ownership policy and translate
//! storage outcomes into application errors. They sit between an outer
//! transport layer and the repositories.

pub mod list_service;
pub mod todo_service;
pub mod user_service;
pub mod validation;

pub use list_service::ListService;
pub use todo_service::{TodoService, NOT_FOUND_OBSCURES_FORBIDDEN};
pub use user_service::UserService;
