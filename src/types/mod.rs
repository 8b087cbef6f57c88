//! Type definitions for todo lists
//!
//! Database row types and the serializable shapes handed to an outer
//! transport layer.

pub mod todo;
pub mod todo_list;
pub mod user;

pub use todo::*;
pub use todo_list::*;
pub use user::*;
