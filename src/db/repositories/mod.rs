//! Repository implementations for data access

pub mod todo_list_repository;
pub mod todo_repository;
pub mod user_repository;

pub use todo_list_repository::TodoListRepository;
pub use todo_repository::TodoRepository;
pub use user_repository::UserRepository;
