//! Todo list type definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub created_at: String,
}

impl TodoList {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(TodoList {
            id: row.get(0)?,
            name: row.get(1)?,
            user_id: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

/// List with item counts, for list overviews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListSummary {
    #[serde(flatten)]
    pub list: TodoList,
    pub todo_count: i64,
    pub completed_count: i64,
}

impl TodoListSummary {
    pub fn pending_count(&self) -> i64 {
        self.todo_count - self.completed_count
    }
}
