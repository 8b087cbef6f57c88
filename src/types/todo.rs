//! Todo type definitions

use serde::{Deserialize, Serialize};

/// Database row representation for a todo.
///
/// Legacy rows carry the owner's username and no list; normalized rows the
/// reverse.
#[derive(Debug, Clone)]
pub struct TodoRow {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub list_id: Option<i64>,
    pub username: Option<String>,
    pub created_at: String,
}

impl TodoRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(TodoRow {
            id: row.get(0)?,
            text: row.get(1)?,
            completed: row.get(2)?,
            list_id: row.get(3)?,
            username: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

/// API representation for a todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<i64>,
    pub created_at: String,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            text: row.text,
            completed: row.completed,
            list_id: row.list_id,
            created_at: row.created_at,
        }
    }
}
