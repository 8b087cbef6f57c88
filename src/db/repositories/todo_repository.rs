//! Schema-aware todo repository
//!
//! Serves owner-scoped todo operations against whichever table layout is
//! live. The layout is fixed at construction; every operation matches on it
//! exhaustively instead of re-reading the migration ledger per call.

use rusqlite::params;

use super::{TodoListRepository, UserRepository};
use crate::db::schema::SchemaShape;
use crate::db::{Database, DbError, DbResult};
use crate::types::{Todo, TodoList, TodoRow};

const NORMALIZED_COLUMNS: &str = "id, text, completed, list_id, NULL, created_at";
const LEGACY_COLUMNS: &str = "id, text, completed, NULL, username, created_at";

/// Incomplete items first, newest first within each group
const DISPLAY_ORDER: &str = "ORDER BY completed ASC, created_at DESC, id DESC";

#[derive(Clone)]
pub struct TodoRepository {
    db: Database,
    shape: SchemaShape,
    users: UserRepository,
    lists: TodoListRepository,
}

impl TodoRepository {
    pub fn new(db: Database, shape: SchemaShape) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            lists: TodoListRepository::new(db.clone()),
            db,
            shape,
        }
    }

    pub fn shape(&self) -> SchemaShape {
        self.shape
    }

    pub fn schema_is_normalized(&self) -> bool {
        self.shape.is_normalized()
    }

    /// Todos visible to `owner` on the default list (normalized) or by
    /// username (legacy)
    pub fn list_for_owner(&self, owner: &str) -> DbResult<Vec<Todo>> {
        match self.shape {
            SchemaShape::Normalized => {
                let list = self.default_list_for(owner)?;
                self.list_by_list_id(list.id)
            }
            SchemaShape::Legacy => self.query_todos(
                &format!(
                    "SELECT {} FROM todos WHERE username = ?1 {}",
                    LEGACY_COLUMNS, DISPLAY_ORDER
                ),
                [owner],
            ),
        }
    }

    /// Insert already-validated text for `owner`
    pub fn create_for_owner(&self, owner: &str, text: &str) -> DbResult<Todo> {
        match self.shape {
            SchemaShape::Normalized => {
                let list = self.default_list_for(owner)?;
                self.insert_into_list(list.id, text)
            }
            SchemaShape::Legacy => {
                let id = self.db.insert(
                    "INSERT INTO todos (text, completed, username) VALUES (?1, 0, ?2)",
                    params![text, owner],
                )?;
                self.find_by_id(id)?.ok_or(DbError::NotFound)
            }
        }
    }

    /// Set the completed flag. `None` when the todo is missing or not owned
    /// by `owner`.
    pub fn set_completion(
        &self,
        owner: &str,
        todo_id: i64,
        completed: bool,
    ) -> DbResult<Option<Todo>> {
        let changed = match self.shape {
            SchemaShape::Normalized => {
                let Some(user) = self.users.find_by_username(owner)? else {
                    return Ok(None);
                };
                self.db.execute(
                    r#"
                    UPDATE todos SET completed = ?1
                    WHERE id = ?2
                      AND list_id IN (SELECT id FROM todo_lists WHERE user_id = ?3)
                "#,
                    params![completed, todo_id, user.id],
                )?
            }
            SchemaShape::Legacy => self.db.execute(
                r#"
                UPDATE todos SET completed = ?1, updated_at = CURRENT_TIMESTAMP
                WHERE id = ?2 AND username = ?3
            "#,
                params![completed, todo_id, owner],
            )?,
        };

        if changed == 0 {
            return Ok(None);
        }
        self.find_by_id(todo_id)
    }

    /// Delete a todo owned by `owner`. False when missing or not owned.
    pub fn delete(&self, owner: &str, todo_id: i64) -> DbResult<bool> {
        let removed = match self.shape {
            SchemaShape::Normalized => {
                let Some(user) = self.users.find_by_username(owner)? else {
                    return Ok(false);
                };
                self.db.execute(
                    r#"
                    DELETE FROM todos
                    WHERE id = ?1
                      AND list_id IN (SELECT id FROM todo_lists WHERE user_id = ?2)
                "#,
                    params![todo_id, user.id],
                )?
            }
            SchemaShape::Legacy => self.db.execute(
                "DELETE FROM todos WHERE id = ?1 AND username = ?2",
                params![todo_id, owner],
            )?,
        };

        Ok(removed > 0)
    }

    /// Reassign a todo to another list of the same owner.
    ///
    /// Both the todo's current list and the target must belong to
    /// `owner_id`; otherwise nothing changes and `None` is returned.
    pub fn move_to_list(
        &self,
        todo_id: i64,
        target_list_id: i64,
        owner_id: i64,
    ) -> DbResult<Option<Todo>> {
        self.require_normalized("move_to_list")?;

        if self.lists.find_owned(owner_id, target_list_id)?.is_none() {
            return Ok(None);
        }

        let moved = self.db.execute(
            r#"
            UPDATE todos SET list_id = ?1
            WHERE id = ?2
              AND list_id IN (SELECT id FROM todo_lists WHERE user_id = ?3)
        "#,
            params![target_list_id, todo_id, owner_id],
        )?;

        if moved == 0 {
            return Ok(None);
        }
        self.find_by_id(todo_id)
    }

    /// Todos of one list owned by `owner_id`; `None` when not owned
    pub fn list_in_list(&self, owner_id: i64, list_id: i64) -> DbResult<Option<Vec<Todo>>> {
        self.require_normalized("list_in_list")?;

        if self.lists.find_owned(owner_id, list_id)?.is_none() {
            return Ok(None);
        }
        self.list_by_list_id(list_id).map(Some)
    }

    /// Insert already-validated text into a list owned by `owner_id`
    pub fn create_in_list(
        &self,
        owner_id: i64,
        list_id: i64,
        text: &str,
    ) -> DbResult<Option<Todo>> {
        self.require_normalized("create_in_list")?;

        if self.lists.find_owned(owner_id, list_id)?.is_none() {
            return Ok(None);
        }
        self.insert_into_list(list_id, text).map(Some)
    }

    pub fn update_text(&self, owner_id: i64, todo_id: i64, text: &str) -> DbResult<Option<Todo>> {
        self.require_normalized("update_text")?;

        let changed = self.db.execute(
            r#"
            UPDATE todos SET text = ?1
            WHERE id = ?2
              AND list_id IN (SELECT id FROM todo_lists WHERE user_id = ?3)
        "#,
            params![text, todo_id, owner_id],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.find_by_id(todo_id)
    }

    /// Unscoped lookup; callers apply their own ownership rule
    pub fn find_by_id(&self, id: i64) -> DbResult<Option<Todo>> {
        let columns = match self.shape {
            SchemaShape::Normalized => NORMALIZED_COLUMNS,
            SchemaShape::Legacy => LEGACY_COLUMNS,
        };
        let row = self.db.query_one(
            &format!("SELECT {} FROM todos WHERE id = ?1", columns),
            [id],
            TodoRow::from_row,
        )?;
        Ok(row.map(Todo::from))
    }

    fn default_list_for(&self, owner: &str) -> DbResult<TodoList> {
        let (user, _) = self.users.get_or_create(owner)?;
        self.lists.default_for_user(user.id)
    }

    fn list_by_list_id(&self, list_id: i64) -> DbResult<Vec<Todo>> {
        self.query_todos(
            &format!(
                "SELECT {} FROM todos WHERE list_id = ?1 {}",
                NORMALIZED_COLUMNS, DISPLAY_ORDER
            ),
            [list_id],
        )
    }

    fn insert_into_list(&self, list_id: i64, text: &str) -> DbResult<Todo> {
        let id = self.db.insert(
            "INSERT INTO todos (text, completed, list_id) VALUES (?1, 0, ?2)",
            params![text, list_id],
        )?;
        self.find_by_id(id)?.ok_or(DbError::NotFound)
    }

    fn query_todos<P: rusqlite::Params>(&self, sql: &str, params: P) -> DbResult<Vec<Todo>> {
        let rows = self.db.query_many(sql, params, TodoRow::from_row)?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    fn require_normalized(&self, operation: &'static str) -> DbResult<()> {
        match self.shape {
            SchemaShape::Normalized => Ok(()),
            SchemaShape::Legacy => Err(DbError::RequiresNormalizedSchema(operation)),
        }
    }
}
