//! Todo list repository for database operations

use rusqlite::params;

use crate::db::schema::DEFAULT_LIST_NAME;
use crate::db::{Database, DbError, DbResult};
use crate::types::{TodoList, TodoListSummary};

const LIST_COLUMNS: &str = "id, name, user_id, created_at";

#[derive(Clone)]
pub struct TodoListRepository {
    db: Database,
}

impl TodoListRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn find_by_id(&self, id: i64) -> DbResult<Option<TodoList>> {
        self.db.query_one(
            &format!("SELECT {} FROM todo_lists WHERE id = ?1", LIST_COLUMNS),
            [id],
            TodoList::from_row,
        )
    }

    /// The list, only if `user_id` owns it
    pub fn find_owned(&self, user_id: i64, list_id: i64) -> DbResult<Option<TodoList>> {
        self.db.query_one(
            &format!(
                "SELECT {} FROM todo_lists WHERE id = ?1 AND user_id = ?2",
                LIST_COLUMNS
            ),
            params![list_id, user_id],
            TodoList::from_row,
        )
    }

    pub fn find_by_name(&self, user_id: i64, name: &str) -> DbResult<Option<TodoList>> {
        self.db.query_one(
            &format!(
                "SELECT {} FROM todo_lists WHERE user_id = ?1 AND name = ?2",
                LIST_COLUMNS
            ),
            params![user_id, name],
            TodoList::from_row,
        )
    }

    pub fn find_by_user(&self, user_id: i64) -> DbResult<Vec<TodoList>> {
        self.db.query_many(
            &format!(
                "SELECT {} FROM todo_lists WHERE user_id = ?1 ORDER BY created_at, id",
                LIST_COLUMNS
            ),
            [user_id],
            TodoList::from_row,
        )
    }

    pub fn summaries_for_user(&self, user_id: i64) -> DbResult<Vec<TodoListSummary>> {
        self.db.query_many(
            r#"
            SELECT l.id, l.name, l.user_id, l.created_at,
                   COUNT(t.id),
                   COALESCE(SUM(CASE WHEN t.completed THEN 1 ELSE 0 END), 0)
            FROM todo_lists l
            LEFT JOIN todos t ON t.list_id = l.id
            WHERE l.user_id = ?1
            GROUP BY l.id
            ORDER BY l.created_at, l.id
        "#,
            [user_id],
            |row| {
                Ok(TodoListSummary {
                    list: TodoList::from_row(row)?,
                    todo_count: row.get(4)?,
                    completed_count: row.get(5)?,
                })
            },
        )
    }

    pub fn count_for_user(&self, user_id: i64) -> DbResult<i64> {
        let count = self.db.query_one(
            "SELECT COUNT(*) FROM todo_lists WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count.unwrap_or(0))
    }

    /// Plain insert; a taken name surfaces as a UNIQUE violation
    pub fn insert(&self, user_id: i64, name: &str) -> DbResult<TodoList> {
        let id = self.db.insert(
            "INSERT INTO todo_lists (name, user_id) VALUES (?1, ?2)",
            params![name, user_id],
        )?;

        self.find_by_id(id)?.ok_or(DbError::NotFound)
    }

    pub fn rename(&self, list_id: i64, name: &str) -> DbResult<usize> {
        self.db.execute(
            "UPDATE todo_lists SET name = ?1 WHERE id = ?2",
            params![name, list_id],
        )
    }

    /// Delete a list unless it is the owner's last one.
    ///
    /// The count check lives in the same statement as the delete, so two
    /// racing deletes cannot both succeed and leave the owner with no list.
    /// Returns the number of rows removed.
    pub fn delete_unless_last(&self, user_id: i64, list_id: i64) -> DbResult<usize> {
        self.db.execute(
            r#"
            DELETE FROM todo_lists
            WHERE id = ?1 AND user_id = ?2
              AND (SELECT COUNT(*) FROM todo_lists WHERE user_id = ?2) > 1
        "#,
            params![list_id, user_id],
        )
    }

    /// Resolve the list that owner-scoped todo operations default to.
    ///
    /// Prefers the list named "My Tasks", then the oldest list. A user with
    /// no lists at all gets a fresh "My Tasks".
    pub fn default_for_user(&self, user_id: i64) -> DbResult<TodoList> {
        if let Some(list) = self.find_by_name(user_id, DEFAULT_LIST_NAME)? {
            return Ok(list);
        }
        if let Some(oldest) = self.find_by_user(user_id)?.into_iter().next() {
            return Ok(oldest);
        }

        self.db.execute(
            "INSERT OR IGNORE INTO todo_lists (name, user_id) VALUES (?1, ?2)",
            params![DEFAULT_LIST_NAME, user_id],
        )?;
        self.find_by_name(user_id, DEFAULT_LIST_NAME)?
            .ok_or(DbError::NotFound)
    }
}
