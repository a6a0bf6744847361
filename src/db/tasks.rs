//! Task CRUD operations.

use super::{Database, now_ms};
use crate::types::{NewTask, Task, TaskPatch};
use anyhow::Result;
use rusqlite::{Connection, Row, params};
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, text, name, email, completed";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        text: row.get("text")?,
        name: row.get("name")?,
        email: row.get("email")?,
        completed: row.get::<_, i64>("completed")? != 0,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, task_id: &str) -> Result<Option<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM tasks WHERE id = ?1",
        TASK_COLUMNS
    ))?;

    match stmt.query_row(params![task_id], parse_task_row) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// List every task in insertion order.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM tasks ORDER BY created_at, rowid",
                TASK_COLUMNS
            ))?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Get a task by id.
    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Create a new task with a generated UUID7 id and `completed = false`.
    ///
    /// The caller validates `input`; an empty text still fails at the schema.
    pub fn create_task(&self, input: &NewTask) -> Result<Task> {
        let task = Task {
            id: Uuid::now_v7().to_string(),
            text: input.text.clone().unwrap_or_default(),
            name: input.name.clone().unwrap_or_default(),
            email: input.email.clone().unwrap_or_default(),
            completed: false,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (id, text, name, email, completed, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                params![task.id, task.text, task.name, task.email, now_ms()],
            )?;
            Ok(())
        })?;

        Ok(task)
    }

    /// Apply a patch to a task. Returns the merged task, or `None` if no task has that id.
    pub fn update_task(&self, task_id: &str, patch: &TaskPatch) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let Some(mut task) = get_task_internal(conn, task_id)? else {
                return Ok(None);
            };
            if patch.is_empty() {
                return Ok(Some(task));
            }

            patch.apply(&mut task);
            conn.execute(
                "UPDATE tasks SET text = ?1, name = ?2, email = ?3, completed = ?4 WHERE id = ?5",
                params![task.text, task.name, task.email, task.completed, task.id],
            )?;
            Ok(Some(task))
        })
    }

    /// Delete a task. Returns false if no task has that id.
    pub fn delete_task(&self, task_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(deleted > 0)
        })
    }
}
