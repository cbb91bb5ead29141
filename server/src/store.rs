//! Data access layer for todo records.
//!
//! Every write validates its payload before touching the connection, so a
//! rejected payload never reaches the table. The schema repeats the same
//! constraints as CHECK clauses.

use std::sync::{Mutex, MutexGuard};

use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use time::OffsetDateTime;
use todo_shared::{Priority, Task, TodoPayload, ValidationError};
use uuid::Uuid;

pub const MEMORY_URL: &str = ":memory:";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id          TEXT PRIMARY KEY NOT NULL,
    title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT NOT NULL CHECK (length(trim(description)) > 0),
    priority    TEXT NOT NULL DEFAULT 'Moderate'
                CHECK (priority IN ('Low', 'Moderate', 'High')),
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS todos_created_at ON todos (created_at);
";

const SELECT_COLUMNS: &str = "SELECT id, title, description, priority, created_at, updated_at FROM todos";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("todo not found: {0}")]
    NotFound(Uuid),

    #[error("store error: {0}")]
    Infrastructure(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Infrastructure(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait TodoStore: Send + Sync {
    fn create(&self, payload: &TodoPayload) -> StoreResult<Task>;
    /// Newest first; ties go to the most recent insert.
    fn list_all(&self) -> StoreResult<Vec<Task>>;
    fn get_by_id(&self, id: Uuid) -> StoreResult<Task>;
    /// Replaces title, description and priority. Id and creation time stay.
    fn update(&self, id: Uuid, payload: &TodoPayload) -> StoreResult<Task>;
    fn delete_by_id(&self, id: Uuid) -> StoreResult<()>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens a database file, or a private in-memory database for `:memory:`.
    /// A leading `sqlite://` is accepted and stripped.
    pub fn open(url: &str) -> StoreResult<Self> {
        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        let conn = if path == MEMORY_URL {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        debug!("opened todo store at {path}");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(MEMORY_URL)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Infrastructure("store connection lock poisoned".to_string()))
    }
}

impl TodoStore for SqliteStore {
    fn create(&self, payload: &TodoPayload) -> StoreResult<Task> {
        let draft = payload.validate()?;
        let now = now_millis();
        let id = Uuid::new_v4();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO todos (id, title, description, priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                id.to_string(),
                draft.title,
                draft.description,
                draft.priority.as_str(),
                now
            ],
        )?;

        Ok(Task {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            created_at: from_millis(now)?,
            updated_at: from_millis(now)?,
        })
    }

    fn list_all(&self) -> StoreResult<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC"))?;
        let rows = stmt
            .query_map([], TodoRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(TodoRow::into_task).collect()
    }

    fn get_by_id(&self, id: Uuid) -> StoreResult<Task> {
        let conn = self.lock()?;
        find(&conn, id)?.ok_or(StoreError::NotFound(id))
    }

    fn update(&self, id: Uuid, payload: &TodoPayload) -> StoreResult<Task> {
        let draft = payload.validate()?;

        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE todos
             SET title = ?2, description = ?3, priority = ?4, updated_at = max(?5, created_at)
             WHERE id = ?1",
            params![
                id.to_string(),
                draft.title,
                draft.description,
                draft.priority.as_str(),
                now_millis()
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        find(&conn, id)?.ok_or(StoreError::NotFound(id))
    }

    fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM todos WHERE id = ?1", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn find(conn: &Connection, id: Uuid) -> StoreResult<Option<Task>> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            [id.to_string()],
            TodoRow::from_row,
        )
        .optional()?;

    row.map(TodoRow::into_task).transpose()
}

struct TodoRow {
    id: String,
    title: String,
    description: String,
    priority: String,
    created_at: i64,
    updated_at: i64,
}

impl TodoRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            priority: row.get("priority")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_task(self) -> StoreResult<Task> {
        let id = Uuid::parse_str(&self.id).map_err(|err| {
            StoreError::Infrastructure(format!("corrupt id '{}': {err}", self.id))
        })?;
        let priority = self.priority.parse::<Priority>().map_err(|err| {
            StoreError::Infrastructure(format!("corrupt row {id}: {err}"))
        })?;

        Ok(Task {
            id,
            title: self.title,
            description: self.description,
            priority,
            created_at: from_millis(self.created_at)?,
            updated_at: from_millis(self.updated_at)?,
        })
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_millis(millis: i64) -> StoreResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|err| StoreError::Infrastructure(format!("invalid timestamp {millis}: {err}")))
}
