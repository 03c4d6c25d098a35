//! SQLite-backed task storage for taskwheel.

use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use taskwheel_core::{Task, TaskId};
use tracing::{debug, info};

mod error;

pub use error::SqliteStoreError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS scheduler (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    date    CHAR(8)      NOT NULL,
    title   VARCHAR(128) NOT NULL,
    comment TEXT         NOT NULL DEFAULT '',
    repeat  VARCHAR(128) NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scheduler_date ON scheduler (date);";

const TASK_COLUMNS: &str = "id, date, title, comment, repeat";

/// Storage backed by a single SQLite database file.
///
/// The connection sits behind a `Mutex`, so conflicting writes against the
/// same task serialize here; lost races surface as zero affected rows.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if necessary) the database file and bootstrap the schema.
    ///
    /// # Errors
    /// Returns an error when the file cannot be opened or the schema cannot
    /// be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteStoreError> {
        let conn = Connection::open(&path)?;
        info!(path = %path.as_ref().display(), "opened scheduler database");
        Self::bootstrap(conn)
    }

    /// Open an in-memory database (used in tests and ad-hoc tooling).
    ///
    /// # Errors
    /// Returns an error when the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self, SqliteStoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.conn.lock().map_err(|_| SqliteStoreError::Lock)
    }

    /// Insert a task and return the identifier assigned by the database.
    ///
    /// # Errors
    /// Returns an error when the insert fails.
    pub fn insert(&self, task: &Task) -> Result<TaskId, SqliteStoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?1, ?2, ?3, ?4)",
            params![task.date, task.title, task.comment, task.repeat],
        )?;
        let id = TaskId(conn.last_insert_rowid());
        debug!(%id, date = %task.date, "inserted task");
        Ok(id)
    }

    /// Fetch a task by id, or `None` when no row matches.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn get(&self, id: TaskId) -> Result<Option<Task>, SqliteStoreError> {
        let conn = self.lock()?;
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM scheduler WHERE id = ?1"),
                params![id.0],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Overwrite every mutable column of the given task.
    ///
    /// Returns `false` when no row was affected (missing id or lost race).
    ///
    /// # Errors
    /// Returns an error when the update fails.
    pub fn update(&self, id: TaskId, task: &Task) -> Result<bool, SqliteStoreError> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE scheduler SET date = ?1, title = ?2, comment = ?3, repeat = ?4 WHERE id = ?5",
            params![task.date, task.title, task.comment, task.repeat, id.0],
        )?;
        debug!(%id, affected, "updated task");
        Ok(affected > 0)
    }

    /// Rewrite only the occurrence date of a task (used on completion).
    ///
    /// Returns `false` when no row was affected.
    ///
    /// # Errors
    /// Returns an error when the update fails.
    pub fn update_date(&self, id: TaskId, date: &str) -> Result<bool, SqliteStoreError> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE scheduler SET date = ?1 WHERE id = ?2",
            params![date, id.0],
        )?;
        debug!(%id, date, affected, "rescheduled task");
        Ok(affected > 0)
    }

    /// Delete a task by id.
    ///
    /// Returns `false` when no row was affected.
    ///
    /// # Errors
    /// Returns an error when the delete fails.
    pub fn delete(&self, id: TaskId) -> Result<bool, SqliteStoreError> {
        let conn = self.lock()?;
        let affected = conn.execute("DELETE FROM scheduler WHERE id = ?1", params![id.0])?;
        debug!(%id, affected, "deleted task");
        Ok(affected > 0)
    }

    /// List up to `limit` tasks ordered by their stored date string.
    ///
    /// The `YYYYMMDD` encoding sorts lexicographically in calendar order, so
    /// this is the "nearest task first" listing.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn list_by_date(&self, limit: usize) -> Result<Vec<Task>, SqliteStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM scheduler ORDER BY date LIMIT ?1"
        ))?;
        let rows = stmt.query_map(
            params![i64::try_from(limit).unwrap_or(i64::MAX)],
            task_from_row,
        )?;

        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }
}

fn task_from_row(row: &Row<'_>) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: Some(TaskId(row.get(0)?)),
        date: row.get(1)?,
        title: row.get(2)?,
        comment: row.get(3)?,
        repeat: row.get(4)?,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn sample(date: &str, title: &str) -> Task {
        Task {
            id: None,
            date: date.to_owned(),
            title: title.to_owned(),
            comment: String::new(),
            repeat: String::new(),
        }
    }

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("open in-memory store")
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = store();
        let first = store.insert(&sample("20240110", "a")).expect("insert");
        let second = store.insert(&sample("20240111", "b")).expect("insert");
        assert!(second.0 > first.0);
    }

    #[test]
    fn get_round_trips_every_column() {
        let store = store();
        let task = Task {
            id: None,
            date: "20240115".to_owned(),
            title: "standup".to_owned(),
            comment: "weekly sync".to_owned(),
            repeat: "w 1".to_owned(),
        };
        let id = store.insert(&task).expect("insert");

        let loaded = store.get(id).expect("get").expect("present");
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.date, task.date);
        assert_eq!(loaded.title, task.title);
        assert_eq!(loaded.comment, task.comment);
        assert_eq!(loaded.repeat, task.repeat);
    }

    #[test]
    fn get_returns_none_for_unknown_ids() {
        let store = store();
        assert!(store.get(TaskId(999)).expect("get").is_none());
    }

    #[test]
    fn update_reports_affected_rows() {
        let store = store();
        let id = store.insert(&sample("20240110", "a")).expect("insert");

        let mut edited = sample("20240120", "renamed");
        edited.comment = "moved".to_owned();
        assert!(store.update(id, &edited).expect("update"));
        assert!(!store.update(TaskId(999), &edited).expect("update missing"));

        let loaded = store.get(id).expect("get").expect("present");
        assert_eq!(loaded.title, "renamed");
        assert_eq!(loaded.date, "20240120");
        assert_eq!(loaded.comment, "moved");
    }

    #[test]
    fn update_date_touches_only_the_date() {
        let store = store();
        let mut task = sample("20240110", "recurring");
        task.repeat = "d 7".to_owned();
        let id = store.insert(&task).expect("insert");

        assert!(store.update_date(id, "20240117").expect("update date"));
        assert!(!store.update_date(TaskId(999), "20240117").expect("missing"));

        let loaded = store.get(id).expect("get").expect("present");
        assert_eq!(loaded.date, "20240117");
        assert_eq!(loaded.title, "recurring");
        assert_eq!(loaded.repeat, "d 7");
    }

    #[test]
    fn delete_reports_affected_rows() {
        let store = store();
        let id = store.insert(&sample("20240110", "a")).expect("insert");
        assert!(store.delete(id).expect("delete"));
        assert!(!store.delete(id).expect("delete again"));
        assert!(store.get(id).expect("get").is_none());
    }

    #[test]
    fn list_orders_by_date_and_honors_the_limit() {
        let store = store();
        store.insert(&sample("20240301", "march")).expect("insert");
        store.insert(&sample("20240110", "january")).expect("insert");
        store.insert(&sample("20240215", "february")).expect("insert");

        let tasks = store.list_by_date(50).expect("list");
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["january", "february", "march"]);

        let limited = store.list_by_date(2).expect("list limited");
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn list_is_empty_without_tasks() {
        let store = store();
        assert!(store.list_by_date(50).expect("list").is_empty());
    }

    #[test]
    fn open_persists_to_the_given_file() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("scheduler.db");

        let id = {
            let store = SqliteStore::open(&path).expect("open store");
            store.insert(&sample("20240110", "persisted")).expect("insert")
        };

        let reopened = SqliteStore::open(&path).expect("reopen store");
        let loaded = reopened.get(id).expect("get").expect("present");
        assert_eq!(loaded.title, "persisted");
    }
}
