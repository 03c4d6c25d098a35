//! Storage abstraction consumed by the task lifecycle service.

use anyhow::Error;
use taskwheel_core::{Task, TaskId};
use taskwheel_store_sqlite::SqliteStore;

/// Minimal storage contract required by [`crate::TaskService`].
///
/// Mutating operations report whether a row was affected; zero affected rows
/// signal a missing id or a lost race, which the service surfaces as
/// not-found rather than a silent success.
pub trait TaskStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Insert a task and return the identifier assigned by the store.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting the task fails.
    fn insert(&self, task: &Task) -> Result<TaskId, Self::Error>;

    /// Fetch a task by id, or `None` when no row matches.
    ///
    /// # Errors
    /// Returns a store-specific error when the lookup fails.
    fn get(&self, id: TaskId) -> Result<Option<Task>, Self::Error>;

    /// Overwrite every mutable column of the task with the given id.
    ///
    /// # Errors
    /// Returns a store-specific error when the update fails.
    fn update(&self, id: TaskId, task: &Task) -> Result<bool, Self::Error>;

    /// Rewrite only the occurrence date of the task with the given id.
    ///
    /// # Errors
    /// Returns a store-specific error when the update fails.
    fn update_date(&self, id: TaskId, date: &str) -> Result<bool, Self::Error>;

    /// Delete the task with the given id.
    ///
    /// # Errors
    /// Returns a store-specific error when the delete fails.
    fn delete(&self, id: TaskId) -> Result<bool, Self::Error>;

    /// List up to `limit` tasks in ascending order of their stored date
    /// string (lexicographic order equals calendar order for `YYYYMMDD`).
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn list_by_date(&self, limit: usize) -> Result<Vec<Task>, Self::Error>;
}

impl TaskStore for SqliteStore {
    type Error = taskwheel_store_sqlite::SqliteStoreError;

    fn insert(&self, task: &Task) -> Result<TaskId, Self::Error> {
        Self::insert(self, task)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        Self::get(self, id)
    }

    fn update(&self, id: TaskId, task: &Task) -> Result<bool, Self::Error> {
        Self::update(self, id, task)
    }

    fn update_date(&self, id: TaskId, date: &str) -> Result<bool, Self::Error> {
        Self::update_date(self, id, date)
    }

    fn delete(&self, id: TaskId) -> Result<bool, Self::Error> {
        Self::delete(self, id)
    }

    fn list_by_date(&self, limit: usize) -> Result<Vec<Task>, Self::Error> {
        Self::list_by_date(self, limit)
    }
}

impl<S> TaskStore for &S
where
    S: TaskStore + ?Sized,
{
    type Error = S::Error;

    fn insert(&self, task: &Task) -> Result<TaskId, Self::Error> {
        (*self).insert(task)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        (*self).get(id)
    }

    fn update(&self, id: TaskId, task: &Task) -> Result<bool, Self::Error> {
        (*self).update(id, task)
    }

    fn update_date(&self, id: TaskId, date: &str) -> Result<bool, Self::Error> {
        (*self).update_date(id, date)
    }

    fn delete(&self, id: TaskId) -> Result<bool, Self::Error> {
        (*self).delete(id)
    }

    fn list_by_date(&self, limit: usize) -> Result<Vec<Task>, Self::Error> {
        (*self).list_by_date(limit)
    }
}

impl<S> TaskStore for std::sync::Arc<S>
where
    S: TaskStore,
{
    type Error = S::Error;

    fn insert(&self, task: &Task) -> Result<TaskId, Self::Error> {
        (**self).insert(task)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        (**self).get(id)
    }

    fn update(&self, id: TaskId, task: &Task) -> Result<bool, Self::Error> {
        (**self).update(id, task)
    }

    fn update_date(&self, id: TaskId, date: &str) -> Result<bool, Self::Error> {
        (**self).update_date(id, date)
    }

    fn delete(&self, id: TaskId) -> Result<bool, Self::Error> {
        (**self).delete(id)
    }

    fn list_by_date(&self, limit: usize) -> Result<Vec<Task>, Self::Error> {
        (**self).list_by_date(limit)
    }
}
