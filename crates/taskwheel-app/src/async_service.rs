//! Async façade over the synchronous task service.
//!
//! Store access is blocking (SQLite under a mutex), so every call hops onto
//! the blocking thread pool via `tokio::task::spawn_blocking`, keeping async
//! server handlers off the blocking path.

use anyhow::anyhow;
use std::sync::Arc;
use taskwheel_core::{Task, TaskId};
use time::Date;

use crate::service::{TaskError, TaskService};
use crate::task_store::TaskStore;

/// Cloneable async handle to a [`TaskService`].
pub struct AsyncTaskService<S> {
    inner: Arc<TaskService<S>>,
}

impl<S> Clone for AsyncTaskService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> AsyncTaskService<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    /// Wrap a synchronous service.
    #[must_use]
    pub fn new(service: TaskService<S>) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, TaskError>
    where
        T: Send + 'static,
        F: FnOnce(&TaskService<S>) -> Result<T, TaskError> + Send + 'static,
    {
        let service = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&service))
            .await
            .map_err(|e| TaskError::Store(anyhow!("blocking task join error: {e}")))?
    }

    /// Async counterpart of [`TaskService::add`].
    ///
    /// # Errors
    /// Propagates [`TaskError`] from the underlying service.
    pub async fn add(&self, task: Task, now: Date) -> Result<TaskId, TaskError> {
        self.run(move |service| service.add(&task, now)).await
    }

    /// Async counterpart of [`TaskService::get`].
    ///
    /// # Errors
    /// Propagates [`TaskError`] from the underlying service.
    pub async fn get(&self, id: String) -> Result<Task, TaskError> {
        self.run(move |service| service.get(&id)).await
    }

    /// Async counterpart of [`TaskService::edit`].
    ///
    /// # Errors
    /// Propagates [`TaskError`] from the underlying service.
    pub async fn edit(&self, task: Task, now: Date) -> Result<Task, TaskError> {
        self.run(move |service| service.edit(&task, now)).await
    }

    /// Async counterpart of [`TaskService::complete`].
    ///
    /// # Errors
    /// Propagates [`TaskError`] from the underlying service.
    pub async fn complete(&self, id: String, now: Date) -> Result<(), TaskError> {
        self.run(move |service| service.complete(&id, now)).await
    }

    /// Async counterpart of [`TaskService::delete`].
    ///
    /// # Errors
    /// Propagates [`TaskError`] from the underlying service.
    pub async fn delete(&self, id: String) -> Result<(), TaskError> {
        self.run(move |service| service.delete(&id)).await
    }

    /// Async counterpart of [`TaskService::list`].
    ///
    /// # Errors
    /// Propagates [`TaskError`] from the underlying service.
    pub async fn list(&self) -> Result<Vec<Task>, TaskError> {
        self.run(TaskService::list).await
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use taskwheel_store_sqlite::SqliteStore;
    use time::macros::date;

    #[tokio::test]
    async fn add_complete_get_round_trip() {
        let now = date!(2024 - 01 - 10);
        let store = SqliteStore::open_in_memory().expect("open store");
        let service = AsyncTaskService::new(TaskService::new(store));

        let task = Task {
            id: None,
            date: "20240110".to_owned(),
            title: "water the plants".to_owned(),
            comment: String::new(),
            repeat: "d 7".to_owned(),
        };
        let id = service.add(task, now).await.expect("add");

        service.complete(id.to_string(), now).await.expect("complete");
        let task = service.get(id.to_string()).await.expect("get");
        assert_eq!(task.date, "20240117");

        let listed = service.list().await.expect("list");
        assert_eq!(listed.len(), 1);
    }
}
