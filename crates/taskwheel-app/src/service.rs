//! Task lifecycle orchestration shared by server surfaces.

use anyhow::Error;
use taskwheel_core::{DateError, FieldError, Repeat, RuleError, Task, TaskId, date, validate};
use time::Date;

use crate::task_store::TaskStore;

/// Upper bound on the number of tasks returned by a listing.
pub const PAGE_LIMIT: usize = 50;

/// Errors surfaced by [`TaskService`].
#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    /// A task field failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The repeat rule is malformed or out of range.
    #[error(transparent)]
    Rule(#[from] RuleError),
    /// A stored or submitted date cannot be parsed.
    #[error(transparent)]
    Date(#[from] DateError),
    /// The operation requires a task id.
    #[error("task id is required")]
    MissingId,
    /// The task id is not a decimal integer.
    #[error("invalid task id {0:?}")]
    InvalidId(String),
    /// No task with this id exists (or a concurrent write removed it).
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// Backing store returned an error.
    #[error("store error: {0}")]
    Store(#[from] Error),
}

/// High-level service implementing the task lifecycle.
///
/// Holds no mutable state of its own; the reference date for every
/// scheduling decision comes in from the caller.
pub struct TaskService<S> {
    store: S,
}

impl<S> TaskService<S> {
    /// Construct a new service over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Expose a reference to the underlying store (read-only operations).
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: TaskStore> TaskService<S> {
    fn store_error(err: S::Error) -> TaskError {
        TaskError::Store(err.into())
    }

    fn parse_id(id: &str) -> Result<TaskId, TaskError> {
        if id.is_empty() {
            return Err(TaskError::MissingId);
        }
        id.parse().map_err(|_| TaskError::InvalidId(id.to_owned()))
    }

    /// Validate and schedule a new task; returns the store-assigned id.
    ///
    /// # Errors
    /// Returns [`TaskError`] when validation fails or the insert fails; no
    /// store call happens on a validation failure.
    pub fn add(&self, task: &Task, now: Date) -> Result<TaskId, TaskError> {
        validate::title(&task.title)?;
        let rule: Repeat = task.repeat.parse()?;
        let resolved = validate::resolve_date(&task.date, now)?;

        // A recurring task keeps a resolved date of today as-is; any other
        // resolved date is advanced one cycle, a future one included.
        let scheduled = if rule.is_recurring() && resolved != now {
            rule.next_occurrence(now, resolved)?
        } else {
            resolved
        };

        let stored = Task {
            id: None,
            date: date::format(scheduled),
            title: task.title.clone(),
            comment: task.comment.clone(),
            repeat: task.repeat.clone(),
        };
        self.store.insert(&stored).map_err(Self::store_error)
    }

    /// Fetch a task by its id string.
    ///
    /// # Errors
    /// Returns [`TaskError`] when the id is missing, unparseable, or absent
    /// from the store.
    pub fn get(&self, id: &str) -> Result<Task, TaskError> {
        let id = Self::parse_id(id)?;
        self.store
            .get(id)
            .map_err(Self::store_error)?
            .ok_or(TaskError::NotFound(id))
    }

    /// Apply a full edit to an existing task and return the persisted value.
    ///
    /// # Errors
    /// Returns [`TaskError`] when the id is missing, validation fails, or
    /// the store reports zero affected rows.
    pub fn edit(&self, task: &Task, now: Date) -> Result<Task, TaskError> {
        let id = task.id.ok_or(TaskError::MissingId)?;
        validate::title(&task.title)?;

        let submitted = if task.date.is_empty() {
            now
        } else {
            date::parse(&task.date)?
        };
        let rule: Repeat = task.repeat.parse()?;

        // Past dates snap forward: one-off tasks to today, recurring tasks
        // to their next occurrence. Today and future dates stand.
        let scheduled = if submitted < now {
            if rule.is_recurring() {
                rule.next_occurrence(now, submitted)?
            } else {
                now
            }
        } else {
            submitted
        };

        let updated = Task {
            id: Some(id),
            date: date::format(scheduled),
            title: task.title.clone(),
            comment: task.comment.clone(),
            repeat: task.repeat.clone(),
        };
        if self.store.update(id, &updated).map_err(Self::store_error)? {
            Ok(updated)
        } else {
            Err(TaskError::NotFound(id))
        }
    }

    /// Mark a task done: one-off tasks are removed, recurring tasks advance
    /// to their next occurrence.
    ///
    /// # Errors
    /// Returns [`TaskError`] when the id is missing or unknown, the stored
    /// task is unreadable, or persisting the outcome fails.
    pub fn complete(&self, id: &str, now: Date) -> Result<(), TaskError> {
        let id = Self::parse_id(id)?;
        let task = self
            .store
            .get(id)
            .map_err(Self::store_error)?
            .ok_or(TaskError::NotFound(id))?;

        let rule: Repeat = task.repeat.parse()?;
        if rule.is_recurring() {
            let anchor = date::parse(&task.date)?;
            let next = rule.next_occurrence(now, anchor)?;
            if !self
                .store
                .update_date(id, &date::format(next))
                .map_err(Self::store_error)?
            {
                return Err(TaskError::NotFound(id));
            }
        } else if !self.store.delete(id).map_err(Self::store_error)? {
            return Err(TaskError::NotFound(id));
        }
        Ok(())
    }

    /// Delete a task unconditionally.
    ///
    /// # Errors
    /// Returns [`TaskError`] when the id is missing, unparseable, or the
    /// store reports zero affected rows.
    pub fn delete(&self, id: &str) -> Result<(), TaskError> {
        let id = Self::parse_id(id)?;
        if self.store.delete(id).map_err(Self::store_error)? {
            Ok(())
        } else {
            Err(TaskError::NotFound(id))
        }
    }

    /// List the nearest tasks, ascending by date.
    ///
    /// # Errors
    /// Returns [`TaskError::Store`] when the listing fails.
    pub fn list(&self) -> Result<Vec<Task>, TaskError> {
        self.store.list_by_date(PAGE_LIMIT).map_err(Self::store_error)
    }
}
