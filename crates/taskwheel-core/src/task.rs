use crate::id::{self, TaskId};
use serde::{Deserialize, Serialize};

/// A scheduled task as stored and exchanged with clients.
///
/// `date` stays in its `YYYYMMDD` wire encoding; the string sorts
/// lexicographically in calendar order, which the store's date-ordered
/// listing relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier assigned by the store on insert; absent before that.
    #[serde(
        default,
        deserialize_with = "id::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<TaskId>,
    /// Next occurrence encoded as `YYYYMMDD`.
    #[serde(default)]
    pub date: String,
    /// Human-readable title; required.
    #[serde(default)]
    pub title: String,
    /// Free-form comment; may be empty.
    #[serde(default)]
    pub comment: String,
    /// Repeat rule; empty for one-off tasks.
    #[serde(default)]
    pub repeat: String,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_client_submission_without_id() {
        let task: Task = serde_json::from_str(
            r#"{"date":"20240110","title":"water the plants","comment":"","repeat":"d 3"}"#,
        )
        .expect("valid task json");
        assert_eq!(task.id, None);
        assert_eq!(task.date, "20240110");
        assert_eq!(task.title, "water the plants");
        assert_eq!(task.repeat, "d 3");
    }

    #[test]
    fn treats_an_empty_id_as_absent() {
        let task: Task =
            serde_json::from_str(r#"{"id":"","title":"x"}"#).expect("valid task json");
        assert_eq!(task.id, None);
    }

    #[test]
    fn round_trips_a_stored_task() {
        let task = Task {
            id: Some(TaskId(5)),
            date: "20240115".to_owned(),
            title: "standup".to_owned(),
            comment: "weekly sync".to_owned(),
            repeat: "w 1".to_owned(),
        };
        let json = serde_json::to_string(&task).expect("serialize task");
        assert!(json.contains(r#""id":"5""#));
        let back: Task = serde_json::from_str(&json).expect("deserialize task");
        assert_eq!(back, task);
    }

    #[test]
    fn omits_the_id_when_absent() {
        let task = Task {
            title: "x".to_owned(),
            ..Task::default()
        };
        let json = serde_json::to_string(&task).expect("serialize task");
        assert!(!json.contains("\"id\""));
    }
}
