//! Task records created through the admin workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crewdesk_core::{TaskId, TaskStatus};

/// A persisted task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    /// Assignee display name. Resolved against the member registry by exact
    /// match; not a stable identifier.
    pub assigned_to: String,
    /// Deadline as submitted on the form; opaque to the workflow.
    pub deadline: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form input for task creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    #[serde(rename = "assignedTo")]
    pub assigned_to: String,
    pub deadline: String,
}

impl Task {
    /// Build a fresh task from form input.
    ///
    /// Generates the time-derived identifier and stamps the initial
    /// `PENDING` status and timestamps.
    #[must_use]
    pub fn create(input: NewTask) -> Self {
        let now = Utc::now();
        Self {
            task_id: TaskId::generate(),
            title: input.title,
            description: input.description,
            assigned_to: input.assigned_to,
            deadline: input.deadline,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewTask {
        NewTask {
            title: "Review PR".to_string(),
            description: "Look over the release branch".to_string(),
            assigned_to: "alice".to_string(),
            deadline: "2025-01-01".to_string(),
        }
    }

    #[test]
    fn test_create_stamps_pending_status() {
        let task = Task::create(input());
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_create_generates_distinct_ids() {
        let a = Task::create(input());
        let b = Task::create(input());
        assert_ne!(a.task_id, b.task_id);
    }

    #[test]
    fn test_form_field_names() {
        let task: NewTask = serde_json::from_str(
            r#"{"title":"t","description":"d","assignedTo":"alice","deadline":"2025-01-01"}"#,
        )
        .expect("deserialize form fields");
        assert_eq!(task.assigned_to, "alice");
    }
}
