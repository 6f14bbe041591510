//! Task creation workflow.
//!
//! Persisting the task is the only critical step. Once the row is
//! committed, assignee resolution and notification are side effects that
//! log on failure and never undo or report against the created task.

use std::sync::Arc;

use crate::db::{MemberStore, RepositoryError, TaskStore};
use crate::error::LogAndContinue;
use crate::models::{Member, NewTask, Task};
use crate::services::notify::{NotificationPipeline, NotificationRequest};

/// Creates tasks and notifies their assignees.
#[derive(Clone)]
pub struct TaskWorkflow {
    tasks: Arc<dyn TaskStore>,
    members: Arc<dyn MemberStore>,
    pipeline: NotificationPipeline,
}

impl TaskWorkflow {
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        members: Arc<dyn MemberStore>,
        pipeline: NotificationPipeline,
    ) -> Self {
        Self {
            tasks,
            members,
            pipeline,
        }
    }

    /// Create a task and attempt to notify its assignee.
    ///
    /// Persistence failure propagates; everything after the commit is
    /// best-effort.
    pub async fn create_task(&self, input: NewTask) -> Result<Task, RepositoryError> {
        let task = Task::create(input);
        self.tasks.create(&task).await?;

        tracing::info!(
            task_id = %task.task_id,
            assigned_to = %task.assigned_to,
            "task created"
        );

        self.notify_assignee(&task).await;
        Ok(task)
    }

    /// Resolve the assignee by display name and push a notification.
    ///
    /// Display names are not unique; the first member whose name matches
    /// exactly wins. No match means no notification, by design of the
    /// assignment form which offers names, not addresses.
    async fn notify_assignee(&self, task: &Task) {
        let Some(members) = self
            .members
            .list_all()
            .await
            .log_and_continue("member lookup for notification failed")
        else {
            return;
        };

        let Some(assignee) = find_by_name(&members, &task.assigned_to) else {
            tracing::info!(
                assigned_to = %task.assigned_to,
                "assignee not found among members, skipping notification"
            );
            return;
        };

        let request = NotificationRequest {
            recipient: assignee.email.clone(),
            subject: format!("New Task Assigned: {}", task.title),
            body: format!(
                "Dear {},\n\nYou have been assigned a new task:\n\nTitle: {}\nDescription: {}\nDeadline: {}\n\nPlease log in to view more details.\n\nThank you.",
                assignee.name, task.title, task.description, task.deadline
            ),
        };
        self.pipeline.notify(&request).await;
    }
}

fn find_by_name<'a>(members: &'a [Member], name: &str) -> Option<&'a Member> {
    members.iter().find(|member| member.name == name)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use crewdesk_core::{Email, MemberId};

    use super::*;
    use crate::db::{MemoryMemberStore, MemoryTaskStore, UpsertOutcome};
    use crate::models::NewMember;
    use crate::services::notify::{Channel, NotifyError};

    /// Records channel calls; optionally fails every call.
    #[derive(Default)]
    struct RecordingChannel {
        subscribes: Mutex<Vec<(String, String)>>,
        publishes: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        async fn subscribe(&self, protocol: &str, endpoint: &str) -> Result<(), NotifyError> {
            self.subscribes
                .lock()
                .expect("lock poisoned")
                .push((protocol.to_string(), endpoint.to_string()));
            if self.fail {
                return Err(NotifyError::Channel("subscribe down".to_string()));
            }
            Ok(())
        }

        async fn publish(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
            self.publishes
                .lock()
                .expect("lock poisoned")
                .push((subject.to_string(), body.to_string()));
            if self.fail {
                return Err(NotifyError::Channel("publish down".to_string()));
            }
            Ok(())
        }
    }

    struct FailingTaskStore;

    #[async_trait]
    impl TaskStore for FailingTaskStore {
        async fn create(&self, _task: &Task) -> Result<(), RepositoryError> {
            Err(RepositoryError::DataCorruption("disk gone".to_string()))
        }

        async fn list_all(&self) -> Result<Vec<Task>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    async fn members_with_alice() -> Arc<MemoryMemberStore> {
        let members = Arc::new(MemoryMemberStore::new());
        let outcome = members
            .upsert_if_absent(&NewMember {
                email: Email::parse("a@x.com").expect("valid email"),
                member_id: MemberId::new("u1"),
                name: "alice".to_string(),
                phone: None,
            })
            .await
            .expect("upsert");
        assert_eq!(outcome, UpsertOutcome::Inserted);
        members
    }

    fn task_for(assignee: &str) -> NewTask {
        NewTask {
            title: "Quarterly report".to_string(),
            description: "Compile Q3 numbers".to_string(),
            assigned_to: assignee.to_string(),
            deadline: "2025-10-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_known_assignee_is_subscribed_and_notified() {
        let channel = Arc::new(RecordingChannel::default());
        let workflow = TaskWorkflow::new(
            Arc::new(MemoryTaskStore::new()),
            members_with_alice().await,
            NotificationPipeline::new(channel.clone()),
        );

        let task = workflow.create_task(task_for("alice")).await.expect("create");
        assert_eq!(task.title, "Quarterly report");

        let subscribes = channel.subscribes.lock().expect("lock poisoned");
        assert_eq!(
            subscribes.as_slice(),
            [("email".to_string(), "a@x.com".to_string())]
        );

        let publishes = channel.publishes.lock().expect("lock poisoned");
        assert_eq!(publishes.len(), 1);
        assert_eq!(publishes[0].0, "New Task Assigned: Quarterly report");
        assert!(publishes[0].1.starts_with("Dear alice,"));
        assert!(publishes[0].1.contains("Deadline: 2025-10-01"));
    }

    #[tokio::test]
    async fn test_unknown_assignee_persists_task_without_notification() {
        let channel = Arc::new(RecordingChannel::default());
        let tasks = Arc::new(MemoryTaskStore::new());
        let workflow = TaskWorkflow::new(
            tasks.clone(),
            members_with_alice().await,
            NotificationPipeline::new(channel.clone()),
        );

        workflow.create_task(task_for("nobody")).await.expect("create");

        assert_eq!(tasks.list_all().await.expect("list").len(), 1);
        assert!(channel.subscribes.lock().expect("lock poisoned").is_empty());
        assert!(channel.publishes.lock().expect("lock poisoned").is_empty());
    }

    #[tokio::test]
    async fn test_channel_failure_does_not_fail_creation() {
        let channel = Arc::new(RecordingChannel {
            fail: true,
            ..RecordingChannel::default()
        });
        let workflow = TaskWorkflow::new(
            Arc::new(MemoryTaskStore::new()),
            members_with_alice().await,
            NotificationPipeline::new(channel.clone()),
        );

        workflow.create_task(task_for("alice")).await.expect("create");

        // Publish was still attempted after the failed subscribe.
        assert_eq!(channel.publishes.lock().expect("lock poisoned").len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_before_any_notification() {
        let channel = Arc::new(RecordingChannel::default());
        let workflow = TaskWorkflow::new(
            Arc::new(FailingTaskStore),
            members_with_alice().await,
            NotificationPipeline::new(channel.clone()),
        );

        let result = workflow.create_task(task_for("alice")).await;
        assert!(result.is_err());
        assert!(channel.subscribes.lock().expect("lock poisoned").is_empty());
        assert!(channel.publishes.lock().expect("lock poisoned").is_empty());
    }
}
