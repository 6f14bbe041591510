//! In-memory store implementations.
//!
//! Process-local stores with the same conditional-insert semantics as the
//! `PostgreSQL` implementations. The test suite runs on these.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crewdesk_core::Realm;

use super::{MemberStore, RepositoryError, TaskStore, UpsertOutcome};
use crate::models::{Member, NewMember, Task};

/// In-memory member store, keyed by email.
#[derive(Default)]
pub struct MemoryMemberStore {
    rows: RwLock<HashMap<String, Member>>,
}

impl MemoryMemberStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn upsert_if_absent(&self, member: &NewMember) -> Result<UpsertOutcome, RepositoryError> {
        let mut rows = self.rows.write().expect("lock poisoned");

        if rows.contains_key(member.email.as_str()) {
            return Ok(UpsertOutcome::AlreadyRegistered);
        }

        rows.insert(
            member.email.as_str().to_string(),
            Member {
                email: member.email.clone(),
                member_id: member.member_id.clone(),
                name: member.name.clone(),
                phone: member.phone.clone(),
                role: Realm::Member,
                created_at: Utc::now(),
            },
        );
        Ok(UpsertOutcome::Inserted)
    }

    async fn list_all(&self) -> Result<Vec<Member>, RepositoryError> {
        let rows = self.rows.read().expect("lock poisoned");
        let mut members: Vec<Member> = rows.values().cloned().collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(members)
    }
}

/// In-memory task store.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError> {
        self.rows.write().expect("lock poisoned").push(task.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Task>, RepositoryError> {
        let mut tasks = self.rows.read().expect("lock poisoned").clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use crewdesk_core::{Email, MemberId};

    use super::*;

    fn alice() -> NewMember {
        NewMember {
            email: Email::parse("a@x.com").expect("valid email"),
            member_id: MemberId::new("u1"),
            name: "alice".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_row_and_original_created_at() {
        let store = MemoryMemberStore::new();

        assert_eq!(
            store.upsert_if_absent(&alice()).await.expect("upsert"),
            UpsertOutcome::Inserted
        );
        let original = store.list_all().await.expect("list")[0].created_at;

        // Same email, different profile: the existing row must win.
        let mut returning = alice();
        returning.name = "alice-renamed".to_string();
        assert_eq!(
            store.upsert_if_absent(&returning).await.expect("upsert"),
            UpsertOutcome::AlreadyRegistered
        );

        let members = store.list_all().await.expect("list");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "alice");
        assert_eq!(members[0].created_at, original);
    }

    #[tokio::test]
    async fn test_tasks_list_newest_first() {
        use crate::models::NewTask;

        let store = MemoryTaskStore::new();
        for (i, title) in ["first", "second"].into_iter().enumerate() {
            let mut task = Task::create(NewTask {
                title: title.to_string(),
                description: String::new(),
                assigned_to: "alice".to_string(),
                deadline: "2025-01-01".to_string(),
            });
            // Force distinct creation instants
            task.created_at = Utc::now() + chrono::Duration::milliseconds(i as i64);
            store.create(&task).await.expect("create");
        }

        let tasks = store.list_all().await.expect("list");
        assert_eq!(tasks[0].title, "second");
    }
}
