//! `PostgreSQL` task store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crewdesk_core::{TaskId, TaskStatus};

use super::{RepositoryError, TaskStore};
use crate::models::Task;

/// Internal row type for task queries.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    task_id: String,
    title: String,
    description: String,
    assigned_to: String,
    deadline: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatus::parse(&row.status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("unknown task status: {}", row.status))
        })?;

        Ok(Self {
            task_id: TaskId::new(row.task_id),
            title: row.title,
            description: row.description,
            assigned_to: row.assigned_to,
            deadline: row.deadline,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Task store backed by the `tasks` table.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    /// Create a new task store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO tasks (task_id, title, description, assigned_to,
                               deadline, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(task.task_id.as_str())
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.assigned_to)
        .bind(&task.deadline)
        .bind(task.status.as_str())
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Task>, RepositoryError> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            r"
            SELECT task_id, title, description, assigned_to,
                   deadline, status, created_at, updated_at
            FROM tasks
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
