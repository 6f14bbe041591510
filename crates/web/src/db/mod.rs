//! Persistence for members and tasks.
//!
//! Access goes through the [`MemberStore`] and [`TaskStore`] traits so the
//! workflow and the test suite are independent of the storage engine. The
//! production implementations live in [`members`] and [`tasks`] on top of
//! `PostgreSQL`; [`memory`] provides process-local implementations used by
//! the tests.
//!
//! ## Tables
//!
//! - `members` - registered members, keyed by email
//! - `tasks` - tasks created through the admin workflow
//!
//! Migrations are stored in `crates/web/migrations/` and run at startup.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::models::{Member, NewMember, Task};

pub mod members;
pub mod memory;
pub mod tasks;

pub use members::PgMemberStore;
pub use memory::{MemoryMemberStore, MemoryTaskStore};
pub use tasks::PgTaskStore;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Outcome of a conditional member insert.
///
/// `AlreadyRegistered` is the expected steady state for returning members,
/// not an error: the row that exists is kept untouched and the losing write
/// is simply reported as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with this email already existed; nothing was changed.
    AlreadyRegistered,
}

/// Member registry operations.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Conditionally insert a member, keyed on email.
    ///
    /// The insert only happens when no row with this email exists; an
    /// existing row is never overwritten, so the original `created_at` is
    /// retained across repeat logins.
    async fn upsert_if_absent(&self, member: &NewMember) -> Result<UpsertOutcome, RepositoryError>;

    /// All registered members, for dashboard rendering and assignee
    /// resolution. No pagination; the member table is small.
    async fn list_all(&self) -> Result<Vec<Member>, RepositoryError>;
}

/// Task persistence operations.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a freshly created task.
    async fn create(&self, task: &Task) -> Result<(), RepositoryError>;

    /// All tasks, newest first.
    async fn list_all(&self) -> Result<Vec<Task>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
