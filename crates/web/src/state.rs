//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{MemberStore, TaskStore};
use crate::services::{AuthService, TaskWorkflow};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds configuration, the realm clients and
/// the store/workflow seams so tests can assemble the app over in-memory
/// implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    auth: AuthService,
    members: Arc<dyn MemberStore>,
    tasks: Arc<dyn TaskStore>,
    workflow: TaskWorkflow,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: AppConfig,
        auth: AuthService,
        members: Arc<dyn MemberStore>,
        tasks: Arc<dyn TaskStore>,
        workflow: TaskWorkflow,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                auth,
                members,
                tasks,
                workflow,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the member store.
    #[must_use]
    pub fn members(&self) -> &Arc<dyn MemberStore> {
        &self.inner.members
    }

    /// Get a reference to the task store.
    #[must_use]
    pub fn tasks(&self) -> &Arc<dyn TaskStore> {
        &self.inner.tasks
    }

    /// Get a reference to the task creation workflow.
    #[must_use]
    pub fn workflow(&self) -> &TaskWorkflow {
        &self.inner.workflow
    }
}
