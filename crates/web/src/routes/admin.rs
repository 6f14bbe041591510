//! Admin dashboard and task management handlers.
//!
//! Everything here sits behind [`RequireAdmin`]: an anonymous request is
//! redirected to the landing page, and an authenticated member gets a 403.
//! Unlike the login flows, fetch and persistence failures on these routes
//! do surface as a generic server error.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Identity, Member, NewTask, Task};
use crate::state::AppState;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub identity: Identity,
    pub tasks: Vec<Task>,
    pub members: Vec<Member>,
}

/// Task creation form template.
#[derive(Template, WebTemplate)]
#[template(path = "create_task.html")]
pub struct CreateTaskTemplate {
    pub identity: Identity,
    pub members: Vec<Member>,
}

/// Display the dashboard: all tasks plus the member registry.
///
/// # Route
///
/// `GET /admin/dashboard`
pub async fn dashboard(
    RequireAdmin(identity): RequireAdmin,
    State(state): State<AppState>,
) -> Result<DashboardTemplate> {
    let tasks = state.tasks().list_all().await?;
    let members = state.members().list_all().await?;

    Ok(DashboardTemplate {
        identity,
        tasks,
        members,
    })
}

/// Display the task creation form with the assignee dropdown.
///
/// # Route
///
/// `GET /admin/create-task`
pub async fn create_task_form(
    RequireAdmin(identity): RequireAdmin,
    State(state): State<AppState>,
) -> Result<CreateTaskTemplate> {
    let members = state.members().list_all().await?;

    Ok(CreateTaskTemplate { identity, members })
}

/// Create a task and return to the dashboard.
///
/// # Route
///
/// `POST /admin/tasks/create-task`
pub async fn create_task(
    RequireAdmin(_identity): RequireAdmin,
    State(state): State<AppState>,
    Form(input): Form<NewTask>,
) -> Result<Response> {
    state.workflow().create_task(input).await?;
    Ok(Redirect::to("/admin/dashboard").into_response())
}
