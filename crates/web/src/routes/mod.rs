//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Landing page (both audiences)
//! GET  /health                  - Health check
//!
//! # Member auth
//! GET  /login                   - Redirect to member identity provider
//! GET  /index                   - Member OIDC callback
//! GET  /logout                  - Destroy session
//!
//! # Admin auth
//! GET  /admin/login             - Redirect to admin identity provider
//! GET  /admin/index             - Admin OIDC callback
//! GET  /admin/logout            - Destroy session
//!
//! # Admin (requires admin identity)
//! GET  /admin/dashboard         - Tasks + member registry
//! GET  /admin/create-task       - Task creation form
//! POST /admin/tasks/create-task - Create a task
//! ```

pub mod admin;
pub mod auth;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::admin_login))
        .route("/index", get(auth::admin_callback))
        .route("/logout", get(auth::sign_out))
        .route("/dashboard", get(admin::dashboard))
        .route("/create-task", get(admin::create_task_form))
        .route("/tasks/create-task", post(admin::create_task))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(home::health))
        // Member auth
        .route("/login", get(auth::member_login))
        .route("/index", get(auth::member_callback))
        .route("/logout", get(auth::sign_out))
        // Admin realm
        .nest("/admin", admin_routes())
}
