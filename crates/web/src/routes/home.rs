//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, response::IntoResponse};
use serde::Deserialize;

use crate::middleware::OptionalAuth;
use crate::models::Identity;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// The signed-in identity, if any.
    pub identity: Option<Identity>,
    /// Error flag carried back from a failed login attempt.
    pub error: Option<String>,
}

/// Query parameters on the landing page.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub error: Option<String>,
}

/// Display the landing page.
///
/// Serves both the anonymous view with the two login links and the
/// signed-in view; failed logins land back here with an `error` flag.
pub async fn home(
    OptionalAuth(identity): OptionalAuth,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    HomeTemplate {
        identity,
        error: query.error,
    }
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}
