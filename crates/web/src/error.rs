//! Unified error handling with Sentry integration.
//!
//! Only persistence failures on task creation and resource fetches for the
//! admin views surface to the user, as a generic failure response. Every
//! authentication and notification failure is handled by redirect or by the
//! [`LogAndContinue`] combinator; none of them reach the transport layer as
//! an unhandled fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        // Don't expose internal error details to clients
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Explicit "log and continue" consumption of a non-critical failure.
///
/// The policy throughout the side-effect pipeline is that secondary
/// failures (member upsert on login, channel subscribe/publish) must not
/// abort the primary flow. Each such call site names that decision by going
/// through this combinator instead of silently discarding the error.
pub trait LogAndContinue<T> {
    /// Log the error at warn level and carry on without a value.
    fn log_and_continue(self, context: &'static str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogAndContinue<T> for std::result::Result<T, E> {
    fn log_and_continue(self, context: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(error = %error, "{context}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_map_to_generic_500() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_log_and_continue_passes_ok_through() {
        let result: std::result::Result<i32, String> = Ok(7);
        assert_eq!(result.log_and_continue("should not log"), Some(7));
    }

    #[test]
    fn test_log_and_continue_swallows_err() {
        let result: std::result::Result<i32, String> = Err("nope".to_string());
        assert_eq!(result.log_and_continue("swallowed"), None);
    }
}
