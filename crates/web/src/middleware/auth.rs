//! Authentication state transitions and extractors.
//!
//! The session moves through three states: anonymous, pending (a login
//! handshake is in flight, keyed by its correlation), and authenticated.
//! Every transition goes through the helpers here so handlers never touch
//! raw session keys.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crewdesk_core::Realm;

use crate::models::{AuthCorrelation, Identity, session_keys};

/// Begin a login handshake: store the correlation, making the session
/// pending. Overwrites any previous pending handshake.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn begin_login(
    session: &Session,
    correlation: &AuthCorrelation,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CORRELATION, correlation)
        .await
}

/// Consume the pending correlation, if any.
///
/// Removal makes the correlation single-use: a replayed callback finds
/// nothing to verify against and is rejected.
pub async fn take_correlation(session: &Session) -> Option<AuthCorrelation> {
    session
        .remove(session_keys::CORRELATION)
        .await
        .ok()
        .flatten()
}

/// Complete a login: drop any leftover correlation and store the identity.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn complete_login(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<AuthCorrelation>(session_keys::CORRELATION)
        .await?;
    session.insert(session_keys::IDENTITY, identity).await
}

/// The authenticated identity, if any.
pub async fn current_identity(session: &Session) -> Option<Identity> {
    session.get(session_keys::IDENTITY).await.ok().flatten()
}

/// Return to anonymous: destroy the whole session, not just the identity.
///
/// # Errors
///
/// Returns an error if the session store rejects the flush.
pub async fn logout(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to the public landing page.
    RedirectHome,
    /// Authenticated but lacking the required role.
    Forbidden,
    /// Session layer missing entirely.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Extractor that requires an authenticated identity of any role.
///
/// Anonymous requests are redirected to the landing page.
pub struct RequireAuth(pub Identity);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let identity = current_identity(session)
            .await
            .ok_or(AuthRejection::RedirectHome)?;

        Ok(Self(identity))
    }
}

/// Extractor that requires an identity established through the admin realm.
///
/// A member identity on an admin route is a role violation and gets a 403
/// rather than a redirect loop through the member login.
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(identity) = RequireAuth::from_request_parts(parts, state).await?;

        if identity.role != Realm::Admin {
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(identity))
    }
}

/// Extractor that optionally reads the current identity.
///
/// Never rejects; anonymous requests simply carry `None`.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = match parts.extensions.get::<Session>() {
            Some(session) => current_identity(session).await,
            None => None,
        };

        Ok(Self(identity))
    }
}
