//! OpenID Connect login, callback and logout handlers for both realms.
//!
//! The member and admin flows are the same handshake against different
//! providers, so each handler pair is a thin wrapper over a shared
//! realm-parameterized function. Every failure along the way turns into a
//! redirect back to the landing page with an error flag; provider error
//! details never reach the browser.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crewdesk_core::Realm;

use crate::error::LogAndContinue;
use crate::middleware::auth::{begin_login, complete_login, logout, take_correlation};
use crate::models::{AuthCorrelation, Identity, NewMember};
use crate::oidc::CallbackParams;
use crate::state::AppState;

/// Scopes requested on every authorization redirect.
const SCOPES: &str = "openid email phone";

/// Initiate member login.
///
/// # Route
///
/// `GET /login`
pub async fn member_login(State(state): State<AppState>, session: Session) -> Response {
    initiate_login(&state, &session, Realm::Member).await
}

/// Initiate admin login.
///
/// # Route
///
/// `GET /admin/login`
pub async fn admin_login(State(state): State<AppState>, session: Session) -> Response {
    initiate_login(&state, &session, Realm::Admin).await
}

/// Handle the member realm callback.
///
/// # Route
///
/// `GET /index`
pub async fn member_callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Response {
    handle_callback(&state, &session, Realm::Member, &params).await
}

/// Handle the admin realm callback.
///
/// # Route
///
/// `GET /admin/index`
pub async fn admin_callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Response {
    handle_callback(&state, &session, Realm::Admin, &params).await
}

/// Destroy the session and leave.
///
/// Safe to call anonymously; the outcome is the same either way.
///
/// # Routes
///
/// `GET /logout`, `GET /admin/logout`
pub async fn sign_out(State(state): State<AppState>, session: Session) -> Response {
    let _ = logout(&session)
        .await
        .log_and_continue("session flush on logout failed");
    Redirect::to(&state.config().logout_redirect).into_response()
}

/// Where a realm's failed login attempt lands.
const fn fallback(realm: Realm) -> &'static str {
    match realm {
        Realm::Member => "/?error=login_failed",
        Realm::Admin => "/?error=admin_login_failed",
    }
}

/// Where a realm's successful login lands.
const fn destination(realm: Realm) -> &'static str {
    match realm {
        Realm::Member => "/",
        Realm::Admin => "/admin/dashboard",
    }
}

async fn initiate_login(state: &AppState, session: &Session, realm: Realm) -> Response {
    let Some(client) = state.auth().client(realm) else {
        tracing::warn!(realm = %realm, "login requested but realm is not configured");
        return Redirect::to("/?error=login_unavailable").into_response();
    };

    let correlation = AuthCorrelation::generate();
    if let Err(error) = begin_login(session, &correlation).await {
        tracing::error!(realm = %realm, error = %error, "failed to store login correlation");
        return Redirect::to(fallback(realm)).into_response();
    }

    let url = client.authorization_url(&correlation.state, &correlation.nonce, SCOPES);
    Redirect::to(&url).into_response()
}

async fn handle_callback(
    state: &AppState,
    session: &Session,
    realm: Realm,
    params: &CallbackParams,
) -> Response {
    let Some(client) = state.auth().client(realm) else {
        tracing::warn!(realm = %realm, "callback received but realm is not configured");
        return Redirect::to(fallback(realm)).into_response();
    };

    // Single use: a replayed callback finds no correlation and is rejected.
    let Some(correlation) = take_correlation(session).await else {
        tracing::warn!(realm = %realm, "callback without a pending login");
        return Redirect::to(fallback(realm)).into_response();
    };

    let claims = match client.exchange_callback(params, &correlation).await {
        Ok(claims) => claims,
        Err(error) => {
            tracing::warn!(realm = %realm, error = %error, "callback verification failed");
            return Redirect::to(fallback(realm)).into_response();
        }
    };

    let identity = Identity::from_claims(claims, realm);

    if realm == Realm::Member {
        register_member(state, &identity).await;
    }

    if let Err(error) = complete_login(session, &identity).await {
        tracing::error!(realm = %realm, error = %error, "failed to store identity in session");
        return Redirect::to(fallback(realm)).into_response();
    }

    tracing::info!(realm = %realm, subject = %identity.subject, "login completed");
    Redirect::to(destination(realm)).into_response()
}

/// Register a freshly authenticated member, best-effort.
///
/// Registration failure never blocks the login: the session identity comes
/// from the provider, not from our row.
async fn register_member(state: &AppState, identity: &Identity) {
    let Some(member) = NewMember::from_identity(identity) else {
        tracing::warn!(subject = %identity.subject, "identity has no email, skipping registration");
        return;
    };

    if let Some(outcome) = state
        .members()
        .upsert_if_absent(&member)
        .await
        .log_and_continue("member registration failed")
    {
        tracing::info!(email = %member.email, outcome = ?outcome, "member registration");
    }
}
