//! Session middleware configuration.
//!
//! Sessions live in process memory via tower-sessions; restarting the
//! server discards every login, which is the intended lifecycle. The
//! session cookie is signed with the configured session secret.

use secrecy::{ExposeSecret, SecretString};
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "crewdesk_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store and signed cookies.
#[must_use]
pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let store = MemoryStore::default();

    // Secure cookies whenever we are served over HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

/// Derive the cookie signing key from the session secret.
///
/// `Key::from` wants 64 bytes of master material; the configured secret is
/// guaranteed non-empty and at least 32 characters, so cycle it up to
/// length.
fn signing_key(secret: &SecretString) -> Key {
    let material: Vec<u8> = secret.expose_secret().bytes().cycle().take(64).collect();
    Key::from(&material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_accepts_minimum_length_secret() {
        let key = signing_key(&SecretString::from("a".repeat(32)));
        assert_eq!(key, signing_key(&SecretString::from("a".repeat(32))));
    }

    #[test]
    fn test_signing_key_differs_per_secret() {
        let a = signing_key(&SecretString::from("a".repeat(32)));
        let b = signing_key(&SecretString::from("b".repeat(32)));
        assert_ne!(a, b);
    }
}
