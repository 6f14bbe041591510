//! Session-stored authentication types.
//!
//! The session moves through three states: anonymous (neither key set),
//! pending (correlation stored by a login initiation), and authenticated
//! (identity stored by a verified callback). The transition helpers live in
//! [`crate::middleware::auth`]; this module owns the types and keys.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crewdesk_core::{Email, MemberId, Realm};

use crate::oidc::Claims;

/// Length of generated nonce and state values.
const CORRELATION_LENGTH: usize = 32;

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            char::from(CHARSET[idx])
        })
        .collect()
}

/// Single-use correlation values binding a login attempt to its callback.
///
/// Generated fresh per login initiation, stored in the session, and removed
/// by the matching callback. `state` protects against CSRF, `nonce` against
/// token replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCorrelation {
    pub nonce: String,
    pub state: String,
}

impl AuthCorrelation {
    /// Generate fresh correlation values for a new login attempt.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            nonce: generate_random_string(CORRELATION_LENGTH),
            state: generate_random_string(CORRELATION_LENGTH),
        }
    }
}

/// The authenticated identity held by the session.
///
/// Presence of an `Identity` is what makes a session authenticated; the
/// role is always set because construction goes through [`Identity::from_claims`]
/// with the realm that verified the callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Stable provider-issued subject.
    pub subject: MemberId,
    pub email: Option<Email>,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    /// The realm this identity authenticated against.
    pub role: Realm,
}

impl Identity {
    /// Build an identity from verified userinfo claims.
    #[must_use]
    pub fn from_claims(claims: Claims, realm: Realm) -> Self {
        Self {
            subject: MemberId::new(claims.sub),
            email: claims.email.as_deref().and_then(|e| Email::parse(e).ok()),
            display_name: claims.username,
            phone_number: claims.phone_number,
            role: realm,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the pending login correlation (nonce + state).
    pub const CORRELATION: &str = "auth_correlation";

    /// Key for the authenticated identity.
    pub const IDENTITY: &str = "identity";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_distinct_values() {
        let a = AuthCorrelation::generate();
        let b = AuthCorrelation::generate();
        assert_eq!(a.nonce.len(), CORRELATION_LENGTH);
        assert_eq!(a.state.len(), CORRELATION_LENGTH);
        assert_ne!(a.nonce, a.state);
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn test_identity_from_claims_sets_role() {
        let claims = Claims {
            sub: "u1".to_string(),
            email: Some("a@x.com".to_string()),
            username: Some("alice".to_string()),
            phone_number: None,
        };
        let identity = Identity::from_claims(claims, Realm::Member);
        assert_eq!(identity.role, Realm::Member);
        assert_eq!(identity.subject.as_str(), "u1");
        assert_eq!(identity.email.as_ref().map(ToString::to_string).as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_identity_tolerates_invalid_email_claim() {
        let claims = Claims {
            sub: "u2".to_string(),
            email: Some("not-an-email".to_string()),
            username: None,
            phone_number: None,
        };
        let identity = Identity::from_claims(claims, Realm::Admin);
        assert!(identity.email.is_none());
        assert_eq!(identity.role, Realm::Admin);
    }
}
