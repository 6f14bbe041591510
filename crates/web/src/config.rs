//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CREWDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `CREWDESK_BASE_URL` - Public URL for the portal
//!
//! ## Per realm (all four required for that realm's login to function;
//! missing values disable the realm but never crash the process)
//! - `OIDC_MEMBER_ISSUER_URL` / `OIDC_MEMBER_CLIENT_ID` /
//!   `OIDC_MEMBER_CLIENT_SECRET` / `OIDC_MEMBER_REDIRECT_URI`
//! - `OIDC_ADMIN_ISSUER_URL` / `OIDC_ADMIN_CLIENT_ID` /
//!   `OIDC_ADMIN_CLIENT_SECRET` / `OIDC_ADMIN_REDIRECT_URI`
//!
//! ## Optional
//! - `CREWDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `CREWDESK_PORT` - Listen port (default: 3000)
//! - `CREWDESK_SESSION_SECRET` - Session cookie signing secret (min 32
//!   chars); missing or short values fall back to a generated secret
//! - `CREWDESK_LOGOUT_REDIRECT` - Post-logout redirect target (default: /)
//! - `SNS_TOPIC_ARN` - Notification channel; absent disables notifications
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use rand::Rng;
use secrecy::SecretString;
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: String,
    /// Session cookie signing secret, at least 32 characters
    pub session_secret: SecretString,
    /// Per-realm identity provider configuration
    pub auth: AuthConfig,
    /// Notification channel identifier; `None` disables the pipeline
    pub topic_arn: Option<String>,
    /// Where to send the browser after logout
    pub logout_redirect: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Identity provider configuration for both realms.
///
/// A `None` realm means that realm's login capability is disabled; the rest
/// of the application keeps running.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub member: Option<RealmAuthConfig>,
    pub admin: Option<RealmAuthConfig>,
}

/// Identity provider configuration for one realm.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct RealmAuthConfig {
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

impl std::fmt::Debug for RealmAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealmAuthConfig")
            .field("issuer_url", &self.issuer_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    /// Incomplete realm or notification settings degrade those capabilities
    /// with a warning instead of failing the load.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the core variables (database, base URL,
    /// session secret, bind address) are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CREWDESK_DATABASE_URL")?;
        let host = get_env_or_default("CREWDESK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CREWDESK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CREWDESK_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CREWDESK_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("CREWDESK_BASE_URL")?;

        let session_secret = resolve_session_secret(get_optional_env("CREWDESK_SESSION_SECRET"));

        let auth = AuthConfig {
            member: RealmAuthConfig::from_env("OIDC_MEMBER"),
            admin: RealmAuthConfig::from_env("OIDC_ADMIN"),
        };

        let topic_arn = get_optional_env("SNS_TOPIC_ARN");
        if topic_arn.is_none() {
            tracing::warn!("SNS_TOPIC_ARN not set, task notifications disabled");
        }

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            auth,
            topic_arn,
            logout_redirect: get_env_or_default("CREWDESK_LOGOUT_REDIRECT", "/"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RealmAuthConfig {
    /// Load one realm's provider settings from `{prefix}_*` variables.
    ///
    /// Returns `None` when the realm is not (fully) configured. A partial
    /// configuration is logged so the gap is visible at startup.
    fn from_env(prefix: &str) -> Option<Self> {
        let issuer_url = get_optional_env(&format!("{prefix}_ISSUER_URL"));
        let client_id = get_optional_env(&format!("{prefix}_CLIENT_ID"));
        let client_secret = get_optional_env(&format!("{prefix}_CLIENT_SECRET"));
        let redirect_uri = get_optional_env(&format!("{prefix}_REDIRECT_URI"));

        match (issuer_url, client_id, client_secret, redirect_uri) {
            (Some(issuer_url), Some(client_id), Some(client_secret), Some(redirect_uri)) => {
                Some(Self {
                    issuer_url,
                    client_id,
                    client_secret: SecretString::from(client_secret),
                    redirect_uri,
                })
            }
            (None, None, None, None) => {
                tracing::warn!(realm = prefix, "realm not configured, login disabled");
                None
            }
            _ => {
                tracing::warn!(
                    realm = prefix,
                    "realm partially configured, login disabled; set all {prefix}_* variables"
                );
                None
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Resolve the session secret, degrading to a generated one.
///
/// Sessions are held in process memory and do not survive a restart, so a
/// generated secret only means the signing key changes with the sessions
/// it signs. A missing or short value therefore warns instead of failing
/// startup.
fn resolve_session_secret(value: Option<String>) -> SecretString {
    match value {
        Some(value) if value.len() >= MIN_SESSION_SECRET_LENGTH => SecretString::from(value),
        Some(value) => {
            tracing::warn!(
                length = value.len(),
                "CREWDESK_SESSION_SECRET shorter than {MIN_SESSION_SECRET_LENGTH} characters, using a generated secret"
            );
            generated_session_secret()
        }
        None => {
            tracing::warn!("CREWDESK_SESSION_SECRET not set, using a generated secret");
            generated_session_secret()
        }
    }
}

fn generated_session_secret() -> SecretString {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let secret: String = (0..2 * MIN_SESSION_SECRET_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            char::from(CHARSET[idx])
        })
        .collect();
    SecretString::from(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_resolve_session_secret_keeps_valid_value() {
        let secret = resolve_session_secret(Some("a".repeat(32)));
        assert_eq!(secret.expose_secret(), "a".repeat(32));
    }

    #[test]
    fn test_resolve_session_secret_replaces_short_value() {
        let secret = resolve_session_secret(Some("short".to_string()));
        assert_ne!(secret.expose_secret(), "short");
        assert!(secret.expose_secret().len() >= MIN_SESSION_SECRET_LENGTH);
    }

    #[test]
    fn test_resolve_session_secret_generates_when_missing() {
        let secret = resolve_session_secret(None);
        assert!(secret.expose_secret().len() >= MIN_SESSION_SECRET_LENGTH);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            auth: AuthConfig::default(),
            topic_arn: None,
            logout_redirect: "/".to_string(),
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_realm_config_debug_redacts_secret() {
        let config = RealmAuthConfig {
            issuer_url: "https://idp.example.com".to_string(),
            client_id: "client-id".to_string(),
            client_secret: SecretString::from("super_secret_value"),
            redirect_uri: "https://app.example.com/index".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("client-id"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));
    }
}
