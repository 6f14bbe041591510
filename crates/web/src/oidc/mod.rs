//! OpenID Connect client.
//!
//! One instance exists per realm; the two are fully independent so an admin
//! token can never validate against the member client's secret or redirect
//! URI, and vice versa.
//!
//! # Flow
//!
//! 1. `discover()` resolves provider metadata once at startup
//! 2. `authorization_url()` builds the login redirect with state + nonce
//! 3. The provider redirects back with an authorization code
//! 4. `exchange_callback()` verifies state, exchanges the code, checks the
//!    id_token nonce, and fetches the userinfo claims

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::RealmAuthConfig;
use crate::models::AuthCorrelation;

/// Errors from the OIDC client.
#[derive(Debug, thiserror::Error)]
pub enum OidcError {
    /// Provider metadata could not be resolved; the realm stays disabled.
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// State or nonce mismatch, or the provider rejected the callback.
    #[error("callback verification failed: {0}")]
    CallbackVerification(String),

    /// Transport or provider failure during code exchange or userinfo fetch.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
}

/// Provider endpoints resolved through discovery.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

/// Userinfo claim set returned after a verified token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
}

/// Query parameters arriving on the OIDC callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
}

/// Client for one realm's identity provider.
#[derive(Clone)]
pub struct OidcClient {
    inner: Arc<OidcClientInner>,
}

struct OidcClientInner {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    metadata: ProviderMetadata,
}

impl OidcClient {
    /// Resolve provider metadata and build the client.
    ///
    /// Discovery is retried once; it has no side effects, so re-running it
    /// at process start is always safe.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Discovery`] if the metadata document cannot be
    /// fetched or parsed. The caller logs this and leaves the realm
    /// disabled; it is never fatal to the process.
    pub async fn discover(
        http: &reqwest::Client,
        config: &RealmAuthConfig,
    ) -> Result<Self, OidcError> {
        let url = format!(
            "{}/.well-known/openid-configuration",
            config.issuer_url.trim_end_matches('/')
        );

        let metadata = match fetch_metadata(http, &url).await {
            Ok(metadata) => metadata,
            Err(first) => {
                tracing::warn!(error = %first, "OIDC discovery failed, retrying once");
                fetch_metadata(http, &url).await.map_err(|_| first)?
            }
        };

        Ok(Self::from_metadata(http.clone(), config, metadata))
    }

    /// Build a client from already-resolved provider metadata.
    #[must_use]
    pub fn from_metadata(
        http: reqwest::Client,
        config: &RealmAuthConfig,
        metadata: ProviderMetadata,
    ) -> Self {
        Self {
            inner: Arc::new(OidcClientInner {
                http,
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri: config.redirect_uri.clone(),
                metadata,
            }),
        }
    }

    /// The provider issuer this client was built against.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.inner.metadata.issuer
    }

    /// Build the authorization URL for a login attempt.
    ///
    /// Deterministic given its inputs; `state` and `nonce` come back through
    /// the provider and are verified by [`Self::exchange_callback`].
    #[must_use]
    pub fn authorization_url(&self, state: &str, nonce: &str, scopes: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}&nonce={}",
            self.inner.metadata.authorization_endpoint,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(scopes),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    /// Verify a callback and exchange its code for userinfo claims.
    ///
    /// Consumes the correlation the caller removed from the session: the
    /// callback `state` must equal the stored state, and the id_token
    /// `nonce` claim must equal the stored nonce.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::CallbackVerification`] on state/nonce mismatch
    /// or provider rejection, [`OidcError::TokenExchange`] on transport or
    /// provider errors.
    pub async fn exchange_callback(
        &self,
        params: &CallbackParams,
        expected: &AuthCorrelation,
    ) -> Result<Claims, OidcError> {
        if let Some(error) = &params.error {
            let description = params.error_description.as_deref().unwrap_or_default();
            return Err(OidcError::CallbackVerification(format!(
                "provider rejected authorization: {error} {description}"
            )));
        }

        let state = params
            .state
            .as_deref()
            .ok_or_else(|| OidcError::CallbackVerification("missing state".to_string()))?;
        if state != expected.state {
            return Err(OidcError::CallbackVerification(
                "state mismatch".to_string(),
            ));
        }

        let code = params
            .code
            .as_deref()
            .ok_or_else(|| OidcError::CallbackVerification("missing code".to_string()))?;

        let token = self.exchange_code(code).await?;
        verify_nonce(token.id_token.as_deref(), &expected.nonce)?;

        self.fetch_userinfo(&token.access_token).await
    }

    /// Exchange an authorization code for tokens (client_secret_post).
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OidcError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", &self.inner.redirect_uri),
        ];

        let response = self
            .inner
            .http
            .post(&self.inner.metadata.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| OidcError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OidcError::TokenExchange(format!(
                "token endpoint returned {status}: {text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OidcError::TokenExchange(e.to_string()))
    }

    /// Fetch the userinfo claim set with an access token.
    async fn fetch_userinfo(&self, access_token: &str) -> Result<Claims, OidcError> {
        let response = self
            .inner
            .http
            .get(&self.inner.metadata.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OidcError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(OidcError::TokenExchange(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OidcError::TokenExchange(e.to_string()))
    }
}

async fn fetch_metadata(http: &reqwest::Client, url: &str) -> Result<ProviderMetadata, OidcError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| OidcError::Discovery(e.to_string()))?;

    if !response.status().is_success() {
        return Err(OidcError::Discovery(format!(
            "metadata endpoint returned {}",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| OidcError::Discovery(e.to_string()))
}

/// Check the `nonce` claim inside the id_token payload.
///
/// The token arrives over TLS directly from the token endpoint; the nonce
/// claim is what binds it to this particular login attempt.
fn verify_nonce(id_token: Option<&str>, expected: &str) -> Result<(), OidcError> {
    let token = id_token
        .ok_or_else(|| OidcError::CallbackVerification("missing id_token".to_string()))?;

    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| OidcError::CallbackVerification("malformed id_token".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| OidcError::CallbackVerification(format!("malformed id_token: {e}")))?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| OidcError::CallbackVerification(format!("malformed id_token: {e}")))?;

    match claims.get("nonce").and_then(serde_json::Value::as_str) {
        Some(nonce) if nonce == expected => Ok(()),
        _ => Err(OidcError::CallbackVerification(
            "nonce mismatch".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_config() -> RealmAuthConfig {
        RealmAuthConfig {
            issuer_url: "https://idp.example.com/realm".to_string(),
            client_id: "client-id".to_string(),
            client_secret: SecretString::from("client-secret"),
            redirect_uri: "https://app.example.com/index".to_string(),
        }
    }

    fn test_metadata() -> ProviderMetadata {
        ProviderMetadata {
            issuer: "https://idp.example.com/realm".to_string(),
            authorization_endpoint: "https://idp.example.com/authorize".to_string(),
            token_endpoint: "https://idp.example.com/token".to_string(),
            userinfo_endpoint: "https://idp.example.com/userinfo".to_string(),
        }
    }

    fn test_client() -> OidcClient {
        OidcClient::from_metadata(reqwest::Client::new(), &test_config(), test_metadata())
    }

    fn correlation() -> AuthCorrelation {
        AuthCorrelation {
            nonce: "N1".to_string(),
            state: "S1".to_string(),
        }
    }

    fn unsigned_id_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn test_authorization_url_embeds_correlation() {
        let url = test_client().authorization_url("S1", "N1", "openid email phone");
        assert!(url.starts_with("https://idp.example.com/authorize?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=S1"));
        assert!(url.contains("nonce=N1"));
        assert!(url.contains("scope=openid%20email%20phone"));
        // Deterministic given inputs
        assert_eq!(url, test_client().authorization_url("S1", "N1", "openid email phone"));
    }

    #[tokio::test]
    async fn test_callback_with_provider_error_is_rejected() {
        let params = CallbackParams {
            code: None,
            state: Some("S1".to_string()),
            error: Some("access_denied".to_string()),
            error_description: None,
        };
        let result = test_client().exchange_callback(&params, &correlation()).await;
        assert!(matches!(result, Err(OidcError::CallbackVerification(_))));
    }

    #[tokio::test]
    async fn test_callback_with_state_mismatch_is_rejected() {
        let params = CallbackParams {
            code: Some("abc".to_string()),
            state: Some("WRONG".to_string()),
            error: None,
            error_description: None,
        };
        let result = test_client().exchange_callback(&params, &correlation()).await;
        assert!(matches!(result, Err(OidcError::CallbackVerification(_))));
    }

    #[tokio::test]
    async fn test_callback_without_code_is_rejected() {
        let params = CallbackParams {
            code: None,
            state: Some("S1".to_string()),
            error: None,
            error_description: None,
        };
        let result = test_client().exchange_callback(&params, &correlation()).await;
        assert!(matches!(result, Err(OidcError::CallbackVerification(_))));
    }

    #[test]
    fn test_verify_nonce_accepts_match() {
        let token = unsigned_id_token(&serde_json::json!({ "sub": "u1", "nonce": "N1" }));
        assert!(verify_nonce(Some(&token), "N1").is_ok());
    }

    #[test]
    fn test_verify_nonce_rejects_mismatch() {
        let token = unsigned_id_token(&serde_json::json!({ "sub": "u1", "nonce": "N2" }));
        assert!(matches!(
            verify_nonce(Some(&token), "N1"),
            Err(OidcError::CallbackVerification(_))
        ));
    }

    #[test]
    fn test_verify_nonce_rejects_missing_token() {
        assert!(matches!(
            verify_nonce(None, "N1"),
            Err(OidcError::CallbackVerification(_))
        ));
    }
}
