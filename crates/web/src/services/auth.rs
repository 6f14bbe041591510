//! Authentication service holding both realm clients.
//!
//! Built once at startup after provider discovery and injected into request
//! handlers through the application state. A realm whose discovery or
//! configuration failed simply has no client; handlers query readiness
//! through [`AuthService::client`] instead of relying on startup timing.

use crewdesk_core::Realm;

use crate::config::AuthConfig;
use crate::oidc::OidcClient;

/// The two realm clients, either of which may be unavailable.
#[derive(Clone)]
pub struct AuthService {
    member: Option<OidcClient>,
    admin: Option<OidcClient>,
}

impl AuthService {
    /// Run provider discovery for every configured realm.
    ///
    /// Never fails: a realm whose discovery fails is left disabled and
    /// logged. Discovery itself is side-effect free, so calling this again
    /// at a later process start is always safe.
    pub async fn initialize(http: &reqwest::Client, config: &AuthConfig) -> Self {
        Self {
            member: discover_realm(http, Realm::Member, config.member.as_ref()).await,
            admin: discover_realm(http, Realm::Admin, config.admin.as_ref()).await,
        }
    }

    /// Build a service from already-constructed clients.
    #[must_use]
    pub const fn from_clients(member: Option<OidcClient>, admin: Option<OidcClient>) -> Self {
        Self { member, admin }
    }

    /// The client for a realm, if that realm is ready.
    #[must_use]
    pub const fn client(&self, realm: Realm) -> Option<&OidcClient> {
        match realm {
            Realm::Member => self.member.as_ref(),
            Realm::Admin => self.admin.as_ref(),
        }
    }

    /// Whether a realm's authentication capability is available.
    #[must_use]
    pub const fn is_ready(&self, realm: Realm) -> bool {
        self.client(realm).is_some()
    }
}

async fn discover_realm(
    http: &reqwest::Client,
    realm: Realm,
    config: Option<&crate::config::RealmAuthConfig>,
) -> Option<OidcClient> {
    let config = config?;

    match OidcClient::discover(http, config).await {
        Ok(client) => {
            tracing::info!(realm = %realm, issuer = client.issuer(), "realm authentication ready");
            Some(client)
        }
        Err(error) => {
            tracing::error!(realm = %realm, error = %error, "realm authentication disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_realms_are_not_ready() {
        let service = AuthService::from_clients(None, None);
        assert!(!service.is_ready(Realm::Member));
        assert!(!service.is_ready(Realm::Admin));
        assert!(service.client(Realm::Member).is_none());
    }
}
