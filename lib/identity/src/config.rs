//! OIDC (OpenID Connect) provider configuration.
//!
//! Keycloak-style providers expose one issuer per realm, so the issuer URL is
//! derived from the provider's base address and the realm name.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the OIDC identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// Base address of the provider (e.g., "https://auth.example.com").
    base_url: String,
    /// Realm (tenant) on the provider.
    realm: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URI for the OAuth2 callback (e.g., "https://app.example.com/auth/callback").
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,profile,email,roles"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Timeout for each request to the provider, in seconds.
    #[serde(default = "default_http_timeout_seconds")]
    http_timeout_seconds: u64,
    /// Whether session re-verification requires the access token's authorized
    /// party (`azp`) to be this client.
    #[serde(default = "default_bind_access_token_to_client")]
    bind_access_token_to_client: bool,
}

fn default_scopes() -> String {
    "openid,profile,email,roles".to_string()
}

fn default_http_timeout_seconds() -> u64 {
    10
}

fn default_bind_access_token_to_client() -> bool {
    true
}

impl OidcConfig {
    /// Creates a new OIDC configuration with defaults for optional fields.
    #[must_use]
    pub fn new(
        base_url: String,
        realm: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            base_url,
            realm,
            client_id,
            client_secret,
            redirect_uri,
            scopes: default_scopes(),
            http_timeout_seconds: default_http_timeout_seconds(),
            bind_access_token_to_client: default_bind_access_token_to_client(),
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(
        base_url: String,
        realm: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> OidcConfigBuilder {
        OidcConfigBuilder::new(base_url, realm, client_id, client_secret, redirect_uri)
    }

    /// Returns the realm name.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns the issuer URL used for discovery: `<base_url>/realms/<realm>`.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        format!("{}/realms/{}", self.base_url.trim_end_matches('/'), self.realm)
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the `scope` request parameter: `openid` first, then every
    /// other configured scope once, space-separated.
    #[must_use]
    pub fn scope_param(&self) -> String {
        let mut scopes = vec!["openid"];
        for scope in self.scopes() {
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        scopes.join(" ")
    }

    /// Returns the timeout applied to each provider request.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Returns whether access tokens must name this client as authorized party.
    #[must_use]
    pub fn bind_access_token_to_client(&self) -> bool {
        self.bind_access_token_to_client
    }

    /// Returns the names of required fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("base_url", &self.base_url),
            ("realm", &self.realm),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Builder for `OidcConfig`.
#[derive(Debug)]
pub struct OidcConfigBuilder {
    config: OidcConfig,
    scopes: Vec<String>,
}

impl OidcConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(
        base_url: String,
        realm: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        let config = OidcConfig::new(base_url, realm, client_id, client_secret, redirect_uri);
        let scopes = config.scopes().into_iter().map(str::to_string).collect();
        Self { config, scopes }
    }

    /// Sets the OAuth2 scopes to request.
    #[must_use]
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Adds a scope to the list of scopes to request.
    #[must_use]
    pub fn add_scope(mut self, scope: String) -> Self {
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
        self
    }

    /// Sets the provider request timeout in seconds.
    #[must_use]
    pub fn http_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.http_timeout_seconds = seconds;
        self
    }

    /// Sets whether access tokens must be bound to this client.
    #[must_use]
    pub fn bind_access_token_to_client(mut self, bind: bool) -> Self {
        self.config.bind_access_token_to_client = bind;
        self
    }

    /// Builds the `OidcConfig`.
    #[must_use]
    pub fn build(self) -> OidcConfig {
        OidcConfig {
            scopes: self.scopes.join(","),
            ..self.config
        }
    }
}
