//! OIDC client implementation using the openidconnect crate.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use keyward_core::{CsrfState, Result};
use openidconnect::core::{CoreClient, CoreIdToken, CoreIdTokenClaims, CoreProviderMetadata};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, IssuerUrl, Nonce, OAuth2TokenResponse,
    RedirectUrl, TokenResponse,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::claims::{IdentityClaims, TokenSet};
use crate::config::OidcConfig;
use crate::error::IdentityError;
use crate::provider::IdentityProvider;

/// OIDC client for authenticating users.
///
/// Provider metadata and signing keys are fetched once by [`OidcClient::discover`]
/// and never mutated afterwards.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    http_client: reqwest::Client,
    config: OidcConfig,
}

/// Keycloak places realm roles under `realm_access.roles`.
#[derive(Deserialize)]
struct RolesPayload {
    realm_access: Option<RealmAccess>,
}

#[derive(Deserialize)]
struct RealmAccess {
    #[serde(default)]
    roles: Vec<String>,
}

/// No nonce is sent with the authorization request, so none is checked.
fn accept_without_nonce(_nonce: Option<&Nonce>) -> std::result::Result<(), String> {
    Ok(())
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the provider metadata.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for invalid URLs and `Discovery` when the
    /// provider is unreachable or its metadata is unusable.
    #[instrument(skip_all, fields(issuer = %config.issuer_url()))]
    pub async fn discover(config: OidcConfig) -> Result<Self, IdentityError> {
        let issuer_url =
            IssuerUrl::new(config.issuer_url()).map_err(|e| IdentityError::Configuration {
                details: format!("invalid issuer URL: {e}"),
            })?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| IdentityError::Configuration {
                details: format!("failed to create HTTP client: {e}"),
            })?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| IdentityError::Discovery {
                details: format!("failed to discover provider: {e}"),
            })?;

        if provider_metadata.token_endpoint().is_none() {
            return Err(IdentityError::Discovery {
                details: "provider metadata has no token endpoint".to_string(),
            }
            .into());
        }

        let redirect_url = RedirectUrl::new(config.redirect_uri().to_string()).map_err(|e| {
            IdentityError::Configuration {
                details: format!("invalid redirect URI: {e}"),
            }
        })?;

        let client_id = ClientId::new(config.client_id().to_string());
        let client_secret = ClientSecret::new(config.client_secret().to_string());

        debug!(
            signing_keys = provider_metadata.jwks().keys().len(),
            "discovered OIDC provider"
        );

        Ok(Self {
            provider_metadata,
            client_id,
            client_secret,
            redirect_url,
            http_client,
            config,
        })
    }

    /// Generates the authorization URL for redirecting the user.
    pub fn authorization_url(&self, state: &CsrfState) -> String {
        let mut url = self.provider_metadata.authorization_endpoint().url().clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id())
            .append_pair("redirect_uri", self.config.redirect_uri())
            .append_pair("scope", &self.config.scope_param())
            .append_pair("state", state.as_str());
        url.to_string()
    }

    /// Exchanges the authorization code for tokens. Never retried.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, IdentityError> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| IdentityError::TokenExchange {
                details: format!("token endpoint error: {e}"),
            })?
            .request_async(&self.http_client)
            .await
            .map_err(|e| IdentityError::TokenExchange {
                details: format!("token exchange failed: {e}"),
            })?;

        Ok(TokenSet {
            access_token: token_response.access_token().secret().clone(),
            id_token: token_response.id_token().map(|t| t.to_string()),
            refresh_token: token_response.refresh_token().map(|t| t.secret().clone()),
            expires_in: token_response.expires_in(),
        })
    }

    /// Verifies the ID token from a token exchange and extracts claims.
    #[instrument(skip_all)]
    pub fn verify_identity_token(
        &self,
        tokens: &TokenSet,
    ) -> Result<IdentityClaims, IdentityError> {
        let raw = tokens
            .id_token
            .as_deref()
            .ok_or(IdentityError::MissingIdToken)?;
        self.verify_jwt(raw, true)
    }

    /// Re-verifies an access token held by an existing session.
    ///
    /// The audience check is relaxed because providers issue access tokens
    /// for resource servers, not for this client. When
    /// `bind_access_token_to_client` is set, the token's authorized party
    /// must be this client instead.
    #[instrument(skip_all)]
    pub fn verify_access_token(
        &self,
        access_token: &str,
    ) -> Result<IdentityClaims, IdentityError> {
        self.verify_jwt(access_token, false)
    }

    fn verify_jwt(
        &self,
        raw: &str,
        audience_required: bool,
    ) -> Result<IdentityClaims, IdentityError> {
        let token = raw
            .parse::<CoreIdToken>()
            .map_err(|e| IdentityError::MalformedToken {
                details: e.to_string(),
            })?;

        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        );
        let verifier = client
            .id_token_verifier()
            .require_audience_match(audience_required);

        let claims = token
            .claims(&verifier, accept_without_nonce)
            .map_err(|e| IdentityError::Verification {
                details: e.to_string(),
            })?;

        if !audience_required && self.config.bind_access_token_to_client() {
            let azp = claims.authorized_party().map(|c| c.as_str());
            if azp != Some(self.config.client_id()) {
                return Err(IdentityError::ClientMismatch {
                    authorized_party: azp.map(str::to_string),
                }
                .into());
            }
        }

        Ok(identity_claims(claims, realm_roles(raw)))
    }
}

fn identity_claims(claims: &CoreIdTokenClaims, roles: Vec<String>) -> IdentityClaims {
    let subject = claims.subject().to_string();
    let username = claims
        .preferred_username()
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| subject.clone());

    IdentityClaims {
        issuer: claims.issuer().to_string(),
        email: claims.email().map(|e| e.as_str().to_string()),
        expires_at: claims.expiration(),
        subject,
        username,
        roles,
    }
}

/// Reads realm roles from a JWT whose signature has already been verified.
fn realm_roles(jwt: &str) -> Vec<String> {
    let Some(payload) = jwt.split('.').nth(1) else {
        return Vec::new();
    };
    URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<RolesPayload>(&bytes).ok())
        .and_then(|p| p.realm_access)
        .map(|access| access.roles)
        .unwrap_or_default()
}

#[async_trait]
impl IdentityProvider for OidcClient {
    fn authorization_url(&self, state: &CsrfState) -> String {
        OidcClient::authorization_url(self, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, IdentityError> {
        OidcClient::exchange_code(self, code).await
    }

    async fn verify_identity_token(
        &self,
        tokens: &TokenSet,
    ) -> Result<IdentityClaims, IdentityError> {
        OidcClient::verify_identity_token(self, tokens)
    }

    async fn verify_access_token(
        &self,
        access_token: &str,
    ) -> Result<IdentityClaims, IdentityError> {
        OidcClient::verify_access_token(self, access_token)
    }
}
