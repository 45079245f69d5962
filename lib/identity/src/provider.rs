//! The identity provider capability.

use async_trait::async_trait;
use keyward_core::{CsrfState, Result};

use crate::claims::{IdentityClaims, TokenSet};
use crate::error::IdentityError;

/// Operations the login flow and session guard need from an OIDC provider.
///
/// Handlers receive an `Arc<dyn IdentityProvider>` so tests can substitute a
/// fake provider for the network-backed `OidcClient`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the provider authorization URL carrying `state`.
    ///
    /// Pure: the same state always yields the same URL.
    fn authorization_url(&self, state: &CsrfState) -> String;

    /// Exchanges a single-use authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, IdentityError>;

    /// Verifies the ID token in `tokens` and decodes its profile claims.
    async fn verify_identity_token(&self, tokens: &TokenSet)
    -> Result<IdentityClaims, IdentityError>;

    /// Re-verifies an access token held by an existing session.
    async fn verify_access_token(&self, access_token: &str)
    -> Result<IdentityClaims, IdentityError>;
}
