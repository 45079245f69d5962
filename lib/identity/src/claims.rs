//! Tokens and claims exchanged with the identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Tokens returned by a successful authorization code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSet {
    /// Bearer access token.
    pub access_token: String,
    /// Raw (still unverified) ID token JWT, if the provider returned one.
    pub id_token: Option<String>,
    /// Refresh token, if issued. Not used for refresh; kept for completeness.
    pub refresh_token: Option<String>,
    /// Access token lifetime reported by the provider.
    pub expires_in: Option<Duration>,
}

impl TokenSet {
    /// Creates a token set with only an access token.
    #[must_use]
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            id_token: None,
            refresh_token: None,
            expires_in: None,
        }
    }

    /// Sets the raw ID token.
    #[must_use]
    pub fn with_id_token(mut self, id_token: Option<String>) -> Self {
        self.id_token = id_token;
        self
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Claims decoded from a verified ID or access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// The subject claim (unique user identifier at the provider).
    pub subject: String,
    /// The issuer URL.
    pub issuer: String,
    /// `preferred_username`, falling back to the subject.
    pub username: String,
    /// Email address, if released by the provider.
    pub email: Option<String>,
    /// Realm roles (`realm_access.roles`), empty when absent.
    pub roles: Vec<String>,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

impl IdentityClaims {
    /// Returns true if the claims carry the given realm role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
