//! Error types for the identity crate.

use std::fmt;

/// Errors from identity provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Configuration error (invalid URLs, HTTP client setup).
    Configuration { details: String },
    /// Failed to discover provider metadata or signing keys.
    Discovery { details: String },
    /// The authorization code could not be exchanged for tokens.
    TokenExchange { details: String },
    /// The token response carried no ID token.
    MissingIdToken,
    /// The token is not a well-formed JWT.
    MalformedToken { details: String },
    /// Signature or standard-claim validation failed.
    Verification { details: String },
    /// The access token was issued to a different client.
    ClientMismatch { authorized_party: Option<String> },
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { details } => write!(f, "OIDC configuration error: {details}"),
            Self::Discovery { details } => write!(f, "OIDC discovery error: {details}"),
            Self::TokenExchange { details } => write!(f, "OIDC token exchange error: {details}"),
            Self::MissingIdToken => write!(f, "no ID token in token response"),
            Self::MalformedToken { details } => write!(f, "malformed token: {details}"),
            Self::Verification { details } => {
                write!(f, "token verification failed: {details}")
            }
            Self::ClientMismatch { authorized_party } => match authorized_party {
                Some(azp) => write!(f, "token was issued to client '{azp}'"),
                None => write!(f, "token names no authorized party"),
            },
        }
    }
}

impl std::error::Error for IdentityError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_display_includes_details() {
        let err = IdentityError::Verification {
            details: "signature mismatch".to_string(),
        };
        assert!(err.to_string().contains("verification failed"));
        assert!(err.to_string().contains("signature mismatch"));
    }

    #[test]
    fn client_mismatch_display() {
        let err = IdentityError::ClientMismatch {
            authorized_party: Some("other-app".to_string()),
        };
        assert!(err.to_string().contains("other-app"));
        assert_eq!(
            IdentityError::ClientMismatch {
                authorized_party: None
            }
            .to_string(),
            "token names no authorized party"
        );
    }
}
