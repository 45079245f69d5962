//! Opaque random secrets handed to the browser.
//!
//! Both CSRF state tokens and session identifiers are 32 bytes from the
//! operating system's CSPRNG, encoded as unpadded URL-safe base64. They are
//! distinct types so one can never be passed where the other is expected.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fmt;
use std::str::FromStr;

/// Number of random bytes in every secret (256 bits).
pub const SECRET_BYTES: usize = 32;

/// Errors from generating or parsing a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// The operating system could not supply random bytes.
    Entropy { details: String },
    /// The string is not a valid encoding of a secret.
    Malformed { secret_type: &'static str, reason: String },
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entropy { details } => write!(f, "failed to gather entropy: {details}"),
            Self::Malformed {
                secret_type,
                reason,
            } => write!(f, "malformed {secret_type}: {reason}"),
        }
    }
}

impl std::error::Error for SecretError {}

fn random_encoded() -> Result<String, SecretError> {
    let mut bytes = [0u8; SECRET_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| SecretError::Entropy {
        details: e.to_string(),
    })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn validate_encoded(secret_type: &'static str, s: &str) -> Result<(), SecretError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| SecretError::Malformed {
            secret_type,
            reason: e.to_string(),
        })?;
    if decoded.len() != SECRET_BYTES {
        return Err(SecretError::Malformed {
            secret_type,
            reason: format!("expected {SECRET_BYTES} bytes, got {}", decoded.len()),
        });
    }
    Ok(())
}

/// Macro to generate a strongly-typed wrapper around an encoded secret.
macro_rules! define_secret {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh secret from the OS random source.
            ///
            /// # Errors
            ///
            /// Returns an error if the OS cannot supply random bytes.
            pub fn generate() -> Result<Self, SecretError> {
                random_encoded().map(Self)
            }

            /// Returns the encoded secret.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Decodes the secret back into its raw bytes.
            #[must_use]
            pub fn to_bytes(&self) -> Vec<u8> {
                // Construction guarantees a valid encoding.
                URL_SAFE_NO_PAD.decode(&self.0).unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let visible = self.0.get(..6).unwrap_or_default();
                write!(f, "{}({visible}…)", stringify!($name))
            }
        }

        impl FromStr for $name {
            type Err = SecretError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_encoded(stringify!($name), s)?;
                Ok(Self(s.to_string()))
            }
        }
    };
}

define_secret!(
    /// Single-use token binding an OIDC callback to the login that started it.
    CsrfState
);

define_secret!(
    /// Identifier of a server-side session, carried in the session cookie.
    SessionId
);
