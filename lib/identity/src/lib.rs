//! OpenID Connect identity provider client for keyward.
//!
//! This crate provides:
//! - Provider configuration (`OidcConfig`)
//! - The `IdentityProvider` capability used by the login flow and session guard
//! - `OidcClient`, the `openidconnect`-backed implementation
//!
//! The client discovers provider metadata and signing keys once at startup;
//! after that it is an immutable handle shared by every request.

pub mod claims;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;

pub use claims::{IdentityClaims, TokenSet};
pub use client::OidcClient;
pub use config::{OidcConfig, OidcConfigBuilder};
pub use error::IdentityError;
pub use provider::IdentityProvider;
