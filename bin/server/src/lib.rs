//! keyward web server.
//!
//! This crate wires the OIDC login flow and the session guard into an axum
//! router. The identity provider and the transient store are injected through
//! [`auth::AppState`], so the whole HTTP surface runs against fakes in tests.

pub mod app;
pub mod auth;
pub mod config;
