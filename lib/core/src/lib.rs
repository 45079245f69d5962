//! Core types and utilities for keyward.
//!
//! This crate provides the error-handling foundation and the opaque secret
//! values (CSRF state tokens and session identifiers) shared by the store,
//! identity, and server crates.

pub mod error;
pub mod secret;

pub use error::Result;
pub use secret::{CsrfState, SecretError, SessionId};
