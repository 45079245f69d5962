//! Authentication for the keyward server.
//!
//! This module provides:
//! - The OIDC authorization code flow (`/auth/login`, `/auth/callback`)
//! - Store-backed sessions carried by a `session_id` cookie
//! - The session guard, as middleware and as an extractor
//!
//! # Session model
//!
//! A session is a record in the transient store holding the access token the
//! provider issued at login. Every protected request re-verifies that token,
//! so revocation at the provider takes effect on the next request rather than
//! when the store TTL runs out.

pub mod cookies;
pub mod flow;
pub mod guard;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod testing;

pub use flow::{AuthFlow, CallbackParams, FlowError, IssuedSession};
pub use guard::{AuthenticatedSession, GuardRejection, SessionGuard};
pub use middleware::{AuthRejection, require_session};
pub use routes::{callback, login};

use crate::config::SessionConfig;
use keyward_identity::IdentityProvider;
use keyward_store::{
    CsrfStateStore, SessionRepository, SessionStore, StateRepository, TransientStore,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Login flow controller.
    pub flow: AuthFlow,
    /// Guard for protected routes.
    pub guard: SessionGuard,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates application state with both capability stores over one backend.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn TransientStore>,
        session_config: SessionConfig,
    ) -> Self {
        let states: Arc<dyn CsrfStateStore> = Arc::new(StateRepository::new(
            store.clone(),
            session_config.state_ttl(),
        ));
        let sessions: Arc<dyn SessionStore> = Arc::new(SessionRepository::new(
            store,
            session_config.session_ttl(),
        ));
        Self::from_parts(provider, states, sessions, session_config)
    }

    /// Creates application state from separately supplied stores.
    pub fn from_parts(
        provider: Arc<dyn IdentityProvider>,
        states: Arc<dyn CsrfStateStore>,
        sessions: Arc<dyn SessionStore>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            flow: AuthFlow::new(provider.clone(), states, sessions.clone()),
            guard: SessionGuard::new(provider, sessions),
            session_config,
        }
    }
}
