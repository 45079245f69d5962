//! The authorization code flow: login initiation and callback handling.
//!
//! A login attempt keeps no in-process state between the two browser round
//! trips. The CSRF state token lives in the store until the callback consumes
//! it, and the session record is written only once every earlier step has
//! succeeded, so an abandoned or cancelled callback never leaves a session
//! behind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use keyward_core::{CsrfState, SessionId};
use keyward_identity::{IdentityClaims, IdentityProvider, TokenSet};
use keyward_store::{CsrfStateStore, SessionRecord, SessionStore, UserInfo};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Query parameters the provider sends to the callback. Every field is
/// optional; the flow decides what a missing one means.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// A session created by a completed callback.
#[derive(Debug)]
pub struct IssuedSession {
    pub session_id: SessionId,
    pub record: SessionRecord,
}

/// Errors that terminate a login attempt.
#[derive(Debug)]
pub enum FlowError {
    /// The OS random source failed.
    Entropy(String),
    /// The callback carried no `state` parameter.
    MissingState,
    /// The state was never issued, expired, or was already consumed.
    UnknownState,
    /// The stored value does not match the supplied state.
    StateMismatch,
    /// The provider redirected back with an error instead of a code.
    ProviderDenied {
        error: String,
        description: Option<String>,
    },
    /// The callback carried no `code` parameter.
    MissingCode,
    /// The code could not be exchanged for tokens.
    TokenExchange(String),
    /// The ID token failed verification.
    IdentityVerification(String),
    /// The store failed while handling CSRF state.
    StateStore(String),
    /// The store failed while persisting the session.
    SessionStore(String),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entropy(e) => write!(f, "entropy failure: {e}"),
            Self::MissingState => write!(f, "callback is missing the state parameter"),
            Self::UnknownState => write!(f, "state not found"),
            Self::StateMismatch => write!(f, "state mismatch"),
            Self::ProviderDenied { error, description } => match description {
                Some(description) => write!(f, "provider returned {error}: {description}"),
                None => write!(f, "provider returned {error}"),
            },
            Self::MissingCode => write!(f, "callback is missing the code parameter"),
            Self::TokenExchange(e) => write!(f, "token exchange failed: {e}"),
            Self::IdentityVerification(e) => write!(f, "identity verification failed: {e}"),
            Self::StateStore(e) => write!(f, "state store failure: {e}"),
            Self::SessionStore(e) => write!(f, "session store failure: {e}"),
        }
    }
}

impl std::error::Error for FlowError {}

impl FlowError {
    /// HTTP status presented to the browser.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingState | Self::UnknownState | Self::StateMismatch | Self::MissingCode => {
                StatusCode::BAD_REQUEST
            }
            Self::ProviderDenied { .. } => StatusCode::UNAUTHORIZED,
            Self::Entropy(_)
            | Self::TokenExchange(_)
            | Self::IdentityVerification(_)
            | Self::StateStore(_)
            | Self::SessionStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::BAD_REQUEST => {
                warn!(error = %self, "Rejected login callback");
                "Invalid login request. Please start the login again."
            }
            StatusCode::UNAUTHORIZED => {
                warn!(error = %self, "Login denied by identity provider");
                "Login was not completed."
            }
            _ => {
                tracing::error!(error = %self, "Login failed");
                "Login failed. Please try again later."
            }
        };
        (status, message).into_response()
    }
}

/// Drives both phases of the authorization code flow.
pub struct AuthFlow {
    provider: Arc<dyn IdentityProvider>,
    states: Arc<dyn CsrfStateStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthFlow {
    /// Creates a flow controller over the given provider and stores.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        states: Arc<dyn CsrfStateStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            provider,
            states,
            sessions,
        }
    }

    /// Phase A: issues a CSRF state and returns the provider's authorization URL.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::StateStore` if the state cannot be persisted. No
    /// URL is produced in that case.
    #[instrument(skip_all)]
    pub async fn begin_login(&self) -> Result<String, FlowError> {
        let state = CsrfState::generate().map_err(|e| FlowError::Entropy(e.to_string()))?;
        self.states
            .put_state(&state)
            .await
            .map_err(|e| FlowError::StateStore(e.to_string()))?;
        Ok(self.provider.authorization_url(&state))
    }

    /// Phase B: validates the callback, exchanges the code, verifies the
    /// identity and issues a session.
    ///
    /// Steps run strictly in order and stop at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the `FlowError` of the first step that failed.
    #[instrument(skip_all)]
    pub async fn complete_callback(
        &self,
        params: &CallbackParams,
    ) -> Result<IssuedSession, FlowError> {
        self.consume_state(params.state.as_deref()).await?;

        if let Some(error) = &params.error {
            return Err(FlowError::ProviderDenied {
                error: error.clone(),
                description: params.error_description.clone(),
            });
        }

        let tokens = self.exchange_code(params.code.as_deref()).await?;
        let claims = self
            .provider
            .verify_identity_token(&tokens)
            .await
            .map_err(|e| FlowError::IdentityVerification(e.to_string()))?;

        self.issue_session(tokens, claims).await
    }

    async fn consume_state(&self, state: Option<&str>) -> Result<(), FlowError> {
        let state = state
            .filter(|s| !s.is_empty())
            .ok_or(FlowError::MissingState)?;

        let stored = self
            .states
            .take_state(state)
            .await
            .map_err(|e| FlowError::StateStore(e.to_string()))?
            .ok_or(FlowError::UnknownState)?;

        if stored != state {
            return Err(FlowError::StateMismatch);
        }
        Ok(())
    }

    async fn exchange_code(&self, code: Option<&str>) -> Result<TokenSet, FlowError> {
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or(FlowError::MissingCode)?;
        self.provider
            .exchange_code(code)
            .await
            .map_err(|e| FlowError::TokenExchange(e.to_string()))
    }

    async fn issue_session(
        &self,
        tokens: TokenSet,
        claims: IdentityClaims,
    ) -> Result<IssuedSession, FlowError> {
        let session_id = SessionId::generate().map_err(|e| FlowError::Entropy(e.to_string()))?;
        let user_info = UserInfo::new(claims.username, claims.email.unwrap_or_default());
        let record = SessionRecord::new(tokens.access_token, user_info);

        self.sessions
            .put_session(&session_id, &record)
            .await
            .map_err(|e| FlowError::SessionStore(e.to_string()))?;

        info!(username = %record.user_info.username, "Session issued");
        Ok(IssuedSession { session_id, record })
    }
}
