//! The session guard in front of protected resources.

use keyward_core::SessionId;
use keyward_identity::{IdentityClaims, IdentityProvider};
use keyward_store::{SessionRecord, SessionStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Request context handed to protected handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session_id: SessionId,
    pub record: SessionRecord,
    pub claims: IdentityClaims,
}

/// Why a request did not get through the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// No session cookie.
    NotAuthenticated,
    /// The cookie names no live session, or is not a session identifier.
    SessionMissing,
    /// The session's access token no longer verifies. The record is gone.
    SessionInvalid,
    /// The store could not be consulted.
    Unavailable,
}

impl GuardRejection {
    /// Whether the browser should drop its session cookie.
    #[must_use]
    pub fn clears_cookie(self) -> bool {
        matches!(self, Self::SessionMissing | Self::SessionInvalid)
    }
}

/// Resolves a session cookie to an authenticated session.
pub struct SessionGuard {
    provider: Arc<dyn IdentityProvider>,
    sessions: Arc<dyn SessionStore>,
}

impl SessionGuard {
    /// Creates a guard over the given provider and session store.
    pub fn new(provider: Arc<dyn IdentityProvider>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { provider, sessions }
    }

    /// Runs the guard for one request given the session cookie value, if any.
    ///
    /// A session whose access token fails re-verification, or whose record
    /// no longer decodes, is deleted before the rejection is returned.
    ///
    /// # Errors
    ///
    /// Returns the `GuardRejection` for the first gate the request failed.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        cookie: Option<&str>,
    ) -> Result<AuthenticatedSession, GuardRejection> {
        let raw = cookie.ok_or(GuardRejection::NotAuthenticated)?;
        let session_id: SessionId = raw.parse().map_err(|e| {
            debug!(error = %e, "Malformed session cookie");
            GuardRejection::SessionMissing
        })?;

        let record = match self.sessions.get_session(&session_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(GuardRejection::SessionMissing),
            Err(e) if matches!(e.current_context(), StoreError::Serialization { .. }) => {
                warn!(error = %e, "Unreadable session record, ending session");
                if let Err(e) = self.sessions.delete_session(&session_id).await {
                    warn!(error = %e, "Failed to delete unreadable session");
                }
                return Err(GuardRejection::SessionMissing);
            }
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                return Err(GuardRejection::Unavailable);
            }
        };

        let claims = match self.provider.verify_access_token(&record.access_token).await {
            Ok(claims) => claims,
            Err(e) => {
                info!(
                    error = %e,
                    username = %record.user_info.username,
                    "Access token rejected, ending session"
                );
                if let Err(e) = self.sessions.delete_session(&session_id).await {
                    warn!(error = %e, "Failed to delete invalidated session");
                }
                return Err(GuardRejection::SessionInvalid);
            }
        };

        Ok(AuthenticatedSession {
            session_id,
            record,
            claims,
        })
    }
}
