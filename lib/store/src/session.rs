//! Session record persistence.
//!
//! A session record binds a session identifier to the access token the
//! identity provider issued and a minimal profile. The record keeps no expiry
//! of its own: the store TTL and the upstream token's validity bound it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::{Result, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;
use crate::store::{Namespace, TransientStore};

/// Profile fields cached in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl UserInfo {
    /// Creates profile info.
    #[must_use]
    pub fn new(username: String, email: String) -> Self {
        Self { username, email }
    }
}

/// Server-side state of an authenticated browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Access token issued by the identity provider.
    pub access_token: String,
    /// Profile captured at login.
    pub user_info: UserInfo,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(access_token: String, user_info: UserInfo) -> Self {
        Self {
            access_token,
            user_info,
            created_at: Utc::now(),
        }
    }
}

/// Storage for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a session record with the session TTL.
    async fn put_session(&self, id: &SessionId, record: &SessionRecord)
    -> Result<(), StoreError>;

    /// Resolves a session. Missing and expired sessions both yield `None`.
    async fn get_session(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Removes a session. Succeeds when the session is already gone.
    async fn delete_session(&self, id: &SessionId) -> Result<(), StoreError>;
}

/// `SessionStore` over any `TransientStore`, storing records as JSON.
pub struct SessionRepository<S: ?Sized> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S: TransientStore + ?Sized> SessionRepository<S> {
    /// Creates a new session repository.
    pub fn new(store: Arc<S>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Returns the lifetime given to new sessions.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl<S: TransientStore + ?Sized> SessionStore for SessionRepository<S> {
    async fn put_session(
        &self,
        id: &SessionId,
        record: &SessionRecord,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(record).map_err(|e| StoreError::Serialization {
            details: e.to_string(),
        })?;
        self.store
            .put(Namespace::Session, id.as_str(), json, self.ttl)
            .await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let Some(json) = self.store.get(Namespace::Session, id.as_str()).await? else {
            return Ok(None);
        };
        let record = serde_json::from_str(&json).map_err(|e| StoreError::Serialization {
            details: e.to_string(),
        })?;
        Ok(Some(record))
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), StoreError> {
        self.store.delete(Namespace::Session, id.as_str()).await
    }
}
