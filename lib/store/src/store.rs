//! The namespaced key-value capability with per-entry expiry.

use async_trait::async_trait;
use keyward_core::Result;
use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::error::StoreError;

/// Logical partitions of the store.
///
/// Both namespaces share one backend; the namespace is folded into the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Single-use CSRF state tokens (short TTL).
    CsrfState,
    /// Session records (session TTL).
    Session,
}

impl Namespace {
    /// Returns the key prefix for this namespace.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CsrfState => "csrf-state",
            Self::Session => "session",
        }
    }

    /// Builds the backend key for `key` within this namespace.
    #[must_use]
    pub fn key(&self, key: &str) -> String {
        format!("{}:{}", self.as_str(), key)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value storage with automatic expiry.
///
/// Implementations must make each single-key operation atomic. Values are
/// opaque strings; callers own the serialization format.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Stores `value` under `key`, replacing any existing entry, expiring after `ttl`.
    async fn put(
        &self,
        namespace: Namespace,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Returns the value if present and unexpired.
    ///
    /// Missing and expired entries are indistinguishable: both yield `None`.
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError>;

    /// Removes the entry. Deleting an absent key succeeds.
    async fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError>;

    /// Returns the live value and removes the entry, so at most one caller
    /// ever receives it.
    ///
    /// The default reads then deletes, which is not atomic; a failed delete
    /// is logged and the value is still returned. Backends that can remove
    /// and return in one step override it.
    async fn take(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.get(namespace, key).await?;
        if value.is_some() {
            if let Err(e) = self.delete(namespace, key).await {
                warn!(%namespace, error = %e, "Failed to delete taken entry");
            }
        }
        Ok(value)
    }
}
