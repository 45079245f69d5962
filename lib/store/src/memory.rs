//! In-process store backend.
//!
//! Selected with a `memory://` store URL for single-instance deployments, and
//! used as the substitute store in tests. Deadlines use
//! `tokio::time::Instant`, so a paused test clock drives expiry.

use async_trait::async_trait;
use keyward_core::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{Namespace, TransientStore};

struct Entry {
    value: String,
    /// `None` when the TTL reaches past what the clock can represent.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// A `TransientStore` held in process memory.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Starts a background task that sweeps expired entries every `interval`.
    ///
    /// Reads already ignore expired entries; the sweep only bounds memory held
    /// by keys nobody asks for again.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn spawn_purge(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "Purged expired entries");
                }
            }
        })
    }

    /// Returns the number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl TransientStore for MemoryStore {
    async fn put(
        &self,
        namespace: Namespace,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = Entry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries.lock().await.insert(namespace.key(key), entry);
        Ok(())
    }

    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let full_key = namespace.key(key);
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(&full_key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                debug!(%namespace, "evicting expired entry");
                entries.remove(&full_key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(&namespace.key(key));
        Ok(())
    }

    async fn take(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let entry = self.entries.lock().await.remove(&namespace.key(key));
        Ok(entry
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value))
    }
}
