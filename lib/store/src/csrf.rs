//! CSRF state token persistence.

use async_trait::async_trait;
use keyward_core::{CsrfState, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;
use crate::store::{Namespace, TransientStore};

/// Storage for single-use CSRF state tokens.
#[async_trait]
pub trait CsrfStateStore: Send + Sync {
    /// Records a freshly issued state token with the short state TTL.
    async fn put_state(&self, state: &CsrfState) -> Result<(), StoreError>;

    /// Looks up the stored value for a state returned by the provider.
    ///
    /// Takes the raw callback parameter: it has not been validated yet.
    async fn get_state(&self, state: &str) -> Result<Option<String>, StoreError>;

    /// Consumes a state token. Succeeds when the token is already gone.
    async fn delete_state(&self, state: &str) -> Result<(), StoreError>;

    /// Looks up and consumes a state token in one step.
    ///
    /// When two callbacks race on the same token, at most one sees the value.
    async fn take_state(&self, state: &str) -> Result<Option<String>, StoreError>;
}

/// `CsrfStateStore` over any `TransientStore`.
///
/// The stored value is the token itself, so a lookup can be checked against
/// the parameter that produced it.
pub struct StateRepository<S: ?Sized> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S: TransientStore + ?Sized> StateRepository<S> {
    /// Creates a new state repository.
    pub fn new(store: Arc<S>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Returns the lifetime given to new state tokens.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl<S: TransientStore + ?Sized> CsrfStateStore for StateRepository<S> {
    async fn put_state(&self, state: &CsrfState) -> Result<(), StoreError> {
        self.store
            .put(
                Namespace::CsrfState,
                state.as_str(),
                state.as_str().to_string(),
                self.ttl,
            )
            .await
    }

    async fn get_state(&self, state: &str) -> Result<Option<String>, StoreError> {
        self.store.get(Namespace::CsrfState, state).await
    }

    async fn delete_state(&self, state: &str) -> Result<(), StoreError> {
        self.store.delete(Namespace::CsrfState, state).await
    }

    async fn take_state(&self, state: &str) -> Result<Option<String>, StoreError> {
        self.store.take(Namespace::CsrfState, state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn repository() -> (Arc<MemoryStore>, StateRepository<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let repo = StateRepository::new(store.clone(), Duration::from_secs(120));
        (store, repo)
    }

    #[tokio::test]
    async fn stored_value_is_the_token() {
        let (store, repo) = repository();
        let state = CsrfState::generate().expect("entropy");
        repo.put_state(&state).await.expect("put");

        let raw = store
            .get(Namespace::CsrfState, state.as_str())
            .await
            .expect("get");
        assert_eq!(raw.as_deref(), Some(state.as_str()));
    }

    #[tokio::test]
    async fn deleted_state_is_gone() {
        let (_, repo) = repository();
        let state = CsrfState::generate().expect("entropy");
        repo.put_state(&state).await.expect("put");

        repo.delete_state(state.as_str()).await.expect("delete");
        assert!(repo.get_state(state.as_str()).await.expect("get").is_none());
        repo.delete_state(state.as_str())
            .await
            .expect("second delete is a no-op");
    }

    #[tokio::test]
    async fn taken_state_is_single_use() {
        let (_, repo) = repository();
        let state = CsrfState::generate().expect("entropy");
        repo.put_state(&state).await.expect("put");

        let (first, second) = tokio::join!(
            repo.take_state(state.as_str()),
            repo.take_state(state.as_str())
        );
        let taken = [first.expect("take"), second.expect("take")];
        assert_eq!(taken.iter().filter(|value| value.is_some()).count(), 1);
        assert!(repo.get_state(state.as_str()).await.expect("get").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn state_expires_after_ttl() {
        let (_, repo) = repository();
        let state = CsrfState::generate().expect("entropy");
        repo.put_state(&state).await.expect("put");

        tokio::time::advance(repo.ttl()).await;
        assert!(repo.get_state(state.as_str()).await.expect("get").is_none());
    }
}
