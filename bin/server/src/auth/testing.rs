//! Substitute provider and store for exercising the auth flow without a network.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use keyward_core::{CsrfState, Result};
use keyward_identity::{IdentityClaims, IdentityError, IdentityProvider, TokenSet};
use keyward_store::{MemoryStore, Namespace, StoreError, TransientStore};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const AUTHORIZE_URL: &str = "https://auth.example.com/realms/main/protocol/openid-connect/auth";

/// Extracts the `state` parameter from an authorization URL built by `FakeProvider`.
pub fn state_from_url(url: &str) -> String {
    url.split("state=")
        .nth(1)
        .expect("URL carries a state")
        .to_string()
}

pub fn alice() -> IdentityClaims {
    IdentityClaims {
        subject: "3f1e5f9a-alice".to_string(),
        issuer: "https://auth.example.com/realms/main".to_string(),
        username: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
        roles: vec!["viewer".to_string()],
        expires_at: Utc::now() + ChronoDuration::minutes(5),
    }
}

/// Identity provider that issues `access-<code>` tokens for any code and
/// counts every call.
#[derive(Default)]
pub struct FakeProvider {
    pub exchange_calls: AtomicUsize,
    pub identity_calls: AtomicUsize,
    pub access_calls: AtomicUsize,
    fail_exchange: AtomicBool,
    fail_identity: AtomicBool,
    revoked: Mutex<HashSet<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_exchange(&self) {
        self.fail_exchange.store(true, Ordering::SeqCst);
    }

    pub fn fail_identity(&self) {
        self.fail_identity.store(true, Ordering::SeqCst);
    }

    pub fn revoke(&self, access_token: &str) {
        self.revoked
            .lock()
            .expect("lock")
            .insert(access_token.to_string());
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(&self, state: &CsrfState) -> String {
        format!("{AUTHORIZE_URL}?response_type=code&client_id=keyward&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, IdentityError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(IdentityError::TokenExchange {
                details: "invalid_grant".to_string(),
            }
            .into());
        }
        Ok(TokenSet::new(format!("access-{code}")).with_id_token(Some(format!("id-{code}"))))
    }

    async fn verify_identity_token(
        &self,
        _tokens: &TokenSet,
    ) -> Result<IdentityClaims, IdentityError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_identity.load(Ordering::SeqCst) {
            return Err(IdentityError::Verification {
                details: "bad signature".to_string(),
            }
            .into());
        }
        Ok(alice())
    }

    async fn verify_access_token(
        &self,
        access_token: &str,
    ) -> Result<IdentityClaims, IdentityError> {
        self.access_calls.fetch_add(1, Ordering::SeqCst);
        if self.revoked.lock().expect("lock").contains(access_token) {
            return Err(IdentityError::Verification {
                details: "token is not active".to_string(),
            }
            .into());
        }
        Ok(alice())
    }
}

/// `MemoryStore` wrapper that can be told to fail writes, reads or deletes.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_puts: AtomicBool,
    fail_gets: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                details: "connection refused".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl TransientStore for FlakyStore {
    async fn put(
        &self,
        namespace: Namespace,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        Self::check(&self.fail_puts)?;
        self.inner.put(namespace, key, value, ttl).await
    }

    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        Self::check(&self.fail_gets)?;
        self.inner.get(namespace, key).await
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        Self::check(&self.fail_deletes)?;
        self.inner.delete(namespace, key).await
    }
}
