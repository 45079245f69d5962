//! Redis store backend.

use async_trait::async_trait;
use keyward_core::Result;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::{Namespace, TransientStore};

/// A `TransientStore` backed by Redis key expiry (`SET ... EX`).
///
/// The multiplexed connection is cheap to clone and shared by all requests.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    operation_timeout: Duration,
    read_retries: u32,
}

impl RedisStore {
    /// Opens a multiplexed connection to the configured Redis server.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the URL is invalid or the server
    /// cannot be reached, and `StoreError::Timeout` if connecting exceeds the
    /// operation timeout.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            StoreError::Unavailable {
                details: format!("invalid store URL: {e}"),
            }
        })?;

        let connection = with_timeout(
            "connect",
            config.operation_timeout(),
            client.get_multiplexed_async_connection(),
        )
        .await?;

        Ok(Self {
            connection,
            operation_timeout: config.operation_timeout(),
            read_retries: config.read_retries,
        })
    }
}

/// Runs a Redis command under a deadline, mapping both failure modes to `StoreError`.
async fn with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(StoreError::Unavailable {
            details: e.to_string(),
        }
        .into()),
        Err(_) => Err(StoreError::Timeout { operation }.into()),
    }
}

#[async_trait]
impl TransientStore for RedisStore {
    #[instrument(skip_all, fields(%namespace, ttl_secs = ttl.as_secs()))]
    async fn put(
        &self,
        namespace: Namespace,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        // EX 0 is rejected by Redis.
        let seconds = ttl.as_secs().max(1);
        with_timeout(
            "put",
            self.operation_timeout,
            conn.set_ex::<_, _, ()>(namespace.key(key), value, seconds),
        )
        .await
    }

    #[instrument(skip_all, fields(%namespace))]
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let full_key = namespace.key(key);
        let mut attempt = 0;
        loop {
            let mut conn = self.connection.clone();
            let result = with_timeout(
                "get",
                self.operation_timeout,
                conn.get::<_, Option<String>>(&full_key),
            )
            .await;

            match result {
                Ok(value) => {
                    debug!(found = value.is_some(), attempt, "store read");
                    return Ok(value);
                }
                Err(e) if attempt < self.read_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "transient store read failure, retrying");
                    tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    #[instrument(skip_all, fields(%namespace))]
    async fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        with_timeout(
            "delete",
            self.operation_timeout,
            conn.del::<_, ()>(namespace.key(key)),
        )
        .await
    }

    /// `GETDEL`: one round trip, atomic on the server. Not retried, since a
    /// lost reply may already have removed the entry.
    #[instrument(skip_all, fields(%namespace))]
    async fn take(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        with_timeout(
            "take",
            self.operation_timeout,
            conn.get_del::<_, Option<String>>(namespace.key(key)),
        )
        .await
    }
}
