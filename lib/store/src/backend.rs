//! Backend selection.

use keyward_core::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::redis_store::RedisStore;
use crate::store::TransientStore;

/// Opens the backend named by the store URL.
///
/// A `memory://` URL yields a [`MemoryStore`] with a background sweep running
/// every [`StoreConfig::purge_interval`]. Entries do not outlive the process
/// and are not shared between instances. Any other URL is handed to Redis.
///
/// # Errors
///
/// Returns the error of [`RedisStore::connect`] for a Redis URL.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn TransientStore>, StoreError> {
    if config.is_in_memory() {
        let store = Arc::new(MemoryStore::new());
        store.spawn_purge(config.purge_interval());
        info!(
            purge_interval_secs = config.purge_interval_seconds,
            "Using in-process store"
        );
        return Ok(store);
    }

    let store = RedisStore::connect(config).await?;
    info!("Connected to Redis store");
    Ok(Arc::new(store))
}
