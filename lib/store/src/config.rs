//! Store backend selection and connection settings.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the key-value store connection.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379/0"), or `memory://`
    /// for the in-process backend.
    pub url: String,

    /// Upper bound on a single store command, in milliseconds.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Extra attempts for reads that fail transiently. Writes are never retried.
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    /// How often the in-process backend sweeps expired entries, in seconds.
    #[serde(default = "default_purge_interval_seconds")]
    pub purge_interval_seconds: u64,
}

/// URL scheme selecting the in-process backend.
pub const MEMORY_SCHEME: &str = "memory://";

fn default_operation_timeout_ms() -> u64 {
    2_000
}

fn default_read_retries() -> u32 {
    2
}

fn default_purge_interval_seconds() -> u64 {
    60
}

impl StoreConfig {
    /// Creates a configuration with default timeout and retry settings.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            url,
            operation_timeout_ms: default_operation_timeout_ms(),
            read_retries: default_read_retries(),
            purge_interval_seconds: default_purge_interval_seconds(),
        }
    }

    /// Returns the per-command timeout.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Whether the URL selects the in-process backend.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.url.trim().starts_with(MEMORY_SCHEME)
    }

    /// Returns the sweep interval of the in-process backend.
    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_seconds)
    }
}
