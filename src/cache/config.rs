//! Cache configuration.
//!
//! Resolved from the `[cache]` section of `reelshelf.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_PAGE_TTL_SECS: u64 = 3600;
const DEFAULT_OP_TIMEOUT_MS: u64 = 50;
const DEFAULT_MEMORY_CAPACITY: usize = 1024;
pub(crate) const DEFAULT_KEY_NAMESPACE: &str = "reelshelf";

/// Which cache store backs the lookaside cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    Memory,
    Redis { url: String },
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Lifetime of a cached page (`T_page`).
    pub page_ttl: Duration,
    /// Upper bound on any single cache call before falling back to the store.
    pub op_timeout: Duration,
    /// Entry limit for the in-process store.
    pub memory_capacity: NonZeroUsize,
    pub key_namespace: String,
    /// Drop cached item pages after each rating write.
    pub invalidate_on_rating: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            page_ttl: Duration::from_secs(DEFAULT_PAGE_TTL_SECS),
            op_timeout: Duration::from_millis(DEFAULT_OP_TIMEOUT_MS),
            memory_capacity: NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            key_namespace: DEFAULT_KEY_NAMESPACE.to_string(),
            invalidate_on_rating: false,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend.clone(),
            page_ttl: settings.page_ttl,
            op_timeout: settings.op_timeout,
            memory_capacity: settings.memory_capacity,
            key_namespace: settings.key_namespace.clone(),
            invalidate_on_rating: settings.invalidate_on_rating,
        }
    }
}
