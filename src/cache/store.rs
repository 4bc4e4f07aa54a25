//! The lookaside cache port.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with per-entry expiry.
///
/// Single-key operations are atomic at the entry level. Every entry expires on
/// its own, so explicit invalidation only shortens staleness.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on miss or expired entry.
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>>;

    async fn set_with_ttl(&self, key: &str, value: Bytes, ttl: Duration) -> CacheResult<()>;

    /// Best-effort removal of one key.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Remove every key starting with `prefix`, returning how many were removed.
    async fn invalidate_prefix(&self, prefix: &str) -> CacheResult<u64>;

    async fn health_check(&self) -> CacheResult<()>;

    fn provider_name(&self) -> &'static str;
}
