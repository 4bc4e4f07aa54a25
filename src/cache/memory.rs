//! In-process cache store.
//!
//! Entries carry their own deadline and are evicted lazily when read past it;
//! capacity is bounded with LRU eviction. State is per process, so instances
//! behind a load balancer each keep their own copy.

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tokio::time::Instant;
use tracing::debug;

use super::lock::{rw_read, rw_write};
use super::store::{CacheResult, CacheStore};

const SOURCE: &str = "cache::memory";

struct Entry {
    payload: Bytes,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

pub struct MemoryCacheStore {
    entries: RwLock<LruCache<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let live = entries
            .get(key)
            .map(|entry| {
                let fresh = entry.expires_at.is_none_or(|deadline| deadline > now);
                fresh.then(|| entry.payload.clone())
            });

        match live {
            Some(Some(payload)) => Ok(Some(payload)),
            Some(None) => {
                entries.pop(key);
                debug!(key, "evicted expired entry");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: Bytes, ttl: Duration) -> CacheResult<()> {
        let mut entries = rw_write(&self.entries, SOURCE, "set_with_ttl");
        if ttl.is_zero() {
            entries.pop(key);
            return Ok(());
        }

        let entry = Entry {
            payload: value,
            expires_at: Instant::now().checked_add(ttl),
        };
        let displaced = entries.push(key.to_string(), entry);
        if let Some((evicted, _)) = displaced.filter(|(evicted, _)| evicted != key) {
            debug!(key, evicted = %evicted, "capacity eviction");
        }
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        rw_write(&self.entries, SOURCE, "invalidate").pop(key);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let mut entries = rw_write(&self.entries, SOURCE, "invalidate_prefix");
        let doomed: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            entries.pop(key);
        }
        Ok(doomed.len() as u64)
    }

    async fn health_check(&self) -> CacheResult<()> {
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
