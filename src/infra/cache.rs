//! Cache provider selection.

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheBackend, CacheConfig, CacheStore, MemoryCacheStore, RedisCacheStore, redact_url};

use super::error::InfraError;

/// Open the configured cache store.
///
/// An unreachable Redis endpoint fails startup; once running, the connection
/// manager reconnects on its own and the catalog service degrades to the store.
pub async fn open_cache(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, InfraError> {
    match &config.backend {
        CacheBackend::Memory => {
            info!(
                provider = "memory",
                capacity = config.memory_capacity.get(),
                "cache store ready"
            );
            Ok(Arc::new(MemoryCacheStore::new(config.memory_capacity)))
        }
        CacheBackend::Redis { url } => {
            let store = RedisCacheStore::connect(url).await.map_err(|err| {
                InfraError::cache(format!(
                    "failed to connect to redis at {}: {err}",
                    redact_url(url)
                ))
            })?;
            info!(provider = "redis", url = %redact_url(url), "cache store ready");
            Ok(Arc::new(store))
        }
    }
}
