//! Cache-fronted catalog queries.
//!
//! Page reads go through the lookaside cache: derive the key, try the cache,
//! fall back to the store on a miss and write the page back with the page TTL.
//! Every cache call is bounded by `cache_timeout`; a failed or slow cache only
//! costs the bound, it never fails the request.

use std::{future::Future, sync::Arc, time::Duration, time::Instant};

use bytes::Bytes;
use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::pagination::{PageRequest, PaginationError};
use crate::application::repos::{CatalogRepo, RepoError};
use crate::cache::{CacheConfig, CacheError, CacheResult, CacheStore, QueryKey};
use crate::config::CatalogSettings;
use crate::domain::entities::{self, CatalogItem, NewRating, Rating};
use crate::domain::error::DomainError;

pub(crate) const ITEMS_RESOURCE: &str = "items";

const METRIC_CACHE_HIT: &str = "reelshelf_cache_hit_total";
const METRIC_CACHE_MISS: &str = "reelshelf_cache_miss_total";
const METRIC_CACHE_DEGRADED: &str = "reelshelf_cache_degraded_total";
const METRIC_CACHE_INVALIDATED: &str = "reelshelf_cache_invalidated_total";
const METRIC_STORE_QUERY_MS: &str = "reelshelf_store_query_ms";

/// Bulk invalidation scans the keyspace, so it gets more room than point reads.
const INVALIDATE_TIMEOUT_FACTOR: u32 = 10;

const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_MAX_SAMPLE_SIZE: u32 = 5;

#[derive(Debug, Clone)]
pub struct CatalogPolicy {
    pub max_page_size: u32,
    pub max_sample_size: u32,
    pub page_ttl: Duration,
    pub cache_timeout: Duration,
    pub key_namespace: String,
    pub invalidate_on_rating: bool,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_sample_size: DEFAULT_MAX_SAMPLE_SIZE,
            page_ttl: cache.page_ttl,
            cache_timeout: cache.op_timeout,
            key_namespace: cache.key_namespace,
            invalidate_on_rating: cache.invalidate_on_rating,
        }
    }
}

impl CatalogPolicy {
    pub fn from_settings(cache: &CacheConfig, catalog: &CatalogSettings) -> Self {
        Self {
            max_page_size: catalog.max_page_size.get(),
            max_sample_size: catalog.max_sample_size.get(),
            page_ttl: cache.page_ttl,
            cache_timeout: cache.op_timeout,
            key_namespace: cache.key_namespace.clone(),
            invalidate_on_rating: cache.invalidate_on_rating,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("catalog store unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal catalog error: {0}")]
    Internal(String),
}

impl From<DomainError> for CatalogError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation { message } => Self::Validation(message),
        }
    }
}

impl From<PaginationError> for CatalogError {
    fn from(error: PaginationError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<RepoError> for CatalogError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::NotFound => Self::NotFound("resource"),
            RepoError::InvalidInput { message } => Self::Validation(message),
            RepoError::Unavailable(message) => Self::ServiceUnavailable(message),
            RepoError::Persistence(message) => Self::Internal(message),
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepo>,
    cache: Arc<dyn CacheStore>,
    policy: CatalogPolicy,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepo>, cache: Arc<dyn CacheStore>, policy: CatalogPolicy) -> Self {
        Self {
            repo,
            cache,
            policy,
        }
    }

    pub fn policy(&self) -> &CatalogPolicy {
        &self.policy
    }

    /// One page of items ordered by id, served from the cache when possible.
    ///
    /// A hit may be up to `page_ttl` old.
    pub async fn list_items(&self, page: i64, limit: i64) -> Result<Vec<CatalogItem>, CatalogError> {
        let request = PageRequest::new(page, limit, self.policy.max_page_size)?;
        let key = QueryKey::new(ITEMS_RESOURCE)
            .param("page", request.page())
            .param("limit", request.limit())
            .render(&self.policy.key_namespace);

        if let Some(payload) = self
            .guarded("get", self.policy.cache_timeout, self.cache.get(&key))
            .await
            .flatten()
        {
            match serde_json::from_slice::<Vec<CatalogItem>>(&payload) {
                Ok(items) => {
                    counter!(METRIC_CACHE_HIT).increment(1);
                    debug!(key = %key, items = items.len(), "page served from cache");
                    return Ok(items);
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "cached page is not decodable; recomputing");
                }
            }
        }
        counter!(METRIC_CACHE_MISS).increment(1);

        let started_at = Instant::now();
        let items = self
            .repo
            .query_page(request.offset(), i64::from(request.limit()))
            .await;
        record_store_query("page", started_at);
        let items = items?;

        match serde_json::to_vec(&items) {
            Ok(payload) => {
                self.guarded(
                    "set",
                    self.policy.cache_timeout,
                    self.cache
                        .set_with_ttl(&key, Bytes::from(payload), self.policy.page_ttl),
                )
                .await;
            }
            Err(err) => warn!(key = %key, error = %err, "failed to encode page for caching"),
        }

        Ok(items)
    }

    /// Single item lookup. Not cached.
    pub async fn get_item(&self, id: i64) -> Result<CatalogItem, CatalogError> {
        let started_at = Instant::now();
        let item = self.repo.query_by_id(id).await;
        record_store_query("by_id", started_at);
        item?.ok_or(CatalogError::NotFound("catalog item"))
    }

    pub async fn submit_rating(&self, rating: NewRating) -> Result<Rating, CatalogError> {
        entities::validate_new_rating(&rating)?;

        let started_at = Instant::now();
        let created = self.repo.insert_rating(rating).await;
        record_store_query("insert_rating", started_at);
        let created = created.map_err(|err| match err {
            RepoError::NotFound => CatalogError::NotFound("catalog item"),
            other => other.into(),
        })?;

        if self.policy.invalidate_on_rating {
            self.invalidate_item_pages().await;
        }

        Ok(created)
    }

    /// Up to `n` distinct items chosen uniformly at random. Not cached.
    pub async fn sample(&self, n: i64) -> Result<Vec<CatalogItem>, CatalogError> {
        let max = self.policy.max_sample_size;
        if n < 1 || n > i64::from(max) {
            return Err(CatalogError::Validation(format!(
                "sample size must be between 1 and {max}, got {n}"
            )));
        }

        let started_at = Instant::now();
        let items = self.repo.sample_random(n).await;
        record_store_query("sample", started_at);
        Ok(items?)
    }

    async fn invalidate_item_pages(&self) {
        let prefix = QueryKey::resource_prefix(&self.policy.key_namespace, ITEMS_RESOURCE);
        let timeout = self
            .policy
            .cache_timeout
            .saturating_mul(INVALIDATE_TIMEOUT_FACTOR);
        if let Some(removed) = self
            .guarded("invalidate_prefix", timeout, self.cache.invalidate_prefix(&prefix))
            .await
        {
            counter!(METRIC_CACHE_INVALIDATED).increment(removed);
            debug!(prefix = %prefix, removed, "invalidated cached item pages");
        }
    }

    /// Run a cache call under `timeout`. Failures are logged, counted and turned into `None`.
    async fn guarded<T, F>(&self, op: &'static str, timeout: Duration, call: F) -> Option<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        match bounded(op, timeout, call).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    op,
                    provider = self.cache.provider_name(),
                    error = %err,
                    "cache call failed; using the store"
                );
                counter!(METRIC_CACHE_DEGRADED, "op" => op).increment(1);
                None
            }
        }
    }
}

/// Run a cache call under `timeout`, reporting expiry as [`CacheError::Timeout`].
async fn bounded<T, F>(op: &'static str, timeout: Duration, call: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Timeout(format!(
            "{op} exceeded {}ms",
            timeout.as_millis()
        ))),
    }
}

fn record_store_query(query: &'static str, started_at: Instant) {
    histogram!(METRIC_STORE_QUERY_MS, "query" => query)
        .record(started_at.elapsed().as_secs_f64() * 1000.0);
}
