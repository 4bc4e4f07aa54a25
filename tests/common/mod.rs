#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rand::seq::SliceRandom;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use reelshelf::application::catalog::{CatalogPolicy, CatalogService};
use reelshelf::application::repos::{CatalogRepo, RepoError};
use reelshelf::cache::{CacheError, CacheResult, CacheStore, MemoryCacheStore};
use reelshelf::domain::entities::{CatalogItem, NewRating, Rating};

pub fn item(id: i64, title: &str, genre: &str) -> CatalogItem {
    CatalogItem {
        id,
        title: title.to_string(),
        genre: genre.to_string(),
    }
}

pub fn numbered_items(count: i64) -> Vec<CatalogItem> {
    (1..=count)
        .map(|id| item(id, &format!("Feature {id}"), "Drama"))
        .collect()
}

/// Store fake keeping rows in id order and counting every query it serves.
#[derive(Default)]
pub struct InMemoryCatalog {
    items: Mutex<Vec<CatalogItem>>,
    ratings: Mutex<Vec<Rating>>,
    unavailable: AtomicBool,
    pub page_queries: AtomicUsize,
    pub sample_queries: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub async fn push_item(&self, title: &str, genre: &str) -> CatalogItem {
        let mut items = self.items.lock().await;
        let id = items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        let created = item(id, title, genre);
        items.push(created.clone());
        created
    }

    pub async fn ratings(&self) -> Vec<Rating> {
        self.ratings.lock().await.clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn page_queries(&self) -> usize {
        self.page_queries.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepoError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogRepo for InMemoryCatalog {
    async fn query_page(&self, offset: i64, limit: i64) -> Result<Vec<CatalogItem>, RepoError> {
        self.check_available()?;
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().await;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(items.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn query_by_id(&self, id: i64) -> Result<Option<CatalogItem>, RepoError> {
        self.check_available()?;
        let items = self.items.lock().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, RepoError> {
        self.check_available()?;
        if !self
            .items
            .lock()
            .await
            .iter()
            .any(|item| item.id == rating.item_id)
        {
            return Err(RepoError::NotFound);
        }

        let mut ratings = self.ratings.lock().await;
        let created = Rating {
            id: ratings.len() as i64 + 1,
            item_id: rating.item_id,
            score: rating.score,
            comment: rating.comment,
            created_at: OffsetDateTime::now_utc(),
        };
        ratings.push(created.clone());
        Ok(created)
    }

    async fn sample_random(&self, n: i64) -> Result<Vec<CatalogItem>, RepoError> {
        self.check_available()?;
        self.sample_queries.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().await;
        let amount = usize::try_from(n).unwrap_or(0);
        Ok(items
            .choose_multiple(&mut rand::thread_rng(), amount)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.check_available()
    }
}

/// Memory store wrapper counting calls, for asserting cache traffic.
pub struct CountingCache {
    pub inner: MemoryCacheStore,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub prefix_invalidations: AtomicUsize,
}

impl Default for CountingCache {
    fn default() -> Self {
        Self {
            inner: MemoryCacheStore::new(std::num::NonZeroUsize::new(64).expect("non-zero")),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            prefix_invalidations: AtomicUsize::new(0),
        }
    }
}

impl CountingCache {
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: Bytes, ttl: Duration) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.inner.invalidate(key).await
    }

    async fn invalidate_prefix(&self, prefix: &str) -> CacheResult<u64> {
        self.prefix_invalidations.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate_prefix(prefix).await
    }

    async fn health_check(&self) -> CacheResult<()> {
        self.inner.health_check().await
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

/// Cache whose every call errors, as a dead Redis would.
#[derive(Default)]
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Bytes>> {
        Err(CacheError::Connection("connection reset".into()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: Bytes, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Connection("connection reset".into()))
    }

    async fn invalidate(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::Connection("connection reset".into()))
    }

    async fn invalidate_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        Err(CacheError::Connection("connection reset".into()))
    }

    async fn health_check(&self) -> CacheResult<()> {
        Err(CacheError::Connection("connection reset".into()))
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// Cache whose every call never completes.
#[derive(Default)]
pub struct StallingCache;

#[async_trait]
impl CacheStore for StallingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Bytes>> {
        std::future::pending().await
    }

    async fn set_with_ttl(&self, _key: &str, _value: Bytes, _ttl: Duration) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn invalidate(&self, _key: &str) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn invalidate_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        std::future::pending().await
    }

    async fn health_check(&self) -> CacheResult<()> {
        std::future::pending().await
    }

    fn provider_name(&self) -> &'static str {
        "stalling"
    }
}

pub fn service(
    repo: Arc<InMemoryCatalog>,
    cache: Arc<dyn CacheStore>,
    policy: CatalogPolicy,
) -> CatalogService {
    CatalogService::new(repo, cache, policy)
}
