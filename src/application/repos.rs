//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{CatalogItem, NewRating, Rating};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Source of truth for catalog items and ratings.
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    /// Items ordered by ascending id, skipping `offset` rows and returning at most `limit`.
    async fn query_page(&self, offset: i64, limit: i64) -> Result<Vec<CatalogItem>, RepoError>;

    async fn query_by_id(&self, id: i64) -> Result<Option<CatalogItem>, RepoError>;

    /// Persist a rating. A dangling `item_id` fails with `NotFound`.
    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, RepoError>;

    /// Up to `n` distinct items chosen uniformly at random.
    async fn sample_random(&self, n: i64) -> Result<Vec<CatalogItem>, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}
