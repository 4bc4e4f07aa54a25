use async_trait::async_trait;

use crate::{
    application::repos::{CatalogRepo, RepoError},
    domain::entities::{CatalogItem, NewRating, Rating},
};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl CatalogRepo for PostgresRepositories {
    async fn query_page(&self, offset: i64, limit: i64) -> Result<Vec<CatalogItem>, RepoError> {
        sqlx::query_as::<_, CatalogItem>(
            r#"
            SELECT id, title, genre
            FROM catalog_items
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn query_by_id(&self, id: i64) -> Result<Option<CatalogItem>, RepoError> {
        sqlx::query_as::<_, CatalogItem>(
            r#"
            SELECT id, title, genre
            FROM catalog_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, RepoError> {
        sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (item_id, score, comment)
            VALUES ($1, $2, $3)
            RETURNING id, item_id, score, comment, created_at
            "#,
        )
        .bind(rating.item_id)
        .bind(rating.score)
        .bind(&rating.comment)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    // Full scan per call. A precomputed random column would avoid it on large catalogs.
    async fn sample_random(&self, n: i64) -> Result<Vec<CatalogItem>, RepoError> {
        sqlx::query_as::<_, CatalogItem>(
            r#"
            SELECT id, title, genre
            FROM catalog_items
            ORDER BY random()
            LIMIT $1
            "#,
        )
        .bind(n)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        PostgresRepositories::health_check(self)
            .await
            .map_err(map_sqlx_error)
    }
}
