//! Wire types shared by the reelshelf server and its clients.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A catalog entry as it appears in listings, lookups and recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    pub genre: String,
}

/// Body of `POST /ratings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRating {
    pub item_id: i64,
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

/// A persisted rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Rating {
    pub id: i64,
    pub item_id: i64,
    pub score: f64,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
