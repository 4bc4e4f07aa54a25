//! Catalog handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::domain::entities::NewRating;

use super::error::ApiError;
use super::state::HttpState;

#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsQuery {
    pub count: Option<i64>,
}

pub async fn list_items(
    State(state): State<HttpState>,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::bad_request("invalid query parameters", Some(rejection.body_text()))
    })?;

    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or_else(|| i64::from(state.default_page_size));

    let items = state
        .catalog
        .list_items(page, limit)
        .await
        .map_err(|err| ApiError::from_catalog(err, StatusCode::BAD_REQUEST))?;

    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<HttpState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(|rejection| {
        ApiError::bad_request("item id must be an integer", Some(rejection.body_text()))
    })?;

    let item = state
        .catalog
        .get_item(id)
        .await
        .map_err(|err| ApiError::from_catalog(err, StatusCode::BAD_REQUEST))?;

    Ok(Json(item))
}

pub async fn submit_rating(
    State(state): State<HttpState>,
    body: Result<Json<NewRating>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(rating) = body.map_err(|rejection| {
        ApiError::unprocessable("rating body is malformed", Some(rejection.body_text()))
    })?;

    let created = state
        .catalog
        .submit_rating(rating)
        .await
        .map_err(|err| ApiError::from_catalog(err, StatusCode::UNPROCESSABLE_ENTITY))?;

    Ok(Json(created))
}

pub async fn recommendations(
    State(state): State<HttpState>,
    query: Result<Query<RecommendationsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::bad_request("invalid query parameters", Some(rejection.body_text()))
    })?;

    let count = query
        .count
        .unwrap_or_else(|| i64::from(state.max_sample_size()));

    let items = state
        .catalog
        .sample(count)
        .await
        .map_err(|err| ApiError::from_catalog(err, StatusCode::BAD_REQUEST))?;

    Ok(Json(items))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("route not found")
}
