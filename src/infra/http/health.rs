use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::error::ErrorReport;

use super::state::HttpState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn db_health(State(state): State<HttpState>) -> Response {
    let result = match tokio::time::timeout(PROBE_TIMEOUT, state.repo.health_check()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err("database probe timed out".to_string()),
    };
    probe_response("infra::http::db_health", result)
}

pub async fn cache_health(State(state): State<HttpState>) -> Response {
    let result = match tokio::time::timeout(PROBE_TIMEOUT, state.cache.health_check()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err(format!("{} cache probe timed out", state.cache.provider_name())),
    };
    probe_response("infra::http::cache_health", result)
}

fn probe_response(source: &'static str, result: Result<(), String>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(detail) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_message(source, StatusCode::SERVICE_UNAVAILABLE, detail)
                .attach(&mut response);
            response
        }
    }
}
