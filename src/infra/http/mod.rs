pub mod error;
mod handlers;
mod health;
mod middleware;
mod state;

pub use error::ApiError;
pub use middleware::RequestContext;
pub use state::HttpState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use middleware::{log_responses, set_request_context};

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/items", get(handlers::list_items))
        .route("/items/{id}", get(handlers::get_item))
        .route("/ratings", post(handlers::submit_rating))
        .route("/recommendations", get(handlers::recommendations))
        .route("/_health/db", get(health::db_health))
        .route("/_health/cache", get(health::cache_health))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
