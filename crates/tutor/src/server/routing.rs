//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use crate::server::handlers::{chat, professors, status};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/api", get(status::api_info))
    // Pipelines
    .route("/api/chat", post(chat::chat))
    .route("/api/scrape-professor", post(professors::scrape_professor))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
