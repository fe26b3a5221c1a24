pub mod health;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/match/score", post(handlers::handle_score))
        .route("/api/v1/match/analyze", post(handlers::handle_analyze))
        .route("/api/v1/match/extract", post(handlers::handle_extract))
        .route("/api/v1/match/rank-jobs", post(handlers::handle_rank_jobs))
        .layer(body_limit)
        .with_state(state)
}
