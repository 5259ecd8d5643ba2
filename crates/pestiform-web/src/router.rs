//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    health,
    predict::{main_page, main_submit, api_predict},
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);
    router_with_state(shared)
}

/// Router over state the caller keeps a handle to.
pub fn router_with_state(shared: SharedState) -> Router {
    Router::new()
        // Pages
        .route("/",            get(main_page).post(main_submit))

        // API endpoints
        .route("/api/predict", post(api_predict))
        .route("/health",      get(health))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
