//! HTTP routes for the proxy front-end
//!
//! This module defines all HTTP endpoints exposed on the proxy port. The
//! subscriber hub has its own router on a separate port (see `hub::routes`).

pub mod chat;
pub mod health;
pub mod metrics;
pub mod passthrough;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Intercept-and-audit endpoints
        .route("/v1/chat/completions", post(chat::intercept_chat))
        .route("/v1/completions", post(chat::intercept_chat))
        // Transparent forwarding, no capture
        .route("/v1/models", get(passthrough::passthrough_handler))
        .route("/v1/models/:model_id", get(passthrough::passthrough_handler))
        .route("/v1/embeddings", post(passthrough::passthrough_handler))
        // Operational endpoints
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_placeholder))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
