//! Health check endpoint
//!
//! Liveness plus a view of the audit pipeline: whether the verifier channel
//! exists, how many subscribers are connected, and the gateway counters.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{stats::StatsSnapshot, AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    /// Whether the verifier RPC channel was created at startup
    pub verifier_connected: bool,
    pub subscribers: usize,
    pub stats: StatsSnapshot,
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        verifier_connected: state.verifier.is_some(),
        subscribers: state.hub.subscriber_count(),
        stats: state.stats.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
