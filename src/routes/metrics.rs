//! Metrics endpoint
//!
//! Reserved for future use; metrics collection has not been wired up yet,
//! so the endpoint returns a placeholder body. Pipeline counters are
//! available through `/health` in the meantime.

use axum::http::header;
use axum::response::IntoResponse;

/// Placeholder metrics endpoint
pub async fn metrics_placeholder() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "# metrics collection is not enabled\n",
    )
}
