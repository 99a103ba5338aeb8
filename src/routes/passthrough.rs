//! Pass-through proxy handler
//!
//! Transparent forwarding for endpoints that carry no auditable completion
//! (models, embeddings). The body is not parsed; the response streams back
//! to the client.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, Method, Response},
};
use http_body_util::BodyExt;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    proxy::upstream::into_streaming_response,
    routes::chat::resolve_request_id,
    AppState,
};

/// Forward a request to the upstream endpoint without capture.
pub async fn passthrough_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    request: Request,
) -> AppResult<Response<Body>> {
    let path = uri.path().to_string();
    let request_id = resolve_request_id(&headers);
    state.stats.inc_requests_proxied();

    info!(method = %method, path = %path, request_id = %request_id, "forwarding pass-through request");

    let body = request
        .into_body()
        .collect()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to read request body: {}", e)))?
        .to_bytes();

    let upstream = state
        .upstream
        .forward(method, &path, &headers, body, &request_id)
        .await?;

    Ok(into_streaming_response(upstream, &request_id))
}
