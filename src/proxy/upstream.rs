//! Upstream forwarding
//!
//! The gateway is transparent: client headers go upstream verbatim (minus
//! hop-by-hop headers and the ones the HTTP client owns), and upstream
//! response headers come back the same way. The shared client keeps a
//! connection pool warm and carries a generous ceiling for streamed
//! completions.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Method, Response};
use bytes::Bytes;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};

use super::REQUEST_ID_HEADER;

/// Idle connections kept per upstream host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 10;
/// Idle connections are recycled after this long.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
/// Per-request ceiling, sized for long streamed completions.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Hop-by-hop headers that must never be forwarded in either direction.
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Check if a header is a hop-by-hop header that should not be forwarded
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name)
}

/// Build the shared upstream HTTP client with connection pooling.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Client for the upstream inference endpoint.
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Forward a request to `{base_url}{path}` preserving the original method
    /// and every client header (Authorization included), with the correlation
    /// id set.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        incoming_headers: &HeaderMap,
        body: Bytes,
        request_id: &str,
    ) -> AppResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, method = %method, body_len = body.len(), "forwarding to upstream");

        let mut builder = self.client.request(method.clone(), &url);
        for (name, value) in incoming_headers {
            if is_hop_by_hop_header(name)
                || *name == header::HOST
                || *name == header::CONTENT_LENGTH
                || name.as_str() == REQUEST_ID_HEADER
            {
                continue;
            }
            builder = builder.header(name, value);
        }
        builder = builder.header(REQUEST_ID_HEADER, request_id);

        if method != Method::GET && method != Method::HEAD {
            builder = builder.body(body);
        }

        builder.send().await.map_err(|e| {
            error!(url = %url, error = %e, "upstream request failed");
            AppError::UpstreamError(format!("upstream request failed: {}", e))
        })
    }
}

/// Convert an upstream response into a client response, streaming the body
/// verbatim. Used by the passthrough routes.
pub fn into_streaming_response(upstream: reqwest::Response, request_id: &str) -> Response<Body> {
    let status = upstream.status();
    let headers = upstream.headers().clone();

    let mut builder = Response::builder().status(status);
    for (name, value) in headers.iter() {
        if is_hop_by_hop_header(name) || name.as_str() == REQUEST_ID_HEADER {
            continue;
        }
        builder = builder.header(name, value);
    }
    builder = builder.header(REQUEST_ID_HEADER, request_id);

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|e| {
            error!(error = %e, "failed to build passthrough response");
            Response::builder()
                .status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty())
                .expect("static response should build")
        })
}
