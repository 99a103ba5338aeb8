//! Intercept-and-audit endpoints
//!
//! OpenAI-compatible chat/completion endpoints. The request is forwarded to
//! the upstream endpoint byte-for-byte while a parsed view drives prompt
//! extraction and the streaming/buffered choice; the response is delivered to
//! the client unchanged and duplicated into the audit pipeline.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{header, HeaderMap, Method, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    audit::CaptureJob,
    capture::{
        extract::{ChatMessage, InterceptedRequest},
        extract_prompt, parse_envelope_content, reconstruct_sse_content, TeeBuffer,
    },
    error::{AppError, AppResult},
    proxy::{generate_request_id, upstream::is_hop_by_hop_header, REQUEST_ID_HEADER, TEST_MODE_HEADER},
    AppState,
};

/// Usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

/// Chat completion response envelope, used for synthesized test-mode replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Usage,
}

/// Handle chat and legacy completion requests
///
/// The parsed body is advisory only; the original bytes are what goes
/// upstream. A `test_response` field short-circuits the upstream call and
/// synthesizes the reply locally.
pub async fn intercept_chat(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    request: Request,
) -> AppResult<Response<Body>> {
    let path = uri.path().to_string();
    let request_id = resolve_request_id(&headers);
    state.stats.inc_requests_proxied();

    let body = tokio::time::timeout(
        state.config.read_timeout,
        axum::body::to_bytes(request.into_body(), usize::MAX),
    )
    .await
    .map_err(|_| AppError::BadRequest("timed out reading request body".to_string()))?
    .map_err(|e| AppError::BadRequest(format!("failed to read request body: {}", e)))?;

    let parsed: InterceptedRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {}", e)))?;
    let prompt = extract_prompt(&parsed.messages);

    info!(
        request_id = %request_id,
        path = %path,
        model = %parsed.model,
        stream = parsed.stream,
        messages = parsed.messages.len(),
        "intercepting request"
    );

    // An empty test_response is treated as absent.
    if let Some(test_response) = parsed
        .test_response
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        return Ok(test_mode_response(
            &state,
            &parsed,
            prompt,
            test_response,
            &request_id,
            &path,
        ));
    }

    let upstream = state
        .upstream
        .forward(method, &path, &headers, body, &request_id)
        .await?;

    if parsed.stream {
        Ok(stream_and_capture(state, upstream, parsed, prompt, request_id, path))
    } else {
        buffer_and_capture(state, upstream, parsed, prompt, request_id, path).await
    }
}

/// Resolve the correlation id from the client header or mint a fresh one.
pub(crate) fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_request_id)
}

/// Synthesize a completion locally and audit it, skipping upstream entirely.
fn test_mode_response(
    state: &AppState,
    parsed: &InterceptedRequest,
    prompt: String,
    test_response: &str,
    request_id: &str,
    path: &str,
) -> Response<Body> {
    let envelope = ChatCompletionResponse {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
        object: "chat.completion".to_string(),
        created: chrono::Utc::now().timestamp(),
        model: parsed.model.clone(),
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content: test_response.to_string(),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: Usage {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
        },
    };

    state.dispatcher.submit(CaptureJob::new(
        request_id.to_string(),
        prompt,
        test_response.to_string(),
        parsed.model.clone(),
        parsed.user.clone(),
        path.to_string(),
    ));

    let mut response = (StatusCode::OK, Json(envelope)).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = request_id.parse() {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    headers.insert(TEST_MODE_HEADER, header::HeaderValue::from_static("test"));
    response
}

/// Buffered path: read the whole upstream body, capture the assistant text,
/// then hand the bytes to the client unchanged.
async fn buffer_and_capture(
    state: Arc<AppState>,
    upstream: reqwest::Response,
    parsed: InterceptedRequest,
    prompt: String,
    request_id: String,
    path: String,
) -> AppResult<Response<Body>> {
    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();
    let body = upstream.bytes().await.map_err(|e| {
        AppError::UpstreamError(format!("failed to read upstream response: {}", e))
    })?;

    let captured = parse_envelope_content(&body);
    if !captured.is_empty() {
        state.dispatcher.submit(CaptureJob::new(
            request_id.clone(),
            prompt,
            captured,
            parsed.model,
            parsed.user,
            path,
        ));
    }

    let mut builder = Response::builder().status(status);
    for (name, value) in upstream_headers.iter() {
        if is_hop_by_hop_header(name)
            || *name == header::CONTENT_LENGTH
            || name.as_str() == REQUEST_ID_HEADER
        {
            continue;
        }
        builder = builder.header(name, value);
    }
    builder = builder.header(REQUEST_ID_HEADER, request_id.as_str());

    builder
        .body(Body::from(body))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build response: {}", e)))
}

/// Streaming path: forward upstream chunks as they arrive while teeing them
/// into an in-memory buffer; reconstruct and capture once the stream ends.
fn stream_and_capture(
    state: Arc<AppState>,
    upstream: reqwest::Response,
    parsed: InterceptedRequest,
    prompt: String,
    request_id: String,
    path: String,
) -> Response<Body> {
    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();

    let tee = TeeBuffer::new();
    let dispatcher = state.dispatcher.clone();
    let upstream_stream = upstream.bytes_stream();
    let stream_request_id = request_id.clone();

    let body_stream = async_stream::stream! {
        futures::pin_mut!(upstream_stream);
        let mut failed = false;

        while let Some(chunk) = upstream_stream.next().await {
            match chunk {
                Ok(bytes) => {
                    tee.append(&bytes);
                    yield Ok::<Bytes, reqwest::Error>(bytes);
                }
                Err(e) => {
                    warn!(
                        request_id = %stream_request_id,
                        error = %e,
                        "upstream stream error, abandoning capture"
                    );
                    failed = true;
                    yield Err(e);
                    break;
                }
            }
        }

        if !failed {
            let captured = reconstruct_sse_content(&tee.contents());
            if !captured.is_empty() {
                dispatcher.submit(CaptureJob::new(
                    stream_request_id,
                    prompt,
                    captured,
                    parsed.model,
                    parsed.user,
                    path,
                ));
            }
        }
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in upstream_headers.iter() {
        if is_hop_by_hop_header(name)
            || *name == header::CONTENT_TYPE
            || *name == header::CONTENT_LENGTH
            || *name == header::CACHE_CONTROL
            || *name == header::CONNECTION
            || name.as_str() == REQUEST_ID_HEADER
        {
            continue;
        }
        builder = builder.header(name, value);
    }

    builder
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header(REQUEST_ID_HEADER, request_id.as_str())
        .body(Body::from_stream(body_stream))
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to build streaming response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
