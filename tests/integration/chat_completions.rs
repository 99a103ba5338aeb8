//! Intercept-and-audit endpoint tests
//!
//! Covers test mode, buffered capture, prompt formatting, header
//! transparency, and the error paths of `/v1/chat/completions`.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    chat_envelope, next_event, no_event_within, observe, spawn_gateway, FakeVerifier,
};

/// An upstream that must never be reached.
const DEAD_UPSTREAM: &str = "http://127.0.0.1:9";

#[tokio::test]
async fn test_mode_happy_path() {
    let verifier = FakeVerifier::succeeding(0.95);
    let gateway = spawn_gateway(DEAD_UPSTREAM, Some(verifier.clone())).await;
    let mut events = observe(&gateway.hub).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": "m",
            "messages": [{"role": "user", "content": "hi"}],
            "test_response": "Paris is the capital of France."
        }))
        .await;

    response.assert_status_ok();
    let headers = response.headers();
    assert_eq!(
        headers.get("x-trustagent-mode").unwrap().to_str().unwrap(),
        "test"
    );
    let request_id = headers
        .get("x-request-id")
        .expect("every response carries a correlation id")
        .to_str()
        .unwrap()
        .to_string();

    let body: serde_json::Value = response.json();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "Paris is the capital of France."
    );

    let event = next_event(&mut events).await;
    assert_eq!(event["type"], "audit_result");
    assert_eq!(event["data"]["request_id"], request_id);
    assert_eq!(event["data"]["user_query"], "[user]: hi");
    assert_eq!(event["data"]["llm_response"], "Paris is the capital of France.");
    assert_eq!(event["data"]["model"], "m");
    assert!(no_event_within(&mut events, Duration::from_millis(200)).await);
}

#[tokio::test]
async fn test_mode_empty_test_response_goes_upstream() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_envelope("m", "real answer")))
        .expect(1)
        .mount(&mock)
        .await;

    let verifier = FakeVerifier::succeeding(0.9);
    let gateway = spawn_gateway(&mock.uri(), Some(verifier.clone())).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": "m",
            "messages": [{"role": "user", "content": "hi"}],
            "test_response": ""
        }))
        .await;

    response.assert_status_ok();
    assert!(response.headers().get("x-trustagent-mode").is_none());
}

#[tokio::test]
async fn buffered_capture_submits_envelope_content() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_envelope("gpt-4o", "The Eiffel Tower is in Paris.")),
        )
        .expect(1)
        .mount(&mock)
        .await;

    let verifier = FakeVerifier::succeeding(0.9);
    let gateway = spawn_gateway(&mock.uri(), Some(verifier.clone())).await;
    let mut events = observe(&gateway.hub).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer secret-token"),
        )
        .json(&json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "assistant", "content": "ignored"},
                {"role": "user", "content": "q?"}
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "The Eiffel Tower is in Paris."
    );

    let event = next_event(&mut events).await;
    assert_eq!(event["type"], "audit_result");
    assert_eq!(event["data"]["user_query"], "[system]: be brief\n[user]: q?");
    assert_eq!(event["data"]["llm_response"], "The Eiffel Tower is in Paris.");
    assert_eq!(event["data"]["claims"][0]["status"], "SUPPORTED");
    assert_eq!(event["data"]["claims"][0]["evidence"], json!([]));

    let calls = verifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "[system]: be brief\n[user]: q?");
    assert_eq!(calls[0].response, "The Eiffel Tower is in Paris.");
}

#[tokio::test]
async fn client_supplied_request_id_is_preserved() {
    let verifier = FakeVerifier::succeeding(0.9);
    let gateway = spawn_gateway(DEAD_UPSTREAM, Some(verifier)).await;
    let mut events = observe(&gateway.hub).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-supplied-1"),
        )
        .json(&json!({
            "model": "m",
            "messages": [{"role": "user", "content": "hi"}],
            "test_response": "ok"
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap(),
        "req-supplied-1"
    );

    let event = next_event(&mut events).await;
    assert_eq!(event["data"]["request_id"], "req-supplied-1");
}

#[tokio::test]
async fn malformed_body_returns_400() {
    let gateway = spawn_gateway(DEAD_UPSTREAM, None).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .text("{not json")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn upstream_connect_failure_returns_502() {
    let gateway = spawn_gateway(DEAD_UPSTREAM, None).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": "m",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .await;

    assert_eq!(response.status_code(), 502);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn empty_assistant_content_submits_nothing() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_envelope("m", "")))
        .mount(&mock)
        .await;

    let verifier = FakeVerifier::succeeding(0.9);
    let gateway = spawn_gateway(&mock.uri(), Some(verifier.clone())).await;
    let mut events = observe(&gateway.hub).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .json(&json!({"model": "m", "messages": []}))
        .await;

    response.assert_status_ok();
    assert!(no_event_within(&mut events, Duration::from_millis(300)).await);
    assert_eq!(verifier.call_count(), 0);
    assert_eq!(gateway.stats.snapshot().jobs_submitted, 0);
}

#[tokio::test]
async fn legacy_completions_endpoint_forwards_without_capture() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "object": "text_completion",
            "choices": [{"index": 0, "text": "done", "finish_reason": "stop"}]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let verifier = FakeVerifier::succeeding(0.9);
    let gateway = spawn_gateway(&mock.uri(), Some(verifier.clone())).await;
    let mut events = observe(&gateway.hub).await;

    let response = gateway
        .server
        .post("/v1/completions")
        .json(&json!({"model": "m", "prompt": "say done"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["choices"][0]["text"], "done");

    // No chat envelope content, so nothing is auditable.
    assert!(no_event_within(&mut events, Duration::from_millis(300)).await);
    assert_eq!(verifier.call_count(), 0);
}

#[tokio::test]
async fn upstream_error_status_passes_through() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": "rate limited"})),
        )
        .mount(&mock)
        .await;

    let gateway = spawn_gateway(&mock.uri(), None).await;

    let response = gateway
        .server
        .post("/v1/chat/completions")
        .json(&json!({"model": "m", "messages": [{"role": "user", "content": "hi"}]}))
        .await;

    assert_eq!(response.status_code(), 429);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "rate limited");
}
