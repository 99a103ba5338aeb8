//! Pass-through forwarding tests
//!
//! Models and embeddings are forwarded transparently with no capture.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{no_event_within, observe, spawn_gateway, FakeVerifier};

#[tokio::test]
async fn models_are_forwarded_verbatim() {
    let models = json!({
        "object": "list",
        "data": [{"id": "gpt-4o", "object": "model", "created": 1706745600, "owned_by": "openai"}]
    });

    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models.clone()))
        .expect(1)
        .mount(&mock)
        .await;

    let gateway = spawn_gateway(&mock.uri(), None).await;

    let response = gateway.server.get("/v1/models").await;
    response.assert_status_ok();
    assert!(response.headers().get("x-request-id").is_some());
    let body: serde_json::Value = response.json();
    assert_eq!(body, models);
}

#[tokio::test]
async fn single_model_lookup_is_forwarded() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/gpt-4o"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "gpt-4o", "object": "model", "created": 1706745600, "owned_by": "openai"
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let gateway = spawn_gateway(&mock.uri(), None).await;

    let response = gateway.server.get("/v1/models/gpt-4o").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], "gpt-4o");
}

#[tokio::test]
async fn embeddings_are_forwarded_without_capture() {
    let request_body = json!({"model": "text-embedding-3-small", "input": "hello"});

    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_json(request_body.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2]}]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let verifier = FakeVerifier::succeeding(0.9);
    let gateway = spawn_gateway(&mock.uri(), Some(verifier.clone())).await;
    let mut events = observe(&gateway.hub).await;

    let response = gateway.server.post("/v1/embeddings").json(&request_body).await;
    response.assert_status_ok();

    assert!(no_event_within(&mut events, Duration::from_millis(300)).await);
    assert_eq!(verifier.call_count(), 0);
}

#[tokio::test]
async fn passthrough_upstream_failure_returns_502() {
    let gateway = spawn_gateway("http://127.0.0.1:9", None).await;

    let response = gateway.server.get("/v1/models").await;
    assert_eq!(response.status_code(), 502);
}
