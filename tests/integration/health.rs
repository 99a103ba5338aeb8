//! Operational endpoint tests

use pretty_assertions::assert_eq;

use crate::common::{spawn_gateway, FakeVerifier};

#[tokio::test]
async fn health_reports_pipeline_state() {
    let gateway = spawn_gateway("http://127.0.0.1:9", Some(FakeVerifier::succeeding(0.9))).await;

    let response = gateway.server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["verifier_connected"], true);
    assert_eq!(body["subscribers"], 0);
    assert_eq!(body["stats"]["jobs_dropped"], 0);
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_number());
}

#[tokio::test]
async fn health_reflects_missing_verifier() {
    let gateway = spawn_gateway("http://127.0.0.1:9", None).await;

    let response = gateway.server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["verifier_connected"], false);
}

#[tokio::test]
async fn metrics_returns_placeholder() {
    let gateway = spawn_gateway("http://127.0.0.1:9", None).await;

    let response = gateway.server.get("/metrics").await;
    response.assert_status_ok();
    assert!(response.text().contains("metrics collection is not enabled"));
}
