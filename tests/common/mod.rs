//! Common test utilities for TrustGate
//!
//! Shared fixtures: test configuration, the fake verifier injected through
//! the `Verifier` capability, hub observers, and SSE body builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use tokio::sync::mpsc;

use trustgate::hub::Hub;
use trustgate::verifier::{ClaimVerdict, VerificationRecord, Verifier, VerifierError};
use trustgate::{AppState, Config, GatewayStats, HubHandle};

/// Build a Config pointed at a test upstream, with small knobs.
pub fn test_config(upstream_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ws_port: 0,
        read_timeout: Duration::from_secs(5),
        write_timeout: Duration::from_secs(5),
        shutdown_timeout: Duration::from_secs(1),
        upstream_url: upstream_url.trim_end_matches('/').to_string(),
        grpc_address: "http://127.0.0.1:50051".to_string(),
        grpc_timeout: Duration::from_secs(5),
        worker_count: 2,
        queue_size: 16,
        log_level: "info".to_string(),
    }
}

/// One recorded `evaluate` invocation.
#[derive(Debug, Clone)]
pub struct EvaluateCall {
    pub request_id: String,
    pub prompt: String,
    pub response: String,
}

pub enum FakeBehavior {
    Succeed {
        score: f64,
        claims: Vec<ClaimVerdict>,
    },
    FailAudit,
    TimeOut,
    /// Block on the semaphore before succeeding; lets tests hold workers busy.
    Blocked(Arc<tokio::sync::Semaphore>),
}

/// Scripted verifier injected through the capability trait.
pub struct FakeVerifier {
    calls: Mutex<Vec<EvaluateCall>>,
    behavior: FakeBehavior,
}

impl FakeVerifier {
    pub fn succeeding(score: f64) -> Arc<Self> {
        Self::with_behavior(FakeBehavior::Succeed {
            score,
            claims: vec![ClaimVerdict {
                text: "the response makes a claim".to_string(),
                verdict: "supported".to_string(),
                confidence: 0.9,
            }],
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::with_behavior(FakeBehavior::FailAudit)
    }

    pub fn timing_out() -> Arc<Self> {
        Self::with_behavior(FakeBehavior::TimeOut)
    }

    pub fn blocked_on(gate: Arc<tokio::sync::Semaphore>) -> Arc<Self> {
        Self::with_behavior(FakeBehavior::Blocked(gate))
    }

    pub fn with_behavior(behavior: FakeBehavior) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            behavior,
        })
    }

    pub fn calls(&self) -> Vec<EvaluateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Verifier for FakeVerifier {
    async fn evaluate(
        &self,
        request_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<VerificationRecord, VerifierError> {
        self.calls.lock().unwrap().push(EvaluateCall {
            request_id: request_id.to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
        });

        match &self.behavior {
            FakeBehavior::Succeed { score, claims } => Ok(VerificationRecord {
                audit_id: format!("audit-{request_id}"),
                overall_score: *score,
                claims: claims.clone(),
                reasoning_trace: "scripted trace".to_string(),
            }),
            FakeBehavior::FailAudit => Err(VerifierError::AuditFailed(request_id.to_string())),
            FakeBehavior::TimeOut => Err(VerifierError::AuditTimeout(Duration::from_secs(30))),
            FakeBehavior::Blocked(gate) => {
                let _permit = gate.acquire().await.unwrap();
                Ok(VerificationRecord {
                    audit_id: format!("audit-{request_id}"),
                    overall_score: 1.0,
                    claims: Vec::new(),
                    reasoning_trace: String::new(),
                })
            }
        }
    }

    async fn ping(&self) -> Result<(), VerifierError> {
        Ok(())
    }
}

/// A fully wired gateway over an in-process router.
pub struct TestGateway {
    pub server: TestServer,
    pub hub: HubHandle,
    pub stats: GatewayStats,
    pub state: Arc<AppState>,
}

pub async fn spawn_gateway(
    upstream_url: &str,
    verifier: Option<Arc<dyn Verifier>>,
) -> TestGateway {
    spawn_gateway_with_config(test_config(upstream_url), verifier).await
}

pub async fn spawn_gateway_with_config(
    config: Config,
    verifier: Option<Arc<dyn Verifier>>,
) -> TestGateway {
    let stats = GatewayStats::new();
    let (hub_handle, hub) = Hub::new(stats.clone());
    tokio::spawn(hub.run());

    let state = Arc::new(AppState::new_for_testing(
        config,
        verifier,
        hub_handle.clone(),
        stats.clone(),
    ));
    let server = TestServer::new(trustgate::routes::create_router(state.clone()))
        .expect("test server should start");

    TestGateway {
        server,
        hub: hub_handle,
        stats,
        state,
    }
}

/// Register an observer subscriber and swallow its welcome frame.
pub async fn observe(hub: &HubHandle) -> mpsc::Receiver<String> {
    let (tx, mut rx) = mpsc::channel(512);
    hub.register("observer".to_string(), tx).await;
    let welcome = next_event(&mut rx).await;
    assert_eq!(welcome["type"], "connected");
    rx
}

/// Receive and decode the next broadcast event, failing after two seconds.
pub async fn next_event(rx: &mut mpsc::Receiver<String>) -> serde_json::Value {
    let raw = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for broadcast event")
        .expect("subscriber buffer closed");
    serde_json::from_str(&raw).expect("broadcast events are JSON")
}

/// True when nothing is broadcast within the window.
pub async fn no_event_within(rx: &mut mpsc::Receiver<String>, window: Duration) -> bool {
    tokio::time::timeout(window, rx.recv()).await.is_err()
}

/// OpenAI-style chat completion envelope.
pub fn chat_envelope(model: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test123",
        "object": "chat.completion",
        "created": 1706745600,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18}
    })
}

/// OpenAI-style SSE stream with one delta frame per fragment.
pub fn sse_stream(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let frame = serde_json::json!({
            "choices": [{"index": 0, "delta": {"content": fragment}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {frame}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}
