//! Broadcast event envelope and payloads
//!
//! Every frame pushed to subscribers is a JSON envelope
//! `{"type", "timestamp", "data"}`. The dispatcher serializes `audit_result`
//! events once before publishing; everything else is serialized in the hub
//! event loop.

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const EVENT_CONNECTED: &str = "connected";
pub const EVENT_AUDIT_RESULT: &str = "audit_result";
pub const EVENT_AUDIT_ERROR: &str = "audit_error";

/// Outbound event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: String,
    pub data: serde_json::Value,
}

impl Envelope {
    fn new(event_type: &str, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            data,
        }
    }

    /// Welcome frame enqueued right after a subscriber registers.
    pub fn connected(subscriber_id: &str) -> Self {
        Self::new(
            EVENT_CONNECTED,
            serde_json::json!({ "request_id": subscriber_id }),
        )
    }

    /// Completed verification, full scoring payload.
    pub fn audit_result(payload: &AuditResultPayload) -> Self {
        let data = serde_json::to_value(payload)
            .expect("AuditResultPayload should always serialize");
        Self::new(EVENT_AUDIT_RESULT, data)
    }

    /// Verification failure bound to the originating request.
    pub fn audit_error(request_id: &str, error: &str) -> Self {
        Self::new(
            EVENT_AUDIT_ERROR,
            serde_json::json!({ "request_id": request_id, "error": error }),
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("Envelope should always serialize")
    }
}

/// Scored verification outcome for one intercepted request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResultPayload {
    pub audit_id: String,
    pub request_id: String,
    pub user_query: String,
    pub llm_response: String,
    pub faithfulness_score: f64,
    pub relevancy_score: f64,
    pub overall_score: f64,
    pub hallucination_detected: bool,
    pub claims: Vec<ClaimPayload>,
    pub reasoning_trace: String,
    pub processing_time_ms: u64,
    pub timestamp: String,
    pub provider: String,
    pub model: String,
}

/// Claim verdict in the broadcast vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimPayload {
    pub claim: String,
    pub status: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
}
