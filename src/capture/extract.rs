//! Prompt and assistant-text extraction
//!
//! The gateway parses client requests and upstream responses only as far as
//! auditing requires. The parsed request view is advisory: the original body
//! bytes are always what gets forwarded upstream.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Advisory view of an intercepted chat/completion request.
///
/// Unknown fields are ignored so the parse keeps up with upstream schema
/// additions; `messages` defaults to empty for the legacy completions shape.
#[derive(Debug, Clone, Deserialize)]
pub struct InterceptedRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub test_response: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Role-tagged conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Non-streaming chat completion envelope, parsed only for the assistant text
#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    choices: Vec<EnvelopeChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeChoice {
    #[serde(default)]
    message: EnvelopeMessage,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Streaming chunk, parsed only for the delta content
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Build the audit prompt from the conversation.
///
/// Messages are kept in declared order; only `system` and `user` roles
/// participate, each formatted as `[<role>]: <content>` and joined with a
/// newline. Assistant turns are the material under audit, not part of it.
pub fn extract_prompt(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.role == "system" || m.role == "user")
        .map(|m| format!("[{}]: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pull the assistant text out of a buffered chat completion body.
///
/// Returns the empty string when the envelope does not parse; the audit path
/// is best-effort and never fails the request over a malformed upstream body.
pub fn parse_envelope_content(body: &[u8]) -> String {
    match serde_json::from_slice::<ChatEnvelope>(body) {
        Ok(envelope) => envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default(),
        Err(e) => {
            debug!(error = %e, "upstream envelope did not parse, skipping capture");
            String::new()
        }
    }
}

/// Reconstruct the assistant text from a captured SSE stream.
///
/// Only `data: ` lines participate; the scan stops at the first `[DONE]`
/// marker; every `choices[0].delta.content` fragment is appended in arrival
/// order. Lines that fail to decode are skipped.
pub fn reconstruct_sse_content(captured: &[u8]) -> String {
    let text = String::from_utf8_lossy(captured);
    let mut content = String::new();

    for line in text.split('\n') {
        let Some(payload) = line.strip_prefix("data: ") else {
            continue;
        };
        let payload = payload.trim();
        if payload == "[DONE]" {
            break;
        }
        match serde_json::from_str::<StreamChunk>(payload) {
            Ok(chunk) => {
                if let Some(fragment) = chunk
                    .choices
                    .first()
                    .and_then(|c| c.delta.content.as_deref())
                {
                    if !fragment.is_empty() {
                        content.push_str(fragment);
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, line_len = payload.len(), "skipping unparseable SSE line");
            }
        }
    }

    content
}
