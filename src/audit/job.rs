//! Capture jobs

use chrono::{DateTime, Utc};

/// A prompt/response pair captured from one intercepted request, plus the
/// metadata the broadcast payload needs. Created after the response body has
/// been fully observed; owned by the dispatcher queue from submission on.
#[derive(Debug, Clone)]
pub struct CaptureJob {
    /// Correlation id, client-supplied or minted
    pub request_id: String,
    /// Formatted conversation prompt
    pub prompt: String,
    /// Captured assistant text
    pub response: String,
    pub model: String,
    /// End-user tag from the request body, when present
    pub user: Option<String>,
    /// Original request path
    pub path: String,
    pub submitted_at: DateTime<Utc>,
}

impl CaptureJob {
    pub fn new(
        request_id: String,
        prompt: String,
        response: String,
        model: String,
        user: Option<String>,
        path: String,
    ) -> Self {
        Self {
            request_id,
            prompt,
            response,
            model,
            user,
            path,
            submitted_at: Utc::now(),
        }
    }
}
