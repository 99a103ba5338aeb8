//! Verifier client
//!
//! The external verification service is reached over gRPC with a submit/poll
//! contract. The rest of the gateway holds the verifier through the
//! [`Verifier`] capability so tests can inject fakes.

pub mod grpc;
pub mod pb;

pub use grpc::GrpcVerifier;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Verification failures, kept narrow so the dispatcher can surface them
/// unchanged in `audit_error` events.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("audit submission failed: {0}")]
    SubmissionFailed(String),

    #[error("audit result fetch failed: {0}")]
    ResultFetchFailed(String),

    #[error("audit failed: {0}")]
    AuditFailed(String),

    #[error("audit timed out after {0:?}")]
    AuditTimeout(Duration),
}

/// One claim extracted by the verifier, verdict left in its raw dialect.
#[derive(Debug, Clone)]
pub struct ClaimVerdict {
    pub text: String,
    pub verdict: String,
    pub confidence: f64,
}

/// Normalized terminal result of a verification round-trip.
#[derive(Debug, Clone)]
pub struct VerificationRecord {
    pub audit_id: String,
    /// Overall faithfulness in [0, 1]
    pub overall_score: f64,
    pub claims: Vec<ClaimVerdict>,
    /// Opaque reasoning trace, may be empty
    pub reasoning_trace: String,
}

/// Capability set for the verification service.
///
/// The underlying connection is released when the implementation is dropped.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Submit a prompt/response pair and wait for a terminal result.
    async fn evaluate(
        &self,
        request_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<VerificationRecord, VerifierError>;

    /// Liveness probe against the verifier service.
    async fn ping(&self) -> Result<(), VerifierError>;
}
