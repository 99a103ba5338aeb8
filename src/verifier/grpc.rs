//! gRPC verifier client
//!
//! Speaks the `AuditService` submit/poll protocol over a single lazily
//! connected channel. Plaintext transport; the verifier runs in-cluster.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use super::pb::audit_service_client::AuditServiceClient;
use super::pb::{
    AuditStatus, GetAuditResultRequest, HealthCheckRequest, SubmitAuditRequest,
};
use super::{ClaimVerdict, VerificationRecord, Verifier, VerifierError};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_POLL_ATTEMPTS: u32 = 30;
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Verifier backed by the remote `AuditService`.
pub struct GrpcVerifier {
    client: AuditServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcVerifier {
    /// Create a client for the given endpoint.
    ///
    /// The channel connects lazily on first use, so construction never blocks
    /// on the verifier being reachable.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(address.to_string())?.connect_lazy();
        Ok(Self {
            client: AuditServiceClient::new(channel),
            timeout,
        })
    }

    async fn submit_and_poll(
        &self,
        request_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<VerificationRecord, VerifierError> {
        // Channels are cheap to clone; each call gets its own client handle.
        let mut client = self.client.clone();

        let submit = client
            .submit_audit(SubmitAuditRequest {
                request_id: request_id.to_string(),
                query: prompt.to_string(),
                response: response.to_string(),
            })
            .await
            .map_err(|status| VerifierError::SubmissionFailed(status.to_string()))?;

        let audit_id = submit.into_inner().audit_id;
        debug!(request_id = %request_id, audit_id = %audit_id, "audit submitted");

        for attempt in 1..=MAX_POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let result = client
                .get_audit_result(GetAuditResultRequest {
                    audit_id: audit_id.clone(),
                })
                .await
                .map_err(|status| VerifierError::ResultFetchFailed(status.to_string()))?
                .into_inner();

            match result.status() {
                AuditStatus::Completed => {
                    return Ok(VerificationRecord {
                        audit_id: result.audit_id,
                        overall_score: result.faithfulness_score,
                        claims: result
                            .claims
                            .into_iter()
                            .map(|c| ClaimVerdict {
                                text: c.claim,
                                verdict: c.status,
                                confidence: c.confidence,
                            })
                            .collect(),
                        reasoning_trace: result.reasoning_trace,
                    });
                }
                AuditStatus::Failed => {
                    return Err(VerifierError::AuditFailed(audit_id));
                }
                status => {
                    debug!(
                        audit_id = %audit_id,
                        attempt,
                        status = status.as_str_name(),
                        "audit not terminal yet"
                    );
                }
            }
        }

        Err(VerifierError::AuditTimeout(self.timeout))
    }
}

#[async_trait]
impl Verifier for GrpcVerifier {
    async fn evaluate(
        &self,
        request_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<VerificationRecord, VerifierError> {
        match tokio::time::timeout(self.timeout, self.submit_and_poll(request_id, prompt, response))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(VerifierError::AuditTimeout(self.timeout)),
        }
    }

    async fn ping(&self) -> Result<(), VerifierError> {
        let mut client = self.client.clone();
        tokio::time::timeout(PING_TIMEOUT, client.health_check(HealthCheckRequest {}))
            .await
            .map_err(|_| VerifierError::AuditTimeout(PING_TIMEOUT))?
            .map_err(|status| VerifierError::ResultFetchFailed(status.to_string()))?;
        Ok(())
    }
}
