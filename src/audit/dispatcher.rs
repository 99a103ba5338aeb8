//! Bounded audit dispatcher
//!
//! A fixed pool of worker tasks drains the capture-job queue, runs each job
//! through the verifier, and publishes the outcome to the hub. Submission is
//! fire-and-forget: when the queue is full the job is dropped and counted,
//! and the request that produced it is unaffected.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::hub::{AuditResultPayload, ClaimPayload, Envelope, HubHandle};
use crate::stats::GatewayStats;
use crate::verifier::{VerificationRecord, Verifier};

use super::job::CaptureJob;
use super::verdict;

/// Provider tag stamped on broadcast payloads.
const PROVIDER: &str = "openai";

/// Bounded worker pool bridging capture → verify → publish.
pub struct Dispatcher {
    /// None when the queue capacity is zero; every submission drops.
    queue: Option<async_channel::Sender<CaptureJob>>,
    workers: std::sync::Mutex<Vec<JoinHandle<()>>>,
    stats: GatewayStats,
}

impl Dispatcher {
    pub fn new(
        worker_count: usize,
        queue_size: usize,
        verifier: Option<Arc<dyn Verifier>>,
        hub: HubHandle,
        stats: GatewayStats,
    ) -> Self {
        if queue_size == 0 {
            warn!("audit queue capacity is zero, every capture job will be dropped");
            return Self {
                queue: None,
                workers: std::sync::Mutex::new(Vec::new()),
                stats,
            };
        }

        let (tx, rx) = async_channel::bounded(queue_size);
        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            workers.push(tokio::spawn(worker_loop(
                worker_id,
                rx.clone(),
                verifier.clone(),
                hub.clone(),
            )));
        }

        info!(worker_count, queue_size, "audit dispatcher started");
        Self {
            queue: Some(tx),
            workers: std::sync::Mutex::new(workers),
            stats,
        }
    }

    /// Queue a capture job without blocking. Drops on a full queue.
    pub fn submit(&self, job: CaptureJob) {
        let Some(queue) = &self.queue else {
            self.stats.inc_jobs_dropped();
            return;
        };

        match queue.try_send(job) {
            Ok(()) => {
                self.stats.inc_jobs_submitted();
            }
            Err(async_channel::TrySendError::Full(job)) => {
                self.stats.inc_jobs_dropped();
                warn!(request_id = %job.request_id, "audit queue full, dropping job");
            }
            Err(async_channel::TrySendError::Closed(job)) => {
                self.stats.inc_jobs_dropped();
                warn!(request_id = %job.request_id, "audit queue closed, dropping job");
            }
        }
    }

    /// Close the queue and wait for every worker to finish its current job.
    pub async fn stop(&self) {
        if let Some(queue) = &self.queue {
            queue.close();
        }
        let workers = std::mem::take(&mut *self.workers.lock().unwrap());
        for worker in workers {
            let _ = worker.await;
        }
        info!("audit dispatcher stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: async_channel::Receiver<CaptureJob>,
    verifier: Option<Arc<dyn Verifier>>,
    hub: HubHandle,
) {
    while let Ok(job) = queue.recv().await {
        process_job(job, verifier.as_deref(), &hub).await;
    }
    debug!(worker_id, "audit worker exiting");
}

async fn process_job(job: CaptureJob, verifier: Option<&dyn Verifier>, hub: &HubHandle) {
    let started = Instant::now();

    let Some(verifier) = verifier else {
        debug!(request_id = %job.request_id, "no verifier configured, skipping job");
        return;
    };

    match verifier
        .evaluate(&job.request_id, &job.prompt, &job.response)
        .await
    {
        Ok(record) => {
            let payload = compose_result(&job, &record, started.elapsed().as_millis() as u64);
            info!(
                request_id = %job.request_id,
                audit_id = %payload.audit_id,
                overall_score = payload.overall_score,
                hallucination = payload.hallucination_detected,
                processing_time_ms = payload.processing_time_ms,
                "verification completed"
            );
            hub.publish_json(Envelope::audit_result(&payload).to_json())
                .await;
        }
        Err(e) => {
            warn!(request_id = %job.request_id, error = %e, "verification failed");
            hub.broadcast(Envelope::audit_error(&job.request_id, &e.to_string()))
                .await;
        }
    }
}

/// Build the broadcast payload for a completed verification.
///
/// Faithfulness, relevancy and overall are all the verifier's single score;
/// the evidence list is intentionally empty.
fn compose_result(
    job: &CaptureJob,
    record: &VerificationRecord,
    processing_time_ms: u64,
) -> AuditResultPayload {
    AuditResultPayload {
        audit_id: record.audit_id.clone(),
        request_id: job.request_id.clone(),
        user_query: job.prompt.clone(),
        llm_response: job.response.clone(),
        faithfulness_score: record.overall_score,
        relevancy_score: record.overall_score,
        overall_score: record.overall_score,
        hallucination_detected: verdict::is_hallucination(record.overall_score),
        claims: record
            .claims
            .iter()
            .map(|c| ClaimPayload {
                claim: c.text.clone(),
                status: verdict::map_claim_status(&c.verdict).to_string(),
                confidence: c.confidence,
                evidence: Vec::new(),
            })
            .collect(),
        reasoning_trace: record.reasoning_trace.clone(),
        processing_time_ms,
        timestamp: Utc::now().to_rfc3339(),
        provider: PROVIDER.to_string(),
        model: job.model.clone(),
    }
}
