//! Atomic gateway statistics counters.
//!
//! Lock-free counters for the audit pipeline, surfaced through `/health`.
//! All atomics use `Relaxed` ordering; these are monotonic display counters
//! with no synchronization requirements.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

struct StatsInner {
    requests_proxied: AtomicU64,
    jobs_submitted: AtomicU64,
    jobs_dropped: AtomicU64,
    events_broadcast: AtomicU64,
    subscribers_evicted: AtomicU64,
}

/// Thread-safe atomic gateway statistics. Cheap to clone (Arc).
#[derive(Clone)]
pub struct GatewayStats {
    inner: Arc<StatsInner>,
}

/// Snapshot of current stats values, serializable to JSON.
#[derive(Debug, Serialize)]
pub struct StatsSnapshot {
    pub requests_proxied: u64,
    pub jobs_submitted: u64,
    pub jobs_dropped: u64,
    pub events_broadcast: u64,
    pub subscribers_evicted: u64,
}

impl Default for GatewayStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatsInner {
                requests_proxied: AtomicU64::new(0),
                jobs_submitted: AtomicU64::new(0),
                jobs_dropped: AtomicU64::new(0),
                events_broadcast: AtomicU64::new(0),
                subscribers_evicted: AtomicU64::new(0),
            }),
        }
    }

    pub fn inc_requests_proxied(&self) {
        self.inner.requests_proxied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_jobs_submitted(&self) {
        self.inner.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_jobs_dropped(&self) {
        self.inner.jobs_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_events_broadcast(&self) {
        self.inner.events_broadcast.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_subscribers_evicted(&self) {
        self.inner.subscribers_evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn jobs_dropped(&self) -> u64 {
        self.inner.jobs_dropped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_proxied: self.inner.requests_proxied.load(Ordering::Relaxed),
            jobs_submitted: self.inner.jobs_submitted.load(Ordering::Relaxed),
            jobs_dropped: self.inner.jobs_dropped.load(Ordering::Relaxed),
            events_broadcast: self.inner.events_broadcast.load(Ordering::Relaxed),
            subscribers_evicted: self.inner.subscribers_evicted.load(Ordering::Relaxed),
        }
    }
}
