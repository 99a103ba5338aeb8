//! TrustGate - transparent interception gateway for OpenAI-compatible APIs
//!
//! This library provides the core functionality for the TrustGate proxy
//! server. It forwards chat requests to an upstream inference endpoint,
//! captures the responses, submits prompt/response pairs to an external
//! verification service, and fans the scores out to monitoring subscribers.

pub mod audit;
pub mod capture;
pub mod config;
pub mod error;
pub mod hub;
pub mod proxy;
pub mod routes;
pub mod stats;
pub mod verifier;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::warn;

pub use crate::audit::Dispatcher;
pub use crate::config::Config;
pub use crate::hub::{Hub, HubHandle};
pub use crate::proxy::UpstreamClient;
pub use crate::stats::GatewayStats;
pub use crate::verifier::{GrpcVerifier, Verifier};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
    /// None when the verifier channel could not be created; auditing is then
    /// disabled and the proxy keeps serving (fail-open).
    pub verifier: Option<Arc<dyn Verifier>>,
    pub dispatcher: Arc<Dispatcher>,
    pub hub: HubHandle,
    pub stats: GatewayStats,
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `stats` is shared with the hub event loop so `/health` sees one set
    /// of counters.
    pub fn new(config: Config, hub: HubHandle, stats: GatewayStats) -> Result<Self> {
        let http_client = proxy::upstream::build_http_client()?;
        let upstream = UpstreamClient::new(http_client, config.upstream_url.clone());

        let verifier: Option<Arc<dyn Verifier>> =
            match GrpcVerifier::new(&config.grpc_address, config.grpc_timeout) {
                Ok(v) => Some(Arc::new(v)),
                Err(e) => {
                    warn!(
                        address = %config.grpc_address,
                        error = %e,
                        "failed to create verifier channel, auditing disabled"
                    );
                    None
                }
            };

        let dispatcher = Arc::new(Dispatcher::new(
            config.worker_count,
            config.queue_size,
            verifier.clone(),
            hub.clone(),
            stats.clone(),
        ));

        Ok(Self {
            config,
            upstream,
            verifier,
            dispatcher,
            hub,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Create an application state for testing with an injected verifier.
    ///
    /// The upstream URL in `config` typically points at a wiremock server;
    /// no gRPC channel is created.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(
        config: Config,
        verifier: Option<Arc<dyn Verifier>>,
        hub: HubHandle,
        stats: GatewayStats,
    ) -> Self {
        let upstream = UpstreamClient::new(reqwest::Client::new(), config.upstream_url.clone());
        let dispatcher = Arc::new(Dispatcher::new(
            config.worker_count,
            config.queue_size,
            verifier.clone(),
            hub.clone(),
            stats.clone(),
        ));

        Self {
            config,
            upstream,
            verifier,
            dispatcher,
            hub,
            stats,
            start_time: Instant::now(),
        }
    }
}
