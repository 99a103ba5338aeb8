//! Configuration management for TrustGate
//!
//! Configuration is loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port the proxy front-end listens on
    pub port: u16,
    /// Port the subscriber hub listens on
    pub ws_port: u16,

    /// Maximum time to read a client request body
    pub read_timeout: Duration,
    /// Advisory response-write ceiling (logged at startup; see DESIGN.md)
    pub write_timeout: Duration,
    /// Maximum time to drain open connections on shutdown
    pub shutdown_timeout: Duration,

    /// Upstream inference endpoint base URL
    pub upstream_url: String,

    /// Verifier gRPC endpoint
    pub grpc_address: String,
    /// Outer deadline for a single verification round-trip
    pub grpc_timeout: Duration,

    /// Number of audit worker tasks
    pub worker_count: usize,
    /// Capacity of the audit job queue
    pub queue_size: usize,

    /// Default log level when RUST_LOG is not set
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,
            ws_port: env::var("WS_PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .context("Invalid WS_PORT")?,

            read_timeout: duration_secs("READ_TIMEOUT", 30)?,
            write_timeout: duration_secs("WRITE_TIMEOUT", 120)?,
            shutdown_timeout: duration_secs("SHUTDOWN_TIMEOUT", 10)?,

            upstream_url: env::var("UPSTREAM_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string())
                .trim_end_matches('/')
                .to_string(),

            grpc_address: normalize_grpc_address(
                &env::var("GRPC_ADDRESS").unwrap_or_else(|_| "localhost:50051".to_string()),
            ),
            grpc_timeout: duration_secs("GRPC_TIMEOUT", 30)?,

            worker_count: env::var("WORKER_COUNT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid WORKER_COUNT")?,
            queue_size: env::var("QUEUE_SIZE")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("Invalid QUEUE_SIZE")?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Parse a duration knob given in whole seconds
fn duration_secs(name: &str, default: u64) -> Result<Duration> {
    let secs = env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("Invalid {}", name))?;
    Ok(Duration::from_secs(secs))
}

/// The verifier address is commonly given as `host:port`; tonic endpoints
/// require a scheme, so bare addresses are normalized to plaintext http.
fn normalize_grpc_address(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}
