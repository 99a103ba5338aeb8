//! TrustGate - transparent interception gateway for OpenAI-compatible APIs
//!
//! This is the main entry point. It runs two servers: the proxy front-end
//! and the subscriber hub, shut down together on SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{info, warn};

use trustgate::{hub, routes, AppState, Config, Hub};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("trustgate={},tower_http=info", config.log_level).into()
            }),
        )
        .with_target(true)
        .init();

    info!("Starting TrustGate interception gateway");
    info!(
        upstream = %config.upstream_url,
        verifier = %config.grpc_address,
        read_timeout = ?config.read_timeout,
        write_timeout = ?config.write_timeout,
        "Configuration loaded"
    );

    // One set of counters shared by the hub and the request handlers
    let stats = trustgate::GatewayStats::new();

    // Start the subscriber hub event loop
    let (hub_handle, hub_loop) = Hub::new(stats.clone());
    let hub_task = tokio::spawn(hub_loop.run());

    // Initialize application state
    let state = Arc::new(AppState::new(config.clone(), hub_handle.clone(), stats)?);
    info!("Application state initialized");

    // Build the routers
    let app = routes::create_router(state.clone());
    let hub_app = hub::create_hub_router(hub_handle.clone());

    // Bind both listeners; a bind failure is fatal
    let api_addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let ws_addr: SocketAddr = format!("{}:{}", config.host, config.ws_port).parse()?;
    let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
    let ws_listener = tokio::net::TcpListener::bind(ws_addr).await?;
    info!(api = %api_addr, ws = %ws_addr, "Listening");

    // Both servers drain gracefully on the same signal
    let (shutdown_tx, _) = tokio::sync::watch::channel(false);

    let api_server = tokio::spawn({
        let mut shutdown = shutdown_tx.subscribe();
        async move {
            axum::serve(api_listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.changed().await;
                })
                .await
        }
    });
    let ws_server = tokio::spawn({
        let mut shutdown = shutdown_tx.subscribe();
        async move {
            axum::serve(ws_listener, hub_app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.changed().await;
                })
                .await
        }
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    // Bound the connection drain, then stop the pipeline back to front:
    // dispatcher first so in-flight jobs can still broadcast, hub last.
    let drain = async {
        let _ = api_server.await;
        let _ = ws_server.await;
    };
    if tokio::time::timeout(config.shutdown_timeout, drain)
        .await
        .is_err()
    {
        warn!("shutdown timeout elapsed with connections still open");
    }

    state.dispatcher.stop().await;
    hub_handle.shutdown().await;
    let _ = hub_task.await;

    info!("TrustGate shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown");
        }
    }
}
