//! WebSocket endpoint for monitoring subscribers

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use super::subscriber::{
    read_pump, write_pump, WsSink, WsSource, MAX_MESSAGE_SIZE, OUTBOUND_BUFFER, PING_INTERVAL,
    READ_DEADLINE, WRITE_DEADLINE,
};
use super::HubHandle;

/// Router served on the hub port.
pub fn create_hub_router(hub: HubHandle) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> impl IntoResponse {
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let subscriber_id = Uuid::new_v4().to_string();
    info!(subscriber = %subscriber_id, "subscriber connected");

    let (sink, source) = socket.split();
    let (buffer_tx, buffer_rx) = mpsc::channel(OUTBOUND_BUFFER);
    hub.register(subscriber_id.clone(), buffer_tx).await;

    let writer = tokio::spawn(write_pump(
        buffer_rx,
        Box::new(WsSink(sink)),
        subscriber_id.clone(),
        hub.unregister_sender(),
        PING_INTERVAL,
        WRITE_DEADLINE,
    ));

    read_pump(
        Box::new(WsSource(source)),
        subscriber_id.clone(),
        hub.unregister_sender(),
        READ_DEADLINE,
    )
    .await;

    // Unregistration closes the buffer, which ends the write pump.
    let _ = writer.await;
    info!(subscriber = %subscriber_id, "subscriber disconnected");
}
