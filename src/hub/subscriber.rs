//! Subscriber connections
//!
//! Each subscriber owns a bounded outbound buffer filled by the hub and
//! drained by a write pump; a read pump watches the connection for liveness.
//! Both pumps reach the wire through small transport capabilities so tests
//! can run them against in-memory channels.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Outbound buffer capacity per subscriber.
pub const OUTBOUND_BUFFER: usize = 256;
/// Deadline applied to every outbound frame.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);
/// Keep-alive ping cadence.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);
/// Inbound read deadline, extended by any inbound traffic.
pub const READ_DEADLINE: Duration = Duration::from_secs(60);
/// Largest inbound message accepted.
pub const MAX_MESSAGE_SIZE: usize = 512 * 1024;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Inbound traffic as the read pump sees it.
#[derive(Debug)]
pub enum Inbound {
    Text(String),
    /// Binary payload, length only; content is ignored
    Binary(usize),
    /// Control traffic that proves liveness
    Pong,
}

/// Outbound half of a subscriber transport.
#[async_trait]
pub trait MessageSink: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;
    async fn send_ping(&mut self) -> Result<(), TransportError>;
    async fn close(&mut self);
}

/// Inbound half of a subscriber transport. `None` means a clean close.
#[async_trait]
pub trait MessageSource: Send {
    async fn next_message(&mut self) -> Option<Result<Inbound, TransportError>>;
}

/// WebSocket sink half.
pub struct WsSink(pub SplitSink<WebSocket, Message>);

#[async_trait]
impl MessageSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.0
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn send_ping(&mut self) -> Result<(), TransportError> {
        self.0
            .send(Message::Ping(Vec::new()))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.0.send(Message::Close(None)).await;
    }
}

/// WebSocket stream half.
pub struct WsSource(pub SplitStream<WebSocket>);

#[async_trait]
impl MessageSource for WsSource {
    async fn next_message(&mut self) -> Option<Result<Inbound, TransportError>> {
        match self.0.next().await? {
            Ok(Message::Text(text)) => Some(Ok(Inbound::Text(text))),
            Ok(Message::Binary(bytes)) => Some(Ok(Inbound::Binary(bytes.len()))),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => Some(Ok(Inbound::Pong)),
            Ok(Message::Close(_)) => None,
            Err(e) => Some(Err(TransportError(e.to_string()))),
        }
    }
}

/// Drain the subscriber's buffer onto the wire.
///
/// Queued messages are coalesced into a single text frame separated by
/// newlines. The pump exits when the buffer closes (unregister or eviction)
/// or a write fails or times out.
pub async fn write_pump(
    mut buffer: mpsc::Receiver<String>,
    mut sink: Box<dyn MessageSink>,
    subscriber_id: String,
    unregister: mpsc::Sender<String>,
    ping_interval: Duration,
    write_deadline: Duration,
) {
    let mut ping = tokio::time::interval_at(
        tokio::time::Instant::now() + ping_interval,
        ping_interval,
    );
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = buffer.recv() => match received {
                Some(first) => {
                    let mut frame = first;
                    while let Ok(more) = buffer.try_recv() {
                        frame.push('\n');
                        frame.push_str(&more);
                    }
                    match tokio::time::timeout(write_deadline, sink.send_text(frame)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            debug!(subscriber = %subscriber_id, error = %e, "write failed");
                            break;
                        }
                        Err(_) => {
                            warn!(subscriber = %subscriber_id, "write deadline exceeded");
                            break;
                        }
                    }
                }
                None => {
                    sink.close().await;
                    break;
                }
            },
            _ = ping.tick() => {
                let sent = tokio::time::timeout(write_deadline, sink.send_ping()).await;
                if !matches!(sent, Ok(Ok(()))) {
                    debug!(subscriber = %subscriber_id, "keep-alive ping failed");
                    break;
                }
            }
        }
    }

    let _ = unregister.send(subscriber_id).await;
}

/// Watch the connection for closure.
///
/// Inbound payloads carry no protocol; they are logged and ignored. Any
/// inbound traffic (pongs included) extends the read deadline.
pub async fn read_pump(
    mut source: Box<dyn MessageSource>,
    subscriber_id: String,
    unregister: mpsc::Sender<String>,
    read_deadline: Duration,
) {
    loop {
        match tokio::time::timeout(read_deadline, source.next_message()).await {
            Err(_) => {
                warn!(subscriber = %subscriber_id, "read deadline expired");
                break;
            }
            Ok(None) => {
                debug!(subscriber = %subscriber_id, "connection closed");
                break;
            }
            Ok(Some(Err(e))) => {
                debug!(subscriber = %subscriber_id, error = %e, "read error");
                break;
            }
            Ok(Some(Ok(Inbound::Text(payload)))) => {
                debug!(subscriber = %subscriber_id, payload = %payload, "ignoring inbound message");
            }
            Ok(Some(Ok(Inbound::Binary(len)))) => {
                debug!(subscriber = %subscriber_id, len, "ignoring inbound binary message");
            }
            Ok(Some(Ok(Inbound::Pong))) => {}
        }
    }

    let _ = unregister.send(subscriber_id).await;
}
