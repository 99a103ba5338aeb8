//! In-memory tee for streamed response bodies
//!
//! While a streaming response is forwarded to the client, every chunk is
//! appended here so the assistant text can be reconstructed once the stream
//! ends. The buffer never applies backpressure; an append can not fail
//! independently of the client write.

use std::sync::{Arc, Mutex};

/// Streaming capture stops growing past this point; forwarding continues.
/// Chat completions are kilobytes in practice, so the cap only matters for
/// pathological streams.
pub const CAPTURE_CAP_BYTES: usize = 1024 * 1024;

/// Append-only byte buffer shared between the forwarding loop and the
/// end-of-stream capture step. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct TeeBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl TeeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk, truncated to whatever room is left under the cap.
    pub fn append(&self, chunk: &[u8]) {
        let mut buf = self.inner.lock().unwrap();
        let room = CAPTURE_CAP_BYTES.saturating_sub(buf.len());
        if room == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    /// Snapshot of everything captured so far, in write order.
    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
