//! Response capture
//!
//! Duplicates response bytes on the streaming path (tee) and reconstructs
//! the assistant text that gets handed to the audit pipeline.

pub mod extract;
pub mod tee;

pub use extract::{extract_prompt, parse_envelope_content, reconstruct_sse_content};
pub use tee::TeeBuffer;
