//! Audit pipeline
//!
//! Capture jobs produced by the proxy are queued here, verified against the
//! external service, and the scored outcome is pushed to hub subscribers.
//! Everything in this module is best-effort: the primary request path never
//! waits on it.

pub mod dispatcher;
pub mod job;
pub mod verdict;

pub use dispatcher::Dispatcher;
pub use job::CaptureJob;
