//! Proxy module
//!
//! Handles request forwarding to the upstream inference endpoint.

pub mod upstream;

pub use upstream::UpstreamClient;

use uuid::Uuid;

/// Header used to correlate a request with its verification events.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header stamped on synthesized test-mode responses.
pub const TEST_MODE_HEADER: &str = "x-trustagent-mode";

/// Generate a new correlation id (UUID v4).
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
