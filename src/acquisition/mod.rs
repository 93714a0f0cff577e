//! Acquisition: the node's links to the outside world
//!
//! - [`DeviceClient`]: sample fetch and actuation push against the vehicle device
//! - [`CloudClient`]: health report upload
//! - [`SampleSource`]: where samples come from (live device or replay file)
//! - [`TelemetrySink`]: where packets go (device + cloud over HTTP)
//!
//! No call is retried: a failure is logged by the caller and the data dropped.

mod cloud;
mod device;
mod sink;
mod source;

pub use cloud::CloudClient;
pub use device::DeviceClient;
pub use sink::{HttpSink, TelemetrySink};
pub use source::{DeviceSource, ReplaySource, SampleEvent, SampleSource};

/// Errors on any outbound HTTP link
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Shared connection pool for every link. Timeouts are set per request.
pub fn build_http_client() -> Result<reqwest::Client, LinkError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("fog-node/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
