//! Device Client - HTTP link to the vehicle sensor device
//!
//! The device serves one reading per `GET http://{ip}/{sample_path}` and
//! accepts actuation commands on `PUT http://{ip}/{actuation_path}`. The IP is
//! passed per call because operators can change it while the node runs.

use std::time::Duration;

use super::LinkError;
use crate::config::{DeviceConfig, TimeoutConfig};
use crate::types::{ActuationPacket, Sample};

#[derive(Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    sample_path: String,
    actuation_path: String,
    fetch_timeout: Duration,
    actuation_timeout: Duration,
}

impl DeviceClient {
    pub fn new(http: reqwest::Client, device: &DeviceConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            http,
            sample_path: device.sample_path.trim_matches('/').to_string(),
            actuation_path: device.actuation_path.trim_matches('/').to_string(),
            fetch_timeout: Duration::from_millis(timeouts.fetch_ms),
            actuation_timeout: Duration::from_millis(timeouts.actuation_ms),
        }
    }

    pub fn sample_url(&self, device_ip: &str) -> String {
        endpoint(device_ip, &self.sample_path)
    }

    pub fn actuation_url(&self, device_ip: &str) -> String {
        endpoint(device_ip, &self.actuation_path)
    }

    /// Fetch one reading. Non-2xx, timeouts and non-object bodies are errors.
    pub async fn fetch_sample(&self, device_ip: &str) -> Result<Sample, LinkError> {
        let resp = self
            .http
            .get(self.sample_url(device_ip))
            .timeout(self.fetch_timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LinkError::ServerError(status));
        }

        let text = resp.text().await?;
        Sample::from_json_str(&text)
            .ok_or_else(|| LinkError::Malformed(format!("expected a JSON object, got {} bytes", text.len())))
    }

    /// Push an actuation command. The response body is ignored.
    pub async fn push_actuation(
        &self,
        device_ip: &str,
        packet: &ActuationPacket,
    ) -> Result<(), LinkError> {
        let resp = self
            .http
            .put(self.actuation_url(device_ip))
            .timeout(self.actuation_timeout)
            .json(packet)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            s => Err(LinkError::ServerError(s)),
        }
    }
}

/// `http://{ip}/{path}`; an address that already carries a scheme is kept.
fn endpoint(device_ip: &str, path: &str) -> String {
    let base = device_ip.trim().trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{base}/{path}")
    } else {
        format!("http://{base}/{path}")
    }
}
