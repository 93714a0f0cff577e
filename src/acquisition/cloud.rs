//! Cloud Client - posts health reports to the ingestion endpoint

use std::time::Duration;

use super::LinkError;
use crate::config::{CloudConfig, TimeoutConfig};
use crate::types::CloudPacket;

#[derive(Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl CloudClient {
    pub fn new(http: reqwest::Client, cloud: &CloudConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            http,
            url: cloud.url.clone(),
            timeout: Duration::from_millis(timeouts.cloud_ms),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one report. Any non-2xx status is an error; nothing is retried.
    pub async fn post_report(&self, packet: &CloudPacket) -> Result<(), LinkError> {
        let resp = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(packet)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            s => Err(LinkError::ServerError(s)),
        }
    }
}
