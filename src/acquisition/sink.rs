//! Telemetry sink: where decision packets are delivered.

use async_trait::async_trait;

use super::{CloudClient, DeviceClient, LinkError};
use crate::types::{ActuationPacket, CloudPacket};

/// Outbound delivery for actuation commands and cloud reports.
///
/// Implementations make a single attempt per packet; the dispatch loop logs
/// and drops failures.
#[async_trait]
pub trait TelemetrySink: Send + Sync + 'static {
    async fn send_actuation(&self, device_ip: &str, packet: &ActuationPacket)
        -> Result<(), LinkError>;

    async fn send_cloud(&self, packet: &CloudPacket) -> Result<(), LinkError>;
}

/// Delivers actuation to the device and reports to the cloud over HTTP.
#[derive(Clone)]
pub struct HttpSink {
    device: DeviceClient,
    cloud: CloudClient,
}

impl HttpSink {
    pub fn new(device: DeviceClient, cloud: CloudClient) -> Self {
        Self { device, cloud }
    }
}

#[async_trait]
impl TelemetrySink for HttpSink {
    async fn send_actuation(
        &self,
        device_ip: &str,
        packet: &ActuationPacket,
    ) -> Result<(), LinkError> {
        self.device.push_actuation(device_ip, packet).await
    }

    async fn send_cloud(&self, packet: &CloudPacket) -> Result<(), LinkError> {
        self.cloud.post_report(packet).await
    }
}
