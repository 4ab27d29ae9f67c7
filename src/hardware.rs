//! Hardware seams: where temperatures come from and where raw BMC frames go.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ControlError, ControlResult};

pub mod gateway;
pub mod ipmi;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use gateway::ControllerGateway;
pub use ipmi::{open_controller, IpmiSensorReader};

use types::TemperatureReading;

#[async_trait]
pub trait TemperatureSource: Send + Sync {
    /// Read every temperature sensor once. No retries; the caller owns retry policy.
    async fn read(&self) -> ControlResult<Vec<TemperatureReading>>;
}

/// Single-shot, blocking delivery of a raw frame to the BMC.
pub trait RawTransport: Send + Sync {
    /// `command` names the operation for logs and errors.
    fn send(&self, command: &'static str, frame: &[u8]) -> ControlResult<Vec<u8>>;
}

/// One read, bounded by `timeout`. A read that overruns is a `SensorRead`
/// error and its future is dropped (which kills an ipmitool child).
pub async fn read_bounded(source: &dyn TemperatureSource, timeout: Duration) -> ControlResult<Vec<TemperatureReading>> {
    match tokio::time::timeout(timeout, source.read()).await {
        Ok(result) => result,
        Err(_) => Err(ControlError::sensor_read(format!(
            "sensor read timed out after {:?}",
            timeout
        ))),
    }
}
