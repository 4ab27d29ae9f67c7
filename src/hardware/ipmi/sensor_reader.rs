//! Temperature source backed by `ipmitool sdr type temperature`.

use async_trait::async_trait;
use tracing::debug;

use crate::config::types::SensorSettings;
use crate::error::ControlResult;
use crate::hardware::types::TemperatureReading;
use crate::hardware::TemperatureSource;
use crate::system::executor::Ipmitool;
use crate::system::parser;

pub struct IpmiSensorReader {
    tool: Ipmitool,
    settings: SensorSettings,
}

impl IpmiSensorReader {
    pub fn new(tool: Ipmitool, settings: SensorSettings) -> Self {
        Self { tool, settings }
    }
}

#[async_trait]
impl TemperatureSource for IpmiSensorReader {
    async fn read(&self) -> ControlResult<Vec<TemperatureReading>> {
        let output = self.tool.sdr_temperature().await?;
        let readings = parser::parse_temperatures(&output, &self.settings)?;
        debug!("Read {} '{}' sensors via IPMI SDR", readings.len(), self.settings.category);
        Ok(readings)
    }
}
