//! Governor configuration structs and defaults.

use serde::{Deserialize, Serialize};

use crate::profiles::CommandProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorConfig {
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub control: ControlSettings,
    pub curve: CurveSettings,
    pub limiter: LimiterSettings,
    #[serde(default)]
    pub sensors: SensorSettings,
    #[serde(default)]
    pub profile: CommandProfile,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSettings {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_ipmitool")]
    pub ipmitool_path: String,
}

pub fn default_device() -> String {
    "/dev/ipmi0".to_string()
}

pub fn default_ipmitool() -> String {
    "ipmitool".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,
    #[serde(default = "default_sensor_timeout")]
    pub sensor_timeout_seconds: f64,
    /// Any single sensor at or above this hands fans back to the BMC. `null` disables.
    #[serde(default = "default_emergency_temp")]
    pub emergency_temp: Option<i32>,
}

pub fn default_poll_interval() -> f64 {
    10.0
}

pub fn default_sensor_timeout() -> f64 {
    5.0
}

pub fn default_emergency_temp() -> Option<i32> {
    Some(85)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSettings {
    pub low_temp_threshold: i32,     // °C, at or below -> floor
    pub high_temp_threshold: i32,    // °C, at or above -> 100%
    pub min_fan_floor_percent: u8,   // 1-100, never 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterSettings {
    pub max_step_percent: u8,        // 1-100 per cycle
    pub deadband_percent: u8,        // 0 = apply every change
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSettings {
    /// Name column value that marks a row as a CPU temperature ("Temp" on Dell)
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_unit_suffix")]
    pub unit_suffix: String,
    #[serde(default)]
    pub aggregation: AggregationStrategy,
}

pub fn default_category() -> String {
    "Temp".to_string()
}

pub fn default_unit_suffix() -> String {
    " degrees C".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// Arithmetic mean, truncated toward zero
    #[default]
    Mean,
    /// Hottest sensor wins
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

pub fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            device: default_device(),
            ipmitool_path: default_ipmitool(),
        }
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            sensor_timeout_seconds: default_sensor_timeout(),
            emergency_temp: default_emergency_temp(),
        }
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            category: default_category(),
            unit_suffix: default_unit_suffix(),
            aggregation: AggregationStrategy::Mean,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}
