//! Hardware data types: temperature readings and the fan speed percentage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One temperature sample in degrees Celsius, produced fresh each poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub label: String,
    /// SDR record id column, e.g. "0Eh"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub celsius: i32,
}

impl TemperatureReading {
    #[cfg(test)]
    pub fn new(label: impl Into<String>, celsius: i32) -> Self {
        Self {
            label: label.into(),
            record_id: None,
            celsius,
        }
    }
}

/// Fan speed as a percentage of maximum. Cannot hold a value above 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FanSpeedPercent(u8);

impl FanSpeedPercent {
    pub const MAX: FanSpeedPercent = FanSpeedPercent(100);

    pub fn new(percent: u8) -> Option<Self> {
        (percent <= 100).then_some(Self(percent))
    }

    /// Clamp an arbitrary integer into [0, 100].
    pub fn saturating(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FanSpeedPercent {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("Fan speed {}% is outside 0-100", value))
    }
}

impl From<FanSpeedPercent> for u8 {
    fn from(value: FanSpeedPercent) -> Self {
        value.0
    }
}

impl fmt::Display for FanSpeedPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
