//! Serde structs for the BMC command profile.
//! A profile names the three raw frames the governor needs and how a speed
//! percentage is encoded into the set-speed frame.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandProfile {
    pub vendor: String,
    pub enable_automatic: String,   // "0x30 0x30 0x01 0x01"
    pub disable_automatic: String,  // "0x30 0x30 0x01 0x00"
    pub set_speed: String,          // "0x30 0x30 0x02 0xff {{SPEED_HEX}}"
    #[serde(default)]
    pub speed_translation: SpeedTranslation,
}

/// How a 0-100 percentage becomes the speed byte of the set-speed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeedTranslation {
    /// 50% -> 0x32
    #[default]
    DecimalHex,
    /// 50% -> output_min + 50% of (output_max - output_min)
    ByteScale { output_min: u8, output_max: u8 },
}

impl Default for CommandProfile {
    /// Dell PowerEdge OEM fan commands (iDRAC 7/8/9).
    fn default() -> Self {
        Self {
            vendor: "Dell PowerEdge".to_string(),
            enable_automatic: "0x30 0x30 0x01 0x01".to_string(),
            disable_automatic: "0x30 0x30 0x01 0x00".to_string(),
            set_speed: "0x30 0x30 0x02 0xff {{SPEED_HEX}}".to_string(),
            speed_translation: SpeedTranslation::DecimalHex,
        }
    }
}
