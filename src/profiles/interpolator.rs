//! Frame compiler and speed interpolator.
//! Turns the textual profile into byte frames once at startup, and encodes a
//! percentage into the set-speed frame on every cycle.

use anyhow::{anyhow, bail, Context, Result};

use super::types::{CommandProfile, SpeedTranslation};
use crate::hardware::types::FanSpeedPercent;

const SPEED_PLACEHOLDERS: [&str; 2] = ["{{SPEED_HEX}}", "{{SPEED}}"];

/// Set-speed frame with one slot reserved for the speed byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedFrame {
    bytes: Vec<u8>,
    speed_index: usize,
}

impl SpeedFrame {
    pub fn render(&self, speed_byte: u8) -> Vec<u8> {
        let mut frame = self.bytes.clone();
        frame[self.speed_index] = speed_byte;
        frame
    }
}

/// A validated profile, ready to hand to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProfile {
    pub vendor: String,
    pub enable_automatic: Vec<u8>,
    pub disable_automatic: Vec<u8>,
    pub set_speed: SpeedFrame,
    pub translation: SpeedTranslation,
}

impl CompiledProfile {
    pub fn compile(profile: &CommandProfile) -> Result<Self> {
        let enable_automatic = parse_frame(&profile.enable_automatic)
            .context("Invalid enable_automatic frame")?;
        let disable_automatic = parse_frame(&profile.disable_automatic)
            .context("Invalid disable_automatic frame")?;
        let set_speed = parse_speed_frame(&profile.set_speed)
            .context("Invalid set_speed frame")?;

        if let SpeedTranslation::ByteScale { output_min, output_max } = profile.speed_translation {
            if output_min > output_max {
                bail!("byte_scale output_min ({}) exceeds output_max ({})", output_min, output_max);
            }
        }

        Ok(Self {
            vendor: profile.vendor.clone(),
            enable_automatic,
            disable_automatic,
            set_speed,
            translation: profile.speed_translation,
        })
    }

    pub fn speed_frame(&self, percent: FanSpeedPercent) -> Vec<u8> {
        self.set_speed.render(translate_speed(percent, &self.translation))
    }
}

/// Translate a percentage into the byte the BMC expects.
pub fn translate_speed(percent: FanSpeedPercent, translation: &SpeedTranslation) -> u8 {
    match *translation {
        SpeedTranslation::DecimalHex => percent.get(),
        SpeedTranslation::ByteScale { output_min, output_max } => {
            let range = u16::from(output_max.saturating_sub(output_min));
            let scaled = u16::from(percent.get()) * range / 100;
            // scaled <= range, so the sum fits in output_max
            output_min + scaled as u8
        }
    }
}

/// Parse "0x30 0x30 0x01 0x01" (the 0x prefix is optional).
pub fn parse_frame(text: &str) -> Result<Vec<u8>> {
    let bytes = text
        .split_whitespace()
        .map(parse_byte)
        .collect::<Result<Vec<u8>>>()?;

    if bytes.is_empty() {
        bail!("Frame is empty");
    }
    Ok(bytes)
}

fn parse_speed_frame(text: &str) -> Result<SpeedFrame> {
    let mut bytes = Vec::new();
    let mut speed_index = None;

    for token in text.split_whitespace() {
        if SPEED_PLACEHOLDERS.contains(&token) {
            if speed_index.is_some() {
                bail!("Frame contains more than one speed placeholder");
            }
            speed_index = Some(bytes.len());
            bytes.push(0);
        } else {
            bytes.push(parse_byte(token)?);
        }
    }

    let speed_index = speed_index
        .ok_or_else(|| anyhow!("Frame has no {{{{SPEED_HEX}}}} placeholder"))?;
    Ok(SpeedFrame { bytes, speed_index })
}

fn parse_byte(token: &str) -> Result<u8> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u8::from_str_radix(digits, 16).with_context(|| format!("'{}' is not a hex byte", token))
}
