//! Config file location, loading and validation.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::config::types::GovernorConfig;
use crate::profiles::CompiledProfile;
use crate::system::executor::device_number;

/// `config.json` beside the executable, unless a path was given.
pub fn resolve_config_path(path: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = path {
        return Ok(p.to_path_buf());
    }

    let exe_dir = std::env::current_exe()?
        .parent()
        .ok_or_else(|| anyhow!("Cannot determine executable directory"))?
        .to_path_buf();
    Ok(exe_dir.join("config.json"))
}

pub async fn load_config(path: Option<&Path>) -> Result<GovernorConfig> {
    let config_path = resolve_config_path(path)?;

    if !config_path.exists() {
        bail!(
            "Configuration file not found: {:?}. Curve thresholds and limiter settings are required.",
            config_path
        );
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .with_context(|| format!("Failed to read config: {:?}", config_path))?;
    let config: GovernorConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config JSON: {:?}", config_path))?;

    validate_config(&config).with_context(|| format!("Invalid configuration in {:?}", config_path))?;

    info!("Loaded configuration from: {:?}", config_path);
    Ok(config)
}

/// Reject settings that would make the control loop unsafe or meaningless.
pub fn validate_config(config: &GovernorConfig) -> Result<()> {
    let curve = &config.curve;
    if curve.low_temp_threshold >= curve.high_temp_threshold {
        bail!(
            "curve.low_temp_threshold ({}) must be below curve.high_temp_threshold ({})",
            curve.low_temp_threshold,
            curve.high_temp_threshold
        );
    }
    if !(1..=100).contains(&curve.min_fan_floor_percent) {
        bail!("curve.min_fan_floor_percent must be 1-100, got {}", curve.min_fan_floor_percent);
    }

    let limiter = &config.limiter;
    if !(1..=100).contains(&limiter.max_step_percent) {
        bail!("limiter.max_step_percent must be 1-100, got {}", limiter.max_step_percent);
    }
    if limiter.deadband_percent > 100 {
        bail!("limiter.deadband_percent must be 0-100, got {}", limiter.deadband_percent);
    }

    let control = &config.control;
    if !(control.poll_interval_seconds > 0.0 && control.poll_interval_seconds.is_finite()) {
        bail!("control.poll_interval_seconds must be positive");
    }
    if !(control.sensor_timeout_seconds > 0.0 && control.sensor_timeout_seconds.is_finite()) {
        bail!("control.sensor_timeout_seconds must be positive");
    }
    if let Some(emergency) = control.emergency_temp {
        if emergency <= curve.high_temp_threshold {
            bail!(
                "control.emergency_temp ({}) must be above curve.high_temp_threshold ({})",
                emergency,
                curve.high_temp_threshold
            );
        }
    }

    if config.sensors.category.trim().is_empty() {
        bail!("sensors.category cannot be empty");
    }

    device_number(&config.controller.device)?;
    CompiledProfile::compile(&config.profile)?;

    Ok(())
}
