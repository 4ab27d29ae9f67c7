//! ipmitool-backed implementations of the hardware seams, and controller startup.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

pub mod sensor_reader;
pub mod transport;

pub use sensor_reader::IpmiSensorReader;
pub use transport::IpmitoolTransport;

use crate::config::types::ControllerSettings;
use crate::hardware::ControllerGateway;
use crate::profiles::{CommandProfile, CompiledProfile};
use crate::system::executor::Ipmitool;

/// Open the controller: the device node must exist and the BMC must answer `mc info`.
/// Failure here is fatal for the daemon; there is nothing to control without a BMC.
pub async fn open_controller(
    settings: &ControllerSettings,
    profile: &CommandProfile,
    dry_run: bool,
) -> Result<ControllerGateway> {
    let tool = Ipmitool::new(settings)?;
    let compiled = CompiledProfile::compile(profile)?;

    if dry_run {
        warn!("[DRY RUN] Skipping controller probe for {}; no frames will be sent", settings.device);
    } else {
        if !Path::new(&settings.device).exists() {
            bail!(
                "IPMI device {} not found (is the ipmi_devintf kernel module loaded?)",
                settings.device
            );
        }

        let mc_info = tool
            .mc_info()
            .await
            .with_context(|| format!("BMC at {} did not respond", settings.device))?;
        if let Some(firmware) = parse_mc_field(&mc_info, "Firmware Revision") {
            info!("BMC firmware revision {}", firmware);
        }
    }

    info!("IPMI controller opened on {} ({} command profile)", tool.device(), compiled.vendor);
    Ok(ControllerGateway::new(
        Box::new(IpmitoolTransport::new(tool, dry_run)),
        compiled,
    ))
}

/// Parse a field from `ipmitool mc info` output.
fn parse_mc_field(output: &str, field: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.trim_start().starts_with(field))
        .and_then(|line| line.split_once(':'))
        .map(|(_, v)| v.trim().to_string())
}
