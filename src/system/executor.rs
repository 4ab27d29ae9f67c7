//! ipmitool subprocess executor.
//! Every invocation targets the local BMC through the OpenIPMI driver
//! (`-I open -d <N>`), where N is taken from the configured device node.

use std::process::Output;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, trace};

use crate::config::types::ControllerSettings;
use crate::error::{ControlError, ControlResult, CC_UNSPECIFIED};

/// Extract the OpenIPMI device number from a node path.
/// `/dev/ipmi0`, `/dev/ipmi/0` and `/dev/ipmidev/0` all map to 0.
pub fn device_number(device: &str) -> Result<u32> {
    let name = device.rsplit('/').next().unwrap_or(device);
    let digits_at = name
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| anyhow!("Device path {:?} does not end in a device number", device))?;

    name[digits_at..]
        .parse()
        .with_context(|| format!("Device path {:?} does not end in a device number", device))
}

/// Pull the completion code out of ipmitool's failure text,
/// e.g. "Unable to send RAW command (channel=0x0 netfn=0x30 lun=0x0 cmd=0x30 rsp=0xc1): Invalid command"
pub fn parse_completion_code(stderr: &str) -> Option<u8> {
    let start = stderr.find("rsp=0x")? + "rsp=0x".len();
    let hex: String = stderr[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u8::from_str_radix(&hex, 16).ok()
}

/// Parse the hex bytes ipmitool prints for a raw response (" 01 02\n").
pub fn parse_raw_response(stdout: &str) -> Vec<u8> {
    stdout
        .split_whitespace()
        .filter_map(|b| u8::from_str_radix(b, 16).ok())
        .collect()
}

/// Format a frame the way `ipmitool raw` takes it on the command line.
pub fn format_frame(frame: &[u8]) -> Vec<String> {
    frame.iter().map(|b| format!("0x{:02x}", b)).collect()
}

#[derive(Debug, Clone)]
pub struct Ipmitool {
    program: String,
    device: String,
    device_num: u32,
}

impl Ipmitool {
    pub fn new(settings: &ControllerSettings) -> Result<Self> {
        Ok(Self {
            program: settings.ipmitool_path.clone(),
            device: settings.device.clone(),
            device_num: device_number(&settings.device)?,
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Build an ipmitool Command bound to the configured local device.
    pub fn command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(["-I", "open", "-d"]).arg(self.device_num.to_string());
        cmd
    }

    /// Execute `ipmitool sdr type temperature`.
    /// The child is killed if this future is dropped (e.g. by a caller's timeout).
    pub async fn sdr_temperature(&self) -> ControlResult<String> {
        let mut cmd = self.command();
        cmd.args(["sdr", "type", "temperature"]);

        trace!("Executing: {} {:?}", self.program, cmd.get_args().collect::<Vec<_>>());

        let mut cmd = tokio::process::Command::from(cmd);
        cmd.kill_on_drop(true);

        let output = cmd
            .output()
            .await
            .map_err(|e| ControlError::sensor_read(format!("failed to execute {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(ControlError::sensor_read(format!(
                "ipmitool sdr failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Execute `ipmitool raw <frame>` and wait for the BMC's answer.
    pub fn raw(&self, command: &'static str, frame: &[u8]) -> ControlResult<Vec<u8>> {
        let mut cmd = self.command();
        cmd.arg("raw").args(format_frame(frame));

        debug!("Executing: ipmitool raw {}", format_frame(frame).join(" "));

        let output: Output = cmd.output().map_err(|e| ControlError::HardwareCommand {
            command,
            code: CC_UNSPECIFIED,
            detail: format!("failed to execute {}: {}", self.program, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ControlError::HardwareCommand {
                command,
                code: parse_completion_code(&stderr).unwrap_or(CC_UNSPECIFIED),
                detail: stderr.trim().to_string(),
            });
        }

        Ok(parse_raw_response(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Execute `ipmitool mc info` to verify BMC connectivity.
    pub async fn mc_info(&self) -> Result<String> {
        let mut cmd = self.command();
        cmd.args(["mc", "info"]);

        debug!("Executing: ipmitool mc info");

        let output = tokio::process::Command::from(cmd)
            .output()
            .await
            .with_context(|| format!("Failed to execute {} mc info", self.program))?;

        if !output.status.success() {
            return Err(anyhow!("ipmitool mc info failed: {}", String::from_utf8_lossy(&output.stderr).trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
