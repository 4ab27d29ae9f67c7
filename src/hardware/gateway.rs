//! The only write path to the BMC: automatic-mode toggling and manual speed.

use tracing::{debug, info};

use crate::error::{ControlError, ControlResult, CC_PARAM_OUT_OF_RANGE};
use crate::hardware::types::FanSpeedPercent;
use crate::hardware::RawTransport;
use crate::profiles::CompiledProfile;

pub struct ControllerGateway {
    transport: Box<dyn RawTransport>,
    profile: CompiledProfile,
}

impl ControllerGateway {
    pub fn new(transport: Box<dyn RawTransport>, profile: CompiledProfile) -> Self {
        Self { transport, profile }
    }

    pub fn vendor(&self) -> &str {
        &self.profile.vendor
    }

    /// Hand fan control back to the BMC firmware. Safe to repeat.
    pub fn enable_automatic(&self) -> ControlResult<()> {
        self.transport.send("enable_automatic", &self.profile.enable_automatic)?;
        info!("BMC automatic fan control enabled");
        Ok(())
    }

    /// Take fan control away from the BMC. Callers must follow up with `set_speed`.
    pub fn disable_automatic(&self) -> ControlResult<()> {
        self.transport.send("disable_automatic", &self.profile.disable_automatic)?;
        info!("BMC automatic fan control disabled");
        Ok(())
    }

    pub fn set_speed(&self, percent: FanSpeedPercent) -> ControlResult<()> {
        if percent.get() > 100 {
            return Err(ControlError::HardwareCommand {
                command: "set_speed",
                code: CC_PARAM_OUT_OF_RANGE,
                detail: format!("fan speed {} out of range", percent),
            });
        }

        let frame = self.profile.speed_frame(percent);
        self.transport.send("set_speed", &frame)?;
        debug!("Fan speed set to {}", percent);
        Ok(())
    }
}
