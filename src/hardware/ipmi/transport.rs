//! Raw frame transport over `ipmitool raw`.

use tracing::info;

use crate::error::ControlResult;
use crate::hardware::RawTransport;
use crate::system::executor::{format_frame, Ipmitool};

pub struct IpmitoolTransport {
    tool: Ipmitool,
    dry_run: bool,
}

impl IpmitoolTransport {
    pub fn new(tool: Ipmitool, dry_run: bool) -> Self {
        Self { tool, dry_run }
    }
}

impl RawTransport for IpmitoolTransport {
    fn send(&self, command: &'static str, frame: &[u8]) -> ControlResult<Vec<u8>> {
        if self.dry_run {
            info!("[DRY RUN] Would execute {}: ipmitool raw {}", command, format_frame(frame).join(" "));
            return Ok(Vec::new());
        }
        self.tool.raw(command, frame)
    }
}
