//! Control-path error taxonomy.
//!
//! Every variant is recoverable at the control loop boundary: the loop logs it
//! and hands fan control back to the BMC. Startup failures use `anyhow` instead.

/// IPMI completion code: unspecified error.
pub const CC_UNSPECIFIED: u8 = 0xff;
/// IPMI completion code: parameter out of range.
pub const CC_PARAM_OUT_OF_RANGE: u8 = 0xc9;

pub type ControlResult<T> = std::result::Result<T, ControlError>;

#[derive(thiserror::Error, Debug)]
pub enum ControlError {
    /// The sensor source could not be run, exited non-zero, or timed out.
    #[error("Failed to read temperature sensors: {cause}")]
    SensorRead { cause: String },

    /// A temperature row was present but its value could not be parsed.
    #[error("Malformed temperature row: {line:?}")]
    SensorParse { line: String },

    #[error("No temperature readings available to aggregate")]
    NoReadings,

    /// A raw BMC command was rejected or could not be delivered.
    #[error("BMC command '{command}' failed (completion code {code:#04x}): {detail}")]
    HardwareCommand {
        command: &'static str,
        code: u8,
        detail: String,
    },
}

impl ControlError {
    pub fn sensor_read(cause: impl Into<String>) -> Self {
        ControlError::SensorRead { cause: cause.into() }
    }

    /// Completion code for hardware failures, `None` for sensor-side errors.
    pub fn completion_code(&self) -> Option<u8> {
        match self {
            ControlError::HardwareCommand { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_error_formats_completion_code_as_hex() {
        let err = ControlError::HardwareCommand {
            command: "set_speed",
            code: CC_PARAM_OUT_OF_RANGE,
            detail: "speed 101 out of range".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("set_speed"));
        assert!(msg.contains("0xc9"));
        assert_eq!(err.completion_code(), Some(0xc9));
    }

    #[test]
    fn sensor_errors_have_no_completion_code() {
        assert_eq!(ControlError::NoReadings.completion_code(), None);
        assert_eq!(ControlError::sensor_read("boom").completion_code(), None);
    }
}
