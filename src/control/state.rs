//! Who is driving the fans right now.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    /// BMC firmware controls the fans. Initial state.
    #[default]
    Automatic,
    /// The governor is asserting fan speed.
    Manual,
    /// A fault this cycle forced fans back to the BMC; Manual is retried next cycle.
    Degraded,
}

impl ControlState {
    pub fn holds_manual_control(self) -> bool {
        self == ControlState::Manual
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlState::Automatic => "Automatic",
            ControlState::Manual => "Manual",
            ControlState::Degraded => "Degraded",
        };
        f.write_str(name)
    }
}
