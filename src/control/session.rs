//! Lifetime ownership of the BMC.
//!
//! A `LoopSession` holds the controller gateway from startup until the daemon
//! exits. Releasing it re-enables BMC automatic fan control exactly once; if it
//! is dropped without an explicit release (early return, panic unwind) the
//! `Drop` impl performs the release instead.

use tracing::{error, info, warn};

use crate::error::ControlResult;
use crate::hardware::ControllerGateway;

pub struct LoopSession {
    gateway: ControllerGateway,
    released: bool,
}

impl LoopSession {
    pub fn acquire(gateway: ControllerGateway) -> Self {
        info!("Fan control session started ({} profile)", gateway.vendor());
        Self {
            gateway,
            released: false,
        }
    }

    pub fn gateway(&self) -> &ControllerGateway {
        &self.gateway
    }

    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Return fans to BMC automatic control. Only the first call sends a command.
    pub fn release(&mut self) -> ControlResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        match self.gateway.enable_automatic() {
            Ok(()) => {
                info!("Fan control session released - fans returned to BMC automatic control");
                Ok(())
            }
            Err(e) => {
                error!("Failed to restore BMC automatic fan control on exit: {}", e);
                Err(e)
            }
        }
    }
}

impl Drop for LoopSession {
    fn drop(&mut self) {
        if !self.released {
            warn!("Fan control session dropped without release, restoring BMC automatic control");
            let _ = self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::testing::RecordingTransport;
    use crate::profiles::{CommandProfile, CompiledProfile};

    fn session(transport: &RecordingTransport) -> LoopSession {
        let profile = CompiledProfile::compile(&CommandProfile::default()).unwrap();
        LoopSession::acquire(ControllerGateway::new(Box::new(transport.clone()), profile))
    }

    #[test]
    fn release_sends_enable_once() {
        let transport = RecordingTransport::default();
        let mut s = session(&transport);
        s.release().unwrap();
        s.release().unwrap();
        assert!(s.is_released());
        drop(s);
        assert_eq!(transport.commands(), vec!["enable_automatic"]);
    }

    #[test]
    fn drop_without_release_restores_automatic() {
        let transport = RecordingTransport::default();
        drop(session(&transport));
        assert_eq!(transport.count("enable_automatic"), 1);
    }

    #[test]
    fn unwinding_restores_automatic() {
        let transport = RecordingTransport::default();
        let inner = transport.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _s = session(&inner);
            panic!("control loop blew up");
        }));
        assert!(result.is_err());
        assert_eq!(transport.count("enable_automatic"), 1);
    }

    #[test]
    fn failed_release_is_not_retried_on_drop() {
        let transport = RecordingTransport::default();
        transport.fail_with("enable_automatic", 0xff);
        let mut s = session(&transport);
        assert!(s.release().is_err());
        drop(s);
        assert_eq!(transport.count("enable_automatic"), 1);
    }
}
