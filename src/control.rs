//! The closed loop: aggregation, curve, limiter, state machine and BMC session.

pub mod aggregator;
pub mod control_loop;
pub mod curve;
pub mod limiter;
pub mod session;
pub mod state;

pub use control_loop::ControlLoop;
pub use session::LoopSession;
