//! BMC command profiles: raw frame templates and speed translation.

pub mod interpolator;
pub mod types;

pub use interpolator::CompiledProfile;
pub use types::CommandProfile;
