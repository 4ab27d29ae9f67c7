//! Configuration: typed settings and the JSON file they are loaded from.

pub mod persistence;
pub mod types;

pub use persistence::{load_config, validate_config};
pub use types::GovernorConfig;
