//! Application-level plumbing: command line, logging setup and process signals.

pub mod cli;
pub mod logging;
pub mod signals;
