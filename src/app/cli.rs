//! Command-line argument definitions (clap) and help text.

use std::path::PathBuf;

use clap::Parser;

pub const HELP_TEXT: &str = "
Pankha Fan Governor - closed-loop IPMI fan control
Usage: pankha-fan-governor [OPTIONS]

Options:
  -h, --help                    Print help
  -V, --version                 Print version
Control:
  -c, --config <PATH>           Configuration file (default: config.json beside the executable)
  -d, --device <PATH>           IPMI device node, overrides controller.device
      --dry-run                 Log raw IPMI frames instead of sending them
Logging:
      --log-level <LOG_LEVEL>   Set log level (TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL)
Config & Debug:
      --show-config             Print the resolved configuration and exit
      --test                    Read sensors once, print the computed speed, no hardware writes
";

#[derive(Parser, Debug, Default)]
#[command(name = "pankha-fan-governor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pankha Fan Governor - closed-loop IPMI fan control", long_about = None)]
pub struct Args {
    // === Control ===
    /// Configuration file (default: config.json beside the executable)
    #[arg(short = 'c', long, value_name = "PATH", help_heading = "Control")]
    pub config: Option<PathBuf>,

    /// IPMI device node, overrides controller.device
    #[arg(short = 'd', long, value_name = "PATH", help_heading = "Control")]
    pub device: Option<String>,

    /// Log raw IPMI frames instead of sending them
    #[arg(long = "dry-run", help_heading = "Control")]
    pub dry_run: bool,

    // === Logging ===
    /// Set log level (TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL)
    #[arg(long = "log-level", help_heading = "Logging")]
    pub log_level: Option<String>,

    // === Config & Debug ===
    /// Print the resolved configuration and exit
    #[arg(long = "show-config", help_heading = "Config & Debug")]
    pub show_config: bool,

    /// Read sensors once, print the computed speed, no hardware writes
    #[arg(long, help_heading = "Config & Debug")]
    pub test: bool,
}
