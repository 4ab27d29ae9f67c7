//! Pankha fan governor entry point: CLI dispatch, signal handlers, async runtime.

mod app;
mod config;
mod control;
mod error;
mod hardware;
mod profiles;
mod system;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use app::cli::{Args, HELP_TEXT};
use app::logging::{filter_for_level, init_tracing, reload_level};
#[cfg(unix)]
use app::signals::spawn_log_level_reload;
use app::signals::ShutdownSignal;
use config::{load_config, validate_config, GovernorConfig};
use control::aggregator::{aggregate, hottest};
use control::curve::FanCurve;
use control::{ControlLoop, LoopSession};
use hardware::{open_controller, read_bounded, IpmiSensorReader};
use system::executor::Ipmitool;

#[tokio::main]
async fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            if err.kind() == clap::error::ErrorKind::DisplayHelp {
                print!("{}", HELP_TEXT);
                std::process::exit(0);
            }
            if err.kind() == clap::error::ErrorKind::DisplayVersion {
                println!("\x1b[32mpankha-fan-governor {} ({})\x1b[0m", env!("CARGO_PKG_VERSION"), std::env::consts::ARCH);
                std::process::exit(0);
            }

            eprintln!("{}", err);
            eprintln!();
            print!("{}", HELP_TEXT);
            std::process::exit(1);
        }
    };

    // Priority: 1. --log-level flag, 2. LOG_LEVEL env, 3. config file, 4. default (info)
    let explicit_level = args
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok());
    let filter = match explicit_level.as_deref() {
        Some(level) => filter_for_level(level).unwrap_or_else(|| {
            eprintln!("Invalid log level '{}'. Using INFO. Valid levels: TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL", level);
            "info"
        }),
        None => "info",
    };
    init_tracing(filter);

    let mut config = match load_config(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Some(device) = args.device.as_ref() {
        info!("Using IPMI device {} from command line", device);
        config.controller.device = device.clone();
        if let Err(e) = validate_config(&config) {
            error!("Invalid --device: {:#}", e);
            std::process::exit(1);
        }
    }

    if explicit_level.is_none() {
        if let Err(e) = reload_level(&config.logging.log_level) {
            warn!("Ignoring logging.log_level: {}", e);
        }
    }

    if args.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    #[cfg(unix)]
    if !args.dry_run && unsafe { libc::geteuid() } != 0 {
        warn!("Not running as root; access to {} will probably be denied", config.controller.device);
    }

    let tool = Ipmitool::new(&config.controller).context("Invalid controller settings")?;
    let reader = IpmiSensorReader::new(tool, config.sensors.clone());

    if args.test {
        return run_test_mode(&config, &reader).await;
    }

    if args.dry_run {
        warn!("[DRY RUN] Frames are logged, not sent; the BMC keeps controlling the fans");
    }

    let gateway = match open_controller(&config.controller, &config.profile, args.dry_run).await {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Failed to open IPMI controller: {:#}", e);
            std::process::exit(1);
        }
    };

    // SIGINT/SIGTERM are queued from here on and observed between cycles
    let shutdown = ShutdownSignal::install()?;
    #[cfg(unix)]
    spawn_log_level_reload(args.config.clone())?;

    let session = LoopSession::acquire(gateway);
    let control = ControlLoop::new(&config, Box::new(reader), session);

    match control.run(shutdown.wait()).await {
        Ok(()) => {
            info!("Fan governor shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Exiting without confirmed BMC automatic control: {}", e);
            std::process::exit(2);
        }
    }
}

/// One read, aggregate and curve pass. Nothing is sent to the BMC.
async fn run_test_mode(config: &GovernorConfig, reader: &IpmiSensorReader) -> Result<()> {
    info!("Running in test mode (no hardware writes)");

    let timeout = Duration::from_secs_f64(config.control.sensor_timeout_seconds);
    let readings = read_bounded(reader, timeout).await?;

    for reading in &readings {
        info!(
            "  {} [{}]: {}°C",
            reading.label,
            reading.record_id.as_deref().unwrap_or("-"),
            reading.celsius
        );
    }

    let temperature = aggregate(&readings, config.sensors.aggregation)?;
    let speed = FanCurve::new(&config.curve).speed_for(temperature);
    info!(
        "{} sensors, {:?} {}°C -> curve speed {}",
        readings.len(),
        config.sensors.aggregation,
        temperature,
        speed
    );

    if let (Some(limit), Some(hot)) = (config.control.emergency_temp, hottest(&readings)) {
        if hot.celsius >= limit {
            warn!("{} at {}°C is at or above the emergency limit {}°C", hot.label, hot.celsius, limit);
        }
    }

    Ok(())
}
