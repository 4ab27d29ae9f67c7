//! Process signals: shutdown (SIGINT/SIGTERM) and SIGHUP log level reload.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::app::logging::{reload_with, ReloadHandle, RELOAD_HANDLE};
use crate::config::load_config;

/// Shutdown request, registered up front.
///
/// Once `install` returns, SIGINT and SIGTERM no longer terminate the process;
/// they are queued until `wait` is polled between control cycles.
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?,
            terminate: signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    pub async fn wait(mut self) {
        #[cfg(unix)]
        tokio::select! {
            _ = self.interrupt.recv() => info!("Shutdown signal received (Ctrl+C)"),
            _ = self.terminate.recv() => info!("Shutdown signal received (SIGTERM)"),
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received (Ctrl+C)");
        }
    }
}

/// Re-read the config file and apply its `logging.log_level` through `handle`.
pub async fn apply_reloaded_config(handle: &ReloadHandle, config_path: Option<&Path>) -> Result<&'static str> {
    let config = load_config(config_path).await?;
    reload_with(handle, &config.logging.log_level)
}

/// SIGHUP re-reads the config file and applies its log level.
#[cfg(unix)]
pub fn spawn_log_level_reload(config_path: Option<PathBuf>) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = signal(SignalKind::hangup()).context("Failed to setup SIGHUP handler")?;

    tokio::spawn(async move {
        loop {
            sighup.recv().await;
            info!("SIGHUP received, reloading log level configuration");

            let Some(handle) = RELOAD_HANDLE.get() else {
                error!("Failed to reload log level: tracing not initialized");
                continue;
            };
            match apply_reloaded_config(handle, config_path.as_deref()).await {
                Ok(filter) => info!("Log level reloaded: {}", filter.to_uppercase()),
                Err(e) => error!("Failed to reload log level: {:#}", e),
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::{reload, EnvFilter};

    fn write_config(log_level: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "curve": {{ "low_temp_threshold": 30, "high_temp_threshold": 70, "min_fan_floor_percent": 20 }},
                "limiter": {{ "max_step_percent": 10, "deadband_percent": 2 }},
                "logging": {{ "log_level": "{}" }}
            }}"#,
            log_level
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn reloaded_config_sets_log_level() {
        use tracing_subscriber::prelude::*;
        let (layer, handle) = reload::Layer::new(EnvFilter::new("info"));
        let _subscriber = tracing_subscriber::registry().with(layer);

        let file = write_config("DEBUG");
        assert_eq!(apply_reloaded_config(&handle, Some(file.path())).await.unwrap(), "debug");
        assert_eq!(
            handle.with_current(|f| f.max_level_hint()).unwrap(),
            Some(LevelFilter::DEBUG)
        );

        let file = write_config("CRITICAL");
        assert_eq!(apply_reloaded_config(&handle, Some(file.path())).await.unwrap(), "error");
    }

    #[tokio::test]
    async fn broken_config_keeps_current_level() {
        use tracing_subscriber::prelude::*;
        let (layer, handle) = reload::Layer::new(EnvFilter::new("warn"));
        let _subscriber = tracing_subscriber::registry().with(layer);

        let file = write_config("LOUD");
        assert!(apply_reloaded_config(&handle, Some(file.path())).await.is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(apply_reloaded_config(&handle, Some(&dir.path().join("gone.json"))).await.is_err());

        assert_eq!(
            handle.with_current(|f| f.max_level_hint()).unwrap(),
            Some(LevelFilter::WARN)
        );
    }

    #[cfg(unix)]
    mod shutdown {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use async_trait::async_trait;

        use super::super::ShutdownSignal;
        use crate::config::types::{CurveSettings, GovernorConfig, LimiterSettings};
        use crate::control::{ControlLoop, LoopSession};
        use crate::error::ControlResult;
        use crate::hardware::testing::RecordingTransport;
        use crate::hardware::types::TemperatureReading;
        use crate::hardware::{ControllerGateway, TemperatureSource};
        use crate::profiles::{CommandProfile, CompiledProfile};

        /// Delivers SIGTERM to this process in the middle of its first read.
        struct TerminatingSource {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl TemperatureSource for TerminatingSource {
            async fn read(&self) -> ControlResult<Vec<TemperatureReading>> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    unsafe {
                        libc::kill(libc::getpid(), libc::SIGTERM);
                    }
                }
                Ok(vec![TemperatureReading::new("Temp", 45)])
            }
        }

        fn config() -> GovernorConfig {
            GovernorConfig {
                controller: Default::default(),
                control: Default::default(),
                curve: CurveSettings {
                    low_temp_threshold: 30,
                    high_temp_threshold: 70,
                    min_fan_floor_percent: 20,
                },
                limiter: LimiterSettings {
                    max_step_percent: 10,
                    deadband_percent: 2,
                },
                sensors: Default::default(),
                profile: CommandProfile::default(),
                logging: Default::default(),
            }
        }

        #[tokio::test]
        async fn sigterm_during_first_cycle_restores_automatic() {
            let shutdown = ShutdownSignal::install().unwrap();

            let transport = RecordingTransport::default();
            let profile = CompiledProfile::compile(&CommandProfile::default()).unwrap();
            let session = LoopSession::acquire(ControllerGateway::new(Box::new(transport.clone()), profile));
            let source = TerminatingSource { calls: AtomicUsize::new(0) };
            let control = ControlLoop::new(&config(), Box::new(source), session);

            let result = tokio::time::timeout(std::time::Duration::from_secs(5), control.run(shutdown.wait()))
                .await
                .expect("loop should stop on the queued SIGTERM");

            assert!(result.is_ok());
            // first cycle completes, then teardown hands fans back exactly once
            assert_eq!(
                transport.commands(),
                vec!["disable_automatic", "set_speed", "enable_automatic"]
            );
        }
    }
}
