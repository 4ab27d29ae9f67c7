//! The control loop: read, aggregate, map, limit, apply, on a fixed period.
//! Any failure along the way hands the fans back to the BMC for this cycle.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::aggregator::{aggregate, hottest};
use super::curve::FanCurve;
use super::limiter::SpeedLimiter;
use super::session::LoopSession;
use super::state::ControlState;
use crate::config::types::{AggregationStrategy, GovernorConfig};
use crate::error::{ControlError, ControlResult};
use crate::hardware::types::{FanSpeedPercent, TemperatureReading};
use crate::hardware::{read_bounded, TemperatureSource};

pub struct ControlLoop {
    source: Box<dyn TemperatureSource>,
    session: LoopSession,
    curve: FanCurve,
    limiter: SpeedLimiter,
    aggregation: AggregationStrategy,
    poll_interval: Duration,
    sensor_timeout: Duration,
    emergency_temp: Option<i32>,
    state: ControlState,
    last_applied: FanSpeedPercent,
}

impl ControlLoop {
    pub fn new(config: &GovernorConfig, source: Box<dyn TemperatureSource>, session: LoopSession) -> Self {
        let curve = FanCurve::new(&config.curve);
        let floor = curve.floor();
        Self {
            source,
            session,
            curve,
            limiter: SpeedLimiter::new(&config.limiter),
            aggregation: config.sensors.aggregation,
            poll_interval: Duration::from_secs_f64(config.control.poll_interval_seconds),
            sensor_timeout: Duration::from_secs_f64(config.control.sensor_timeout_seconds),
            emergency_temp: config.control.emergency_temp,
            state: ControlState::Automatic,
            last_applied: floor,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ControlState {
        self.state
    }

    #[cfg(test)]
    pub fn last_applied(&self) -> FanSpeedPercent {
        self.last_applied
    }

    /// Tick until `shutdown` resolves, then return fans to the BMC.
    /// Shutdown is observed while sleeping between ticks.
    pub async fn run<F>(mut self, shutdown: F) -> ControlResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Control loop running: poll every {:?}, sensor timeout {:?}, {:?} aggregation",
            self.poll_interval, self.sensor_timeout, self.aggregation
        );

        loop {
            self.tick().await;

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, leaving control loop in state {}", self.state);
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        self.session.release()
    }

    /// One control cycle. Never fails; faults end in BMC automatic mode.
    pub async fn tick(&mut self) -> ControlState {
        let readings = match self.read_sensors().await {
            Ok(readings) => readings,
            Err(e) => {
                self.fall_back(&e);
                return self.state;
            }
        };

        let temperature = match aggregate(&readings, self.aggregation) {
            Ok(t) => t,
            Err(e) => {
                self.fall_back(&e);
                return self.state;
            }
        };

        if let Some(hot) = self.over_emergency(&readings) {
            warn!(
                "EMERGENCY: sensor {} at {}°C >= {}°C, handing fans to BMC",
                hot.label,
                hot.celsius,
                self.emergency_temp.unwrap_or_default()
            );
            self.restore_automatic(ControlState::Degraded);
            return self.state;
        }

        if !self.state.holds_manual_control() {
            if let Err(e) = self.session.gateway().disable_automatic() {
                error!("Could not take manual fan control: {}", e);
                // the BMC may have applied the frame before failing; re-assert automatic
                self.restore_automatic(ControlState::Automatic);
                return self.state;
            }
        }

        let target = self.curve.speed_for(temperature);
        let applied = self.limiter.limit(target, self.last_applied);

        match self.session.gateway().set_speed(applied) {
            Ok(()) => {
                if applied != self.last_applied {
                    info!("{}°C -> target {} -> fan speed {}", temperature, target, applied);
                } else {
                    debug!("{}°C -> target {} -> holding {}", temperature, target, applied);
                }
                self.last_applied = applied;
                self.transition(ControlState::Manual);
            }
            Err(e) => self.fall_back(&e),
        }

        self.state
    }

    async fn read_sensors(&self) -> ControlResult<Vec<TemperatureReading>> {
        read_bounded(self.source.as_ref(), self.sensor_timeout).await
    }

    fn over_emergency<'a>(&self, readings: &'a [TemperatureReading]) -> Option<&'a TemperatureReading> {
        let limit = self.emergency_temp?;
        hottest(readings).filter(|r| r.celsius >= limit)
    }

    fn fall_back(&mut self, cause: &ControlError) {
        error!(
            code = ?cause.completion_code(),
            "Control cycle failed: {}. Falling back to BMC automatic fan control",
            cause
        );
        self.restore_automatic(ControlState::Degraded);
    }

    fn restore_automatic(&mut self, next: ControlState) {
        if let Err(e) = self.session.gateway().enable_automatic() {
            error!("Failed to re-enable BMC automatic fan control: {}", e);
        }
        self.transition(next);
    }

    fn transition(&mut self, next: ControlState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "Control state changed");
            self.state = next;
        }
    }
}
