//! Test doubles for the hardware seams.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::types::TemperatureReading;
use super::{RawTransport, TemperatureSource};
use crate::error::{ControlError, ControlResult};

/// Tolerates poisoning: the session's Drop sends frames while a test is unwinding.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Records every frame; selected commands can be made to fail.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    frames: Arc<Mutex<Vec<(&'static str, Vec<u8>)>>>,
    failures: Arc<Mutex<HashMap<&'static str, u8>>>,
}

impl RecordingTransport {
    pub fn fail_with(&self, command: &'static str, code: u8) {
        lock(&self.failures).insert(command, code);
    }

    pub fn recover(&self, command: &'static str) {
        lock(&self.failures).remove(command);
    }

    pub fn frames(&self) -> Vec<(&'static str, Vec<u8>)> {
        lock(&self.frames).clone()
    }

    pub fn commands(&self) -> Vec<&'static str> {
        lock(&self.frames).iter().map(|(c, _)| *c).collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands().iter().filter(|c| **c == command).count()
    }

    pub fn clear(&self) {
        lock(&self.frames).clear();
    }

    /// Speed byte of the most recent set_speed frame.
    pub fn last_speed(&self) -> Option<u8> {
        lock(&self.frames)
            .iter()
            .rev()
            .find(|(c, _)| *c == "set_speed")
            .and_then(|(_, f)| f.last().copied())
    }
}

impl RawTransport for RecordingTransport {
    fn send(&self, command: &'static str, frame: &[u8]) -> ControlResult<Vec<u8>> {
        lock(&self.frames).push((command, frame.to_vec()));
        if let Some(code) = lock(&self.failures).get(command) {
            return Err(ControlError::HardwareCommand {
                command,
                code: *code,
                detail: "injected failure".to_string(),
            });
        }
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub enum Step {
    Temps(Vec<i32>),
    Fail,
    Malformed,
    Hang,
}

/// Plays back a script of sensor results; repeats the last step once exhausted.
#[derive(Clone)]
pub struct ScriptedSource {
    steps: Arc<Mutex<VecDeque<Step>>>,
    last: Arc<Mutex<Step>>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            last: Arc::new(Mutex::new(Step::Fail)),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }

    fn next_step(&self) -> Step {
        *lock(&self.calls) += 1;
        let mut last = lock(&self.last);
        if let Some(step) = lock(&self.steps).pop_front() {
            *last = step;
        }
        last.clone()
    }
}

#[async_trait]
impl TemperatureSource for ScriptedSource {
    async fn read(&self) -> ControlResult<Vec<TemperatureReading>> {
        match self.next_step() {
            Step::Temps(temps) => Ok(temps
                .into_iter()
                .map(|t| TemperatureReading::new("Temp", t))
                .collect()),
            Step::Fail => Err(ControlError::sensor_read("scripted failure")),
            Step::Malformed => Err(ControlError::SensorParse {
                line: "Temp | 0Eh | ok | 3.1 | garbage".to_string(),
            }),
            Step::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
