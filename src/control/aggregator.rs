//! Reduce a cycle's readings to one representative temperature.

use crate::config::types::AggregationStrategy;
use crate::error::{ControlError, ControlResult};
use crate::hardware::types::TemperatureReading;

/// Empty input is `NoReadings`, never 0°C.
pub fn aggregate(readings: &[TemperatureReading], strategy: AggregationStrategy) -> ControlResult<i32> {
    if readings.is_empty() {
        return Err(ControlError::NoReadings);
    }

    let value = match strategy {
        AggregationStrategy::Mean => {
            let sum: i64 = readings.iter().map(|r| i64::from(r.celsius)).sum();
            // i64 division truncates toward zero; the mean of i32s fits in i32
            (sum / readings.len() as i64) as i32
        }
        AggregationStrategy::Max => readings
            .iter()
            .map(|r| r.celsius)
            .max()
            .ok_or(ControlError::NoReadings)?,
    };

    Ok(value)
}

/// Hottest single reading, used for the emergency check.
pub fn hottest(readings: &[TemperatureReading]) -> Option<&TemperatureReading> {
    readings.iter().max_by_key(|r| r.celsius)
}
