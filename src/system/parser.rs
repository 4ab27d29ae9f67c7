//! `ipmitool sdr type temperature` output parser.
//! Converts the pipe-delimited SDR table into TemperatureReading structs,
//! keeping only rows whose name column matches the configured category.

use tracing::debug;

use crate::config::types::SensorSettings;
use crate::error::{ControlError, ControlResult};
use crate::hardware::types::TemperatureReading;

const NAME_COL: usize = 0;
const RECORD_COL: usize = 1;
const STATUS_COL: usize = 2;
const READING_COL: usize = 4;

/// Parse SDR output into readings.
/// Input:  "Temp             | 0Eh | ok  |  3.1 | 40 degrees C\n..."
/// Filter: rows where the name column equals `settings.category` ("Temp")
pub fn parse_temperatures(output: &str, settings: &SensorSettings) -> ControlResult<Vec<TemperatureReading>> {
    let mut readings = Vec::new();

    for line in output.lines() {
        let cols: Vec<&str> = line.split('|').map(str::trim).collect();
        if cols[NAME_COL] != settings.category {
            continue;
        }

        if cols.len() <= READING_COL {
            return Err(ControlError::SensorParse { line: line.to_string() });
        }

        // "ns": no reading, the sensor is absent or disabled
        if cols[STATUS_COL].eq_ignore_ascii_case("ns") {
            debug!("Skipping {} {} (status ns)", cols[NAME_COL], cols[RECORD_COL]);
            continue;
        }

        let raw = cols[READING_COL];
        let value = raw.strip_suffix(settings.unit_suffix.as_str()).unwrap_or(raw).trim();
        let celsius = value
            .parse::<i32>()
            .map_err(|_| ControlError::SensorParse { line: line.to_string() })?;

        readings.push(TemperatureReading {
            label: cols[NAME_COL].to_string(),
            record_id: Some(cols[RECORD_COL].to_string()).filter(|id| !id.is_empty()),
            celsius,
        });
    }

    Ok(readings)
}
