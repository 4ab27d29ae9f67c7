//! Temperature to fan speed mapping: floor below `low`, full speed at `high`,
//! linear in between.

use crate::config::types::CurveSettings;
use crate::hardware::types::FanSpeedPercent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanCurve {
    low: i32,
    high: i32,
    floor: FanSpeedPercent,
}

impl FanCurve {
    /// Settings are validated at config load (low < high, floor 1-100);
    /// the curve still behaves if handed something odd.
    pub fn new(settings: &CurveSettings) -> Self {
        Self {
            low: settings.low_temp_threshold,
            high: settings.high_temp_threshold,
            floor: FanSpeedPercent::saturating(i64::from(settings.min_fan_floor_percent)),
        }
    }

    pub fn floor(&self) -> FanSpeedPercent {
        self.floor
    }

    /// Total and monotone non-decreasing over every i32.
    pub fn speed_for(&self, celsius: i32) -> FanSpeedPercent {
        if celsius <= self.low {
            return self.floor;
        }
        if celsius >= self.high {
            return FanSpeedPercent::MAX;
        }

        let floor = i64::from(self.floor.get());
        let span = i64::from(self.high) - i64::from(self.low);
        let above = i64::from(celsius) - i64::from(self.low);
        FanSpeedPercent::saturating(floor + above * (100 - floor) / span)
    }
}
