//! Step limit and deadband applied to the curve output before it reaches the BMC.

use crate::config::types::LimiterSettings;
use crate::hardware::types::FanSpeedPercent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedLimiter {
    max_step: u8,
    deadband: u8,
}

impl SpeedLimiter {
    pub fn new(settings: &LimiterSettings) -> Self {
        Self {
            max_step: settings.max_step_percent,
            deadband: settings.deadband_percent,
        }
    }

    /// Ignore changes smaller than the deadband, otherwise move toward
    /// `target` by at most `max_step`.
    pub fn limit(&self, target: FanSpeedPercent, previous: FanSpeedPercent) -> FanSpeedPercent {
        let target = i16::from(target.get());
        let previous_raw = i16::from(previous.get());
        let delta = target - previous_raw;

        if delta.abs() < i16::from(self.deadband) {
            return previous;
        }

        let step = delta.clamp(-i16::from(self.max_step), i16::from(self.max_step));
        FanSpeedPercent::saturating(i64::from(previous_raw + step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(v: u8) -> FanSpeedPercent {
        FanSpeedPercent::new(v).unwrap()
    }

    fn limiter(max_step: u8, deadband: u8) -> SpeedLimiter {
        SpeedLimiter::new(&LimiterSettings {
            max_step_percent: max_step,
            deadband_percent: deadband,
        })
    }

    #[test]
    fn caps_rise_and_fall() {
        let l = limiter(10, 2);
        assert_eq!(l.limit(pct(44), pct(20)).get(), 30);
        assert_eq!(l.limit(pct(20), pct(60)).get(), 50);
        assert_eq!(l.limit(pct(25), pct(20)).get(), 25);
    }

    #[test]
    fn deadband_holds_previous() {
        let l = limiter(10, 2);
        assert_eq!(l.limit(pct(41), pct(40)).get(), 40);
        assert_eq!(l.limit(pct(39), pct(40)).get(), 40);
        assert_eq!(l.limit(pct(42), pct(40)).get(), 42);
    }

    #[test]
    fn zero_deadband_applies_every_change() {
        let l = limiter(5, 0);
        assert_eq!(l.limit(pct(41), pct(40)).get(), 41);
        assert_eq!(l.limit(pct(40), pct(40)).get(), 40);
    }

    #[test]
    fn properties_hold_for_every_pair() {
        for (step, band) in [(10u8, 2u8), (1, 0), (100, 0), (3, 7), (25, 25)] {
            let l = limiter(step, band);
            for prev in 0..=100u8 {
                for target in 0..=100u8 {
                    let out = l.limit(pct(target), pct(prev)).get();
                    let moved = (i16::from(out) - i16::from(prev)).abs();
                    assert!(moved <= i16::from(step));
                    if (i16::from(target) - i16::from(prev)).abs() < i16::from(band) {
                        assert_eq!(out, prev);
                    }
                    // never overshoots the target
                    let lo = prev.min(target);
                    let hi = prev.max(target);
                    assert!((lo..=hi).contains(&out));
                }
            }
        }
    }
}
