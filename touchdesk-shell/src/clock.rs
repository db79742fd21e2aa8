//! Wall clock for the status strip
//!
//! There is no RTC: the user sets hour and minute by hand and the clock
//! runs from the monotonic millisecond counter after that.

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Hour and minute derived from a manual setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallClock {
    /// Minutes past midnight when the clock was set
    base_min: u16,
    set_at_ms: u32,
}

impl WallClock {
    /// Clock reading `hour:minute` at `now_ms`
    ///
    /// Out-of-range values are clamped to 0..=23 and 0..=59.
    pub fn new(hour: u8, minute: u8, now_ms: u32) -> Self {
        let mut clock = Self::default();
        clock.set(hour, minute, now_ms);
        clock
    }

    pub fn set(&mut self, hour: u8, minute: u8, now_ms: u32) {
        let hour = hour.min(23) as u16;
        let minute = minute.min(59) as u16;
        self.base_min = hour * 60 + minute;
        self.set_at_ms = now_ms;
    }

    /// Current `(hour, minute)`
    pub fn time(&self, now_ms: u32) -> (u8, u8) {
        let elapsed_min = now_ms.wrapping_sub(self.set_at_ms) / 60_000;
        let total = (self.base_min as u32 + elapsed_min) % MINUTES_PER_DAY;
        ((total / 60) as u8, (total % 60) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_from_set_time() {
        let clock = WallClock::new(9, 58, 1_000);
        assert_eq!(clock.time(1_000), (9, 58));
        assert_eq!(clock.time(60_999), (9, 58));
        assert_eq!(clock.time(61_000), (9, 59));
        assert_eq!(clock.time(1_000 + 3 * 60_000), (10, 1));
    }

    #[test]
    fn test_wraps_at_midnight() {
        let clock = WallClock::new(23, 59, 0);
        assert_eq!(clock.time(60_000), (0, 0));
    }

    #[test]
    fn test_clamps_input() {
        let clock = WallClock::new(40, 75, 0);
        assert_eq!(clock.time(0), (23, 59));
    }

    #[test]
    fn test_survives_counter_wrap() {
        let clock = WallClock::new(12, 0, u32::MAX - 59_999);
        assert_eq!(clock.time(0), (12, 1));
    }
}
