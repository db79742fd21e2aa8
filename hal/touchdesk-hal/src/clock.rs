//! Monotonic time source
//!
//! Every timer in the shell (hold detection, key repeat, debounce, status
//! refresh) compares a snapshot of this clock taken once at tick entry
//! against stored timestamps. Nothing blocks on it.

use core::cell::Cell;

/// Free-running millisecond counter
///
/// Wraps after ~49 days; consumers compare with `wrapping_sub`.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;
}

/// Clock advanced by hand
///
/// Used on the host and in tests to simulate elapsed time deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    /// Move time forward
    pub fn advance(&self, delta_ms: u32) {
        self.now.set(self.now.get().wrapping_add(delta_ms));
    }

    /// Jump to an absolute time
    pub fn set(&self, now_ms: u32) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
        clock.advance(380);
        assert_eq!(clock.now_ms(), 480);
        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }

    #[test]
    fn test_manual_clock_wraps() {
        let clock = ManualClock::new(u32::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now_ms(), 1);
    }
}
