//! Persisted user settings

use touchdesk_hal::{KeyValueStore, KeyValueStoreExt};

use crate::clock::WallClock;

pub const NAMESPACE: &str = "settings";
const KEY_BRIGHTNESS: &str = "bright";
const KEY_AUTOCONNECT: &str = "autoc";
const KEY_TIME: &str = "time";

pub const BRIGHTNESS_MIN: u8 = 10;
pub const BRIGHTNESS_MAX: u8 = 255;
pub const BRIGHTNESS_STEP: u8 = 10;
pub const DEFAULT_BRIGHTNESS: u8 = 220;

/// User-adjustable settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Backlight level
    pub brightness: u8,
    /// Reconnect to the saved network at boot
    pub autoconnect: bool,
    /// Manually set hour and minute
    pub time: (u8, u8),
    pub clock: WallClock,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            autoconnect: true,
            time: (0, 0),
            clock: WallClock::default(),
        }
    }
}

impl Settings {
    /// Read settings back, taking defaults for anything missing
    pub fn load(store: &mut dyn KeyValueStore, now_ms: u32) -> Self {
        let brightness = store
            .get_or(NAMESPACE, KEY_BRIGHTNESS, DEFAULT_BRIGHTNESS)
            .max(BRIGHTNESS_MIN);
        let autoconnect = store.get_or(NAMESPACE, KEY_AUTOCONNECT, true);
        let (hour, minute) = store.get_or(NAMESPACE, KEY_TIME, (0u8, 0u8));
        let clock = WallClock::new(hour, minute, now_ms);
        Self {
            brightness,
            autoconnect,
            time: clock.time(now_ms),
            clock,
        }
    }

    /// Persist and restart the clock from the stored time
    pub fn save(&mut self, store: &mut dyn KeyValueStore, now_ms: u32) {
        self.clock.set(self.time.0, self.time.1, now_ms);
        self.time = self.clock.time(now_ms);

        let ok = store.set(NAMESPACE, KEY_BRIGHTNESS, &self.brightness)
            & store.set(NAMESPACE, KEY_AUTOCONNECT, &self.autoconnect)
            & store.set(NAMESPACE, KEY_TIME, &self.time);
        if !ok {
            #[cfg(feature = "defmt")]
            defmt::warn!("Settings not fully persisted");
        }
    }

    /// Current `(hour, minute)` of the wall clock
    pub fn now(&self, now_ms: u32) -> (u8, u8) {
        self.clock.time(now_ms)
    }
}

/// Next brightness step, saturating at the range ends
pub fn step_brightness(level: u8, up: bool) -> u8 {
    if up {
        level.saturating_add(BRIGHTNESS_STEP).min(BRIGHTNESS_MAX)
    } else {
        level.saturating_sub(BRIGHTNESS_STEP).max(BRIGHTNESS_MIN)
    }
}

/// Hour or minute step that wraps around `modulus`
pub fn step_wrapping(value: u8, up: bool, modulus: u8) -> u8 {
    if up {
        (value + 1) % modulus
    } else {
        (value + modulus - 1) % modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchdesk_hal::MemoryStore;

    #[test]
    fn test_defaults_when_store_empty() {
        let mut store = MemoryStore::new();
        let s = Settings::load(&mut store, 0);
        assert_eq!(s.brightness, 220);
        assert!(s.autoconnect);
        assert_eq!(s.now(0), (0, 0));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut s = Settings::load(&mut store, 0);
        s.brightness = 130;
        s.autoconnect = false;
        s.time = (7, 45);
        s.save(&mut store, 5_000);
        assert_eq!(s.now(5_000 + 60_000), (7, 46));

        let back = Settings::load(&mut store, 90_000);
        assert_eq!(back.brightness, 130);
        assert!(!back.autoconnect);
        assert_eq!(back.now(90_000), (7, 45));
    }

    #[test]
    fn test_brightness_steps_stay_in_range() {
        assert_eq!(step_brightness(250, true), 255);
        assert_eq!(step_brightness(255, true), 255);
        assert_eq!(step_brightness(15, false), 10);
        assert_eq!(step_brightness(220, false), 210);
    }

    #[test]
    fn test_clock_steps_wrap() {
        assert_eq!(step_wrapping(23, true, 24), 0);
        assert_eq!(step_wrapping(0, false, 24), 23);
        assert_eq!(step_wrapping(0, false, 60), 59);
        assert_eq!(step_wrapping(30, true, 60), 31);
    }
}
