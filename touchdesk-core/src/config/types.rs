//! Configuration type definitions
//!
//! All fields carry `#[serde(default)]` semantics at the struct level so a
//! partial TOML file only overrides what it names.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capacity of every on-screen keyboard text buffer
pub const KB_TEXT_MAX: usize = 256;

/// Gesture disambiguation thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct GestureConfig {
    /// Movement on either axis that latches a drag
    pub drag_threshold_px: i32,
    /// Press duration without movement that counts as a long hold
    pub hold_ms: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 10,
            hold_ms: 380,
        }
    }
}

/// On-screen keyboard timing and hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct KeyboardConfig {
    /// Margin around each key that still counts as a hit
    pub hit_pad_px: i32,
    /// Delay before Delete starts repeating
    pub repeat_delay_ms: u32,
    /// Interval between Delete repeats
    pub repeat_interval_ms: u32,
    /// Holding Caps this long clears the text
    pub caps_clear_hold_ms: u32,
    /// Release is honoured only after no contact for this long
    pub release_debounce_ms: u32,
    /// Maximum text length, capped at [`KB_TEXT_MAX`]
    pub text_max: u16,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            hit_pad_px: 10,
            repeat_delay_ms: 450,
            repeat_interval_ms: 80,
            caps_clear_hold_ms: 500,
            release_debounce_ms: 70,
            text_max: KB_TEXT_MAX as u16,
        }
    }
}

/// Wifi scan and connect behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct WifiConfig {
    /// A running scan is abandoned after this long
    pub scan_timeout_ms: u32,
    /// Wait between scan attempts after a failure
    pub retry_backoff_ms: u32,
    /// Attempts after the first one before giving up
    pub max_retries: u8,
    /// Connection attempts not finished by then are reported as failed
    pub connect_timeout_ms: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            scan_timeout_ms: 15_000,
            retry_backoff_ms: 350,
            max_retries: 3,
            connect_timeout_ms: 12_000,
        }
    }
}

/// Panel geometry and periodic refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DisplayConfig {
    pub width: i32,
    pub height: i32,
    /// Minimum interval between taskbar clock repaints
    pub status_refresh_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            status_refresh_ms: 900,
        }
    }
}

/// Paint application limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PaintConfig {
    /// RAM budget, in canvas cells, for selection and flood-fill scratch
    /// buffers; `None` leaves it to the allocator
    pub scratch_budget_cells: Option<u32>,
    /// How long a status-bar message stays up
    pub status_ms: u32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            scratch_budget_cells: None,
            status_ms: 1500,
        }
    }
}

/// Complete shell configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ShellConfig {
    pub gesture: GestureConfig,
    pub keyboard: KeyboardConfig,
    pub wifi: WifiConfig,
    pub display: DisplayConfig,
    pub paint: PaintConfig,
}

impl ShellConfig {
    /// Clamp values that would break invariants if taken literally
    pub fn sanitized(mut self) -> Self {
        self.gesture.drag_threshold_px = self.gesture.drag_threshold_px.max(1);
        self.keyboard.hit_pad_px = self.keyboard.hit_pad_px.max(0);
        self.keyboard.repeat_interval_ms = self.keyboard.repeat_interval_ms.max(1);
        self.keyboard.text_max = self.keyboard.text_max.min(KB_TEXT_MAX as u16);
        self.display.width = self.display.width.max(1);
        self.display.height = self.display.height.max(1);
        self
    }
}
