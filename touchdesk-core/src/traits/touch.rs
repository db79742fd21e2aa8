//! Touch input trait

use touchdesk_display::Point;

/// One level-triggered touch reading
///
/// Produced once per tick. Coordinates are screen pixels, already
/// oriented and clamped by the source; they are meaningless while
/// `pressed` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchSample {
    pub pressed: bool,
    pub x: i32,
    pub y: i32,
}

impl TouchSample {
    pub const RELEASED: TouchSample = TouchSample {
        pressed: false,
        x: 0,
        y: 0,
    };

    pub const fn down(x: i32, y: i32) -> Self {
        Self {
            pressed: true,
            x,
            y,
        }
    }

    pub const fn up(x: i32, y: i32) -> Self {
        Self {
            pressed: false,
            x,
            y,
        }
    }

    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Source of touch samples
///
/// Implementations debounce at the hardware layer and never fail: a bus
/// error reads as "not pressed".
pub trait TouchSource {
    /// Sample the panel
    fn poll(&mut self) -> TouchSample;
}
