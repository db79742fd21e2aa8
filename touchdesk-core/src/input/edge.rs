//! Edge detection
//!
//! `pressed && !last` is a press-start, `pressed && last` a held sample,
//! `!pressed && last` a release. Two released samples in a row produce
//! nothing.

use touchdesk_display::Point;

use crate::traits::TouchSample;

/// Phase of a touch edge event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchPhase {
    Press,
    Held,
    Release,
}

/// Edge-triggered touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Touch position; for a release, the last pressed position
    pub pos: Point,
}

impl TouchEvent {
    pub const fn press(x: i32, y: i32) -> Self {
        Self {
            phase: TouchPhase::Press,
            pos: Point::new(x, y),
        }
    }

    pub const fn held(x: i32, y: i32) -> Self {
        Self {
            phase: TouchPhase::Held,
            pos: Point::new(x, y),
        }
    }

    pub const fn release(x: i32, y: i32) -> Self {
        Self {
            phase: TouchPhase::Release,
            pos: Point::new(x, y),
        }
    }

    /// True while the finger is on the panel
    pub fn is_down(&self) -> bool {
        !matches!(self.phase, TouchPhase::Release)
    }
}

/// Derives edge events from consecutive samples
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    last_pressed: bool,
    last_pos: Point,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the previous sample was pressed
    pub fn last_pressed(&self) -> bool {
        self.last_pressed
    }

    /// Feed this tick's sample
    pub fn feed(&mut self, sample: TouchSample) -> Option<TouchEvent> {
        let was = self.last_pressed;
        self.last_pressed = sample.pressed;

        match (sample.pressed, was) {
            (true, false) => {
                self.last_pos = sample.point();
                Some(TouchEvent {
                    phase: TouchPhase::Press,
                    pos: self.last_pos,
                })
            }
            (true, true) => {
                self.last_pos = sample.point();
                Some(TouchEvent {
                    phase: TouchPhase::Held,
                    pos: self.last_pos,
                })
            }
            (false, true) => Some(TouchEvent {
                phase: TouchPhase::Release,
                pos: self.last_pos,
            }),
            (false, false) => None,
        }
    }
}
