//! Tap / long-hold / drag disambiguation
//!
//! Evaluated on every held sample until one outcome latches:
//!
//! - movement beyond the drag threshold on either axis latches a drag,
//!   which stays latched until release
//! - otherwise, holding past the hold threshold fires a long hold once
//! - a release before either is a tap
//!
//! A long hold never fires once a drag is latched, and a drag never
//! latches after a long hold fired (the menu owns the rest of the gesture).

use touchdesk_display::{Point, Rect};

use crate::config::GestureConfig;

/// Classification of a held sample or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Nothing to do yet
    Still,
    /// Released before any threshold
    Tap,
    /// Held in place past the hold threshold
    LongHold,
    /// Dragging; deltas are relative to the previous sample
    DragMove { dx: i32, dy: i32 },
}

/// State of one press, from press-start to release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DragToken {
    origin: Point,
    last: Point,
    start_ms: u32,
    moved: bool,
    long_held: bool,
}

impl DragToken {
    /// Where the press started
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Most recent position
    pub fn position(&self) -> Point {
        self.last
    }

    /// Total movement since press-start
    pub fn offset(&self) -> Point {
        self.last - self.origin
    }

    /// A drag has latched
    pub fn is_dragging(&self) -> bool {
        self.moved
    }

    /// The long hold has fired
    pub fn is_long_held(&self) -> bool {
        self.long_held
    }
}

/// Drop-zone collaborator for [`DragController::drop_on`]
///
/// `zone_at` is the collision test; `on_drop` applies the side effect and
/// reports whether it took place (returning `false` rolls back to a plain
/// move).
pub trait DropZones {
    type Target: Copy;
    type Zone: Copy;

    /// Drop zone under `pos` that accepts `target`
    fn zone_at(&self, target: Self::Target, pos: Point) -> Option<Self::Zone>;

    /// Apply dropping `target` on `zone`
    fn on_drop(&mut self, target: Self::Target, zone: Self::Zone) -> bool;
}

/// Position `rect` so it lies entirely within `bounds`
pub fn clamp_position(rect: Rect, bounds: Rect) -> Rect {
    rect.clamp_within(&bounds)
}

/// Hold-vs-drag-vs-tap classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DragController {
    threshold_px: i32,
    hold_ms: u32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

impl DragController {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            threshold_px: config.drag_threshold_px,
            hold_ms: config.hold_ms,
        }
    }

    /// Controller with explicit thresholds
    pub const fn with_thresholds(threshold_px: i32, hold_ms: u32) -> Self {
        Self {
            threshold_px,
            hold_ms,
        }
    }

    pub fn threshold_px(&self) -> i32 {
        self.threshold_px
    }

    pub fn hold_ms(&self) -> u32 {
        self.hold_ms
    }

    /// Start tracking a press
    pub fn begin(&self, pos: Point, now_ms: u32) -> DragToken {
        DragToken {
            origin: pos,
            last: pos,
            start_ms: now_ms,
            moved: false,
            long_held: false,
        }
    }

    /// Start tracking a press that is a drag from the first sample
    pub fn begin_latched(&self, pos: Point, now_ms: u32) -> DragToken {
        DragToken {
            moved: true,
            ..self.begin(pos, now_ms)
        }
    }

    /// Classify a held sample
    pub fn update(&self, token: &mut DragToken, pos: Point, now_ms: u32) -> Gesture {
        if token.moved {
            let delta = pos - token.last;
            token.last = pos;
            return if delta == Point::zero() {
                Gesture::Still
            } else {
                Gesture::DragMove {
                    dx: delta.x,
                    dy: delta.y,
                }
            };
        }

        if token.long_held {
            token.last = pos;
            return Gesture::Still;
        }

        let from_origin = pos - token.origin;
        if from_origin.x.abs() > self.threshold_px || from_origin.y.abs() > self.threshold_px {
            token.moved = true;
            token.last = pos;
            return Gesture::DragMove {
                dx: from_origin.x,
                dy: from_origin.y,
            };
        }

        token.last = pos;
        if now_ms.wrapping_sub(token.start_ms) >= self.hold_ms {
            token.long_held = true;
            return Gesture::LongHold;
        }

        Gesture::Still
    }

    /// Classify the release
    ///
    /// A tap needs no drag, no long hold, and a press shorter than the
    /// hold threshold.
    pub fn end(&self, token: DragToken, now_ms: u32) -> Gesture {
        if !token.moved && !token.long_held && now_ms.wrapping_sub(token.start_ms) < self.hold_ms {
            Gesture::Tap
        } else {
            Gesture::Still
        }
    }

    /// Drop-target test for a finished drag
    ///
    /// Returns the zone the target was dropped on if the drop was applied.
    pub fn drop_on<Z: DropZones>(
        &self,
        token: &DragToken,
        target: Z::Target,
        zones: &mut Z,
    ) -> Option<Z::Zone> {
        if !token.moved {
            return None;
        }
        let zone = zones.zone_at(target, token.last)?;
        if zones.on_drop(target, zone) {
            Some(zone)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller() -> DragController {
        DragController::default()
    }

    #[test]
    fn test_quick_release_is_tap() {
        let c = controller();
        let mut t = c.begin(Point::new(50, 50), 1000);
        assert_eq!(c.update(&mut t, Point::new(53, 48), 1100), Gesture::Still);
        assert_eq!(c.end(t, 1150), Gesture::Tap);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let c = controller();
        let mut t = c.begin(Point::new(50, 50), 0);
        assert_eq!(c.update(&mut t, Point::new(60, 40), 10), Gesture::Still);
        assert_eq!(
            c.update(&mut t, Point::new(61, 40), 20),
            Gesture::DragMove { dx: 11, dy: -10 }
        );
        assert!(t.is_dragging());
    }

    #[test]
    fn test_drag_reports_incremental_deltas() {
        let c = controller();
        let mut t = c.begin(Point::new(0, 0), 0);
        c.update(&mut t, Point::new(20, 0), 10);
        assert_eq!(
            c.update(&mut t, Point::new(25, 3), 20),
            Gesture::DragMove { dx: 5, dy: 3 }
        );
        assert_eq!(c.update(&mut t, Point::new(25, 3), 30), Gesture::Still);
        assert_eq!(t.offset(), Point::new(25, 3));
        // No tap after a drag, and no long hold either
        assert_eq!(c.update(&mut t, Point::new(25, 3), 1000), Gesture::Still);
        assert_eq!(c.end(t, 1010), Gesture::Still);
    }

    #[test]
    fn test_long_hold_fires_once() {
        let c = controller();
        let mut t = c.begin(Point::new(50, 50), 0);
        assert_eq!(c.update(&mut t, Point::new(50, 50), 379), Gesture::Still);
        assert_eq!(c.update(&mut t, Point::new(51, 50), 380), Gesture::LongHold);
        assert_eq!(c.update(&mut t, Point::new(51, 50), 390), Gesture::Still);
        // Moving far after the hold does not start a drag
        assert_eq!(c.update(&mut t, Point::new(150, 50), 400), Gesture::Still);
        assert!(!t.is_dragging());
        assert_eq!(c.end(t, 410), Gesture::Still);
    }

    #[test]
    fn test_latched_drag_moves_immediately() {
        let c = controller();
        let mut t = c.begin_latched(Point::new(10, 10), 0);
        assert_eq!(
            c.update(&mut t, Point::new(11, 10), 10),
            Gesture::DragMove { dx: 1, dy: 0 }
        );
    }

    struct Trash {
        zone: Rect,
        dropped: Option<u8>,
        accept: bool,
    }

    impl DropZones for Trash {
        type Target = u8;
        type Zone = ();

        fn zone_at(&self, target: u8, pos: Point) -> Option<()> {
            (target != 0 && self.zone.contains(pos)).then_some(())
        }

        fn on_drop(&mut self, target: u8, _zone: ()) -> bool {
            if self.accept {
                self.dropped = Some(target);
            }
            self.accept
        }
    }

    #[test]
    fn test_drop_on_zone() {
        let c = controller();
        let mut zones = Trash {
            zone: Rect::new(100, 100, 40, 40),
            dropped: None,
            accept: true,
        };

        let mut t = c.begin(Point::new(10, 10), 0);
        c.update(&mut t, Point::new(110, 110), 10);
        assert_eq!(c.drop_on(&t, 3, &mut zones), Some(()));
        assert_eq!(zones.dropped, Some(3));

        // Target the zone refuses
        assert_eq!(c.drop_on(&t, 0, &mut zones), None);

        // Rolled back by the callout
        zones.accept = false;
        zones.dropped = None;
        assert_eq!(c.drop_on(&t, 4, &mut zones), None);
        assert_eq!(zones.dropped, None);

        // A tap is never a drop
        let tap = c.begin(Point::new(110, 110), 0);
        zones.accept = true;
        assert_eq!(c.drop_on(&tap, 3, &mut zones), None);
    }

    #[test]
    fn test_clamp_position_keeps_rect_on_screen() {
        let screen = Rect::new(0, 0, 320, 240);
        assert_eq!(
            clamp_position(Rect::new(-20, 230, 40, 40), screen),
            Rect::new(0, 200, 40, 40)
        );
    }

    proptest! {
        /// Small movement released early is a tap
        #[test]
        fn prop_tap_below_thresholds(
            moves in prop::collection::vec((-10i32..=10, -10i32..=10), 0..20),
            release_at in 0u32..380,
        ) {
            let c = controller();
            let origin = Point::new(160, 120);
            let mut t = c.begin(origin, 0);
            let n = moves.len() as u32;
            for (i, (dx, dy)) in moves.into_iter().enumerate() {
                let now = if n == 0 { 0 } else { release_at * i as u32 / n };
                let g = c.update(&mut t, origin + Point::new(dx, dy), now);
                prop_assert_eq!(g, Gesture::Still);
            }
            prop_assert_eq!(c.end(t, release_at), Gesture::Tap);
        }

        /// Movement past the threshold before the hold time is a drag, never a tap
        #[test]
        fn prop_drag_beyond_threshold(
            dx in 11i32..100,
            sign in prop::bool::ANY,
            at in 0u32..380,
        ) {
            let c = controller();
            let origin = Point::new(160, 120);
            let mut t = c.begin(origin, 0);
            let dx = if sign { dx } else { -dx };
            let g = c.update(&mut t, origin + Point::new(dx, 0), at);
            prop_assert_eq!(g, Gesture::DragMove { dx, dy: 0 });
            prop_assert_eq!(c.end(t, at + 5), Gesture::Still);
        }

        /// Staying inside the threshold past the hold time is a long hold
        #[test]
        fn prop_long_hold_under_threshold(
            dx in -10i32..=10,
            dy in -10i32..=10,
            at in 380u32..5000,
        ) {
            let c = controller();
            let origin = Point::new(160, 120);
            let mut t = c.begin(origin, 0);
            prop_assert_eq!(c.update(&mut t, origin + Point::new(dx, dy), at), Gesture::LongHold);
            prop_assert_eq!(c.end(t, at + 5), Gesture::Still);
        }
    }
}
