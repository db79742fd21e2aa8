//! Screen geometry
//!
//! `Point` is the embedded-graphics point. `Rect` is a half-open integer
//! rectangle `[x, x + w) × [y, y + h)`; every damage computation in the
//! shell is expressed with it.

use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

pub use embedded_graphics::prelude::Point;

/// Axis-aligned rectangle, half-open on the right and bottom edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// The empty rectangle at the origin
    pub const EMPTY: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest rectangle containing both corner points (inclusive)
    pub fn from_points(a: Point, b: Point) -> Self {
        let x0 = a.x.min(b.x);
        let y0 = a.y.min(b.y);
        let x1 = a.x.max(b.x);
        let y1 = a.y.max(b.y);
        Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }

    /// Exclusive right edge
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Number of pixels covered
    pub const fn area(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.w * self.h
        }
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Hit test against this rectangle grown by `pad` on every side
    pub const fn contains_padded(&self, p: Point, pad: i32) -> bool {
        p.x >= self.x - pad
            && p.x < self.right() + pad
            && p.y >= self.y - pad
            && p.y < self.bottom() + pad
    }

    /// Check if `other` lies entirely inside this rectangle
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Bounding box of both rectangles; empty sides are ignored
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Grow (or shrink, with a negative amount) on every side
    pub const fn inflate(&self, d: i32) -> Rect {
        Rect::new(self.x - d, self.y - d, self.w + 2 * d, self.h + 2 * d)
    }

    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub const fn with_origin(&self, p: Point) -> Rect {
        Rect::new(p.x, p.y, self.w, self.h)
    }

    /// Shift this rectangle so it lies entirely within `bounds`
    ///
    /// A rectangle larger than `bounds` on an axis is pinned to the
    /// bounds' origin on that axis.
    pub fn clamp_within(&self, bounds: &Rect) -> Rect {
        let max_x = bounds.right() - self.w;
        let max_y = bounds.bottom() - self.h;
        let x = if max_x < bounds.x {
            bounds.x
        } else {
            self.x.clamp(bounds.x, max_x)
        };
        let y = if max_y < bounds.y {
            bounds.y
        } else {
            self.y.clamp(bounds.y, max_y)
        };
        Rect::new(x, y, self.w, self.h)
    }

    /// Convert to an embedded-graphics rectangle (empty maps to zero size)
    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::new(
            self.top_left(),
            Size::new(self.w.max(0) as u32, self.h.max(0) as u32),
        )
    }
}

impl From<Rectangle> for Rect {
    fn from(r: Rectangle) -> Self {
        Rect::new(
            r.top_left.x,
            r.top_left.y,
            r.size.width as i32,
            r.size.height as i32,
        )
    }
}
