//! Damage tracking and region redraw
//!
//! State mutations record the rectangles they changed; the owner later
//! flushes them through its compositor, which repaints every layer that
//! intersects each rectangle back to front. Nothing outside the damage is
//! touched.

use heapless::Vec;
use touchdesk_display::{DrawSurface, Rect};

/// Pending rectangles before they are merged into one
pub const MAX_DAMAGE: usize = 8;

/// Union of the old and new footprint of a changed object
///
/// Either side may be absent (object appeared or disappeared).
pub fn damage_union(old: Option<Rect>, new: Option<Rect>) -> Option<Rect> {
    match (old, new) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
    .filter(|r| !r.is_empty())
}

/// Something that can repaint an arbitrary screen region
pub trait Compositor {
    /// Repaint exactly `rect`, recompositing every layer that intersects it
    fn redraw_region(&mut self, surface: &mut dyn DrawSurface, rect: Rect);

    /// Repaint everything
    ///
    /// Must leave the surface identical to `redraw_region(bounds)`.
    fn draw_full(&mut self, surface: &mut dyn DrawSurface);
}

/// Set of damaged rectangles awaiting redraw
#[derive(Debug, Clone, Default)]
pub struct DamageList {
    rects: Vec<Rect, MAX_DAMAGE>,
}

impl DamageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Record one damaged rectangle
    ///
    /// Rectangles already covered are dropped, and when the list is full
    /// everything collapses into a single bounding rectangle.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        if self.rects.iter().any(|r| r.contains_rect(&rect)) {
            return;
        }
        self.rects.retain(|r| !rect.contains_rect(r));
        if self.rects.push(rect).is_err() {
            let merged = self.rects.iter().fold(rect, |acc, r| acc.union(r));
            self.rects.clear();
            // Cannot fail: the list was just cleared
            let _ = self.rects.push(merged);
        }
    }

    /// Record the union of an object's old and new footprint
    pub fn add_change(&mut self, old: Option<Rect>, new: Option<Rect>) {
        if let Some(r) = damage_union(old, new) {
            self.add(r);
        }
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Take every pending rectangle, leaving the list empty
    pub fn take(&mut self) -> Vec<Rect, MAX_DAMAGE> {
        core::mem::take(&mut self.rects)
    }

    /// Repaint all pending damage through `compositor`
    pub fn flush<C: Compositor + ?Sized>(
        &mut self,
        compositor: &mut C,
        surface: &mut dyn DrawSurface,
    ) {
        for rect in self.take() {
            compositor.redraw_region(surface, rect);
        }
    }
}
