//! Canvas and floating selection buffers
//!
//! The canvas is a grid of cells, each one colour. A floating selection is
//! a rectangle cut out of the canvas into its own buffer; it is drawn on
//! top of the canvas until it is committed back.
//!
//! Both buffers are heap allocated with `try_reserve_exact` so running out
//! of memory is an ordinary error.

use alloc::vec::Vec;
use core::fmt;

use touchdesk_display::color::palette;
use touchdesk_display::{Point, Rect, Rgb565};

/// Colour of a blank canvas and of the hole a cut leaves behind
pub const BACKGROUND: Rgb565 = palette::WHITE;

/// Scratch buffer allocation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AllocError {
    /// The request does not fit in the configured scratch budget
    OverBudget,
    /// The allocator refused the request
    OutOfMemory,
}

/// Tracks how many scratch cells are held at once
///
/// With no limit only the allocator decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScratchBudget {
    limit: Option<u32>,
    used: u32,
}

impl ScratchBudget {
    pub fn new(limit: Option<u32>) -> Self {
        Self { limit, used: 0 }
    }

    /// Cells currently held
    pub fn in_use(&self) -> u32 {
        self.used
    }

    /// Allocate an empty buffer with room for exactly `cells` items
    pub fn alloc<T>(&mut self, cells: usize) -> Result<Vec<T>, AllocError> {
        let cells32 = u32::try_from(cells).map_err(|_| AllocError::OverBudget)?;
        if let Some(limit) = self.limit {
            if self.used.saturating_add(cells32) > limit {
                return Err(AllocError::OverBudget);
            }
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(cells)
            .map_err(|_| AllocError::OutOfMemory)?;
        self.used += cells32;
        Ok(buf)
    }

    /// Return a buffer obtained from [`alloc`](Self::alloc)
    pub fn free(&mut self, cells: usize) {
        self.used = self.used.saturating_sub(cells as u32);
    }
}

/// Grid of colour cells
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    width: i32,
    height: i32,
    cells: Vec<Rgb565>,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Blank canvas
    pub fn new(width: i32, height: i32) -> Result<Self, AllocError> {
        let width = width.max(1);
        let height = height.max(1);
        let len = (width * height) as usize;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| AllocError::OutOfMemory)?;
        cells.resize(len, BACKGROUND);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The whole grid, in cell coordinates
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn in_grid(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Clamp a cell coordinate onto the grid
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(0, self.width - 1), p.y.clamp(0, self.height - 1))
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Set one cell; off-grid writes are ignored
    pub fn set(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = color;
        }
    }

    /// Fill the on-grid part of `rect`
    pub fn fill(&mut self, rect: Rect, color: Rgb565) {
        let Some(r) = rect.intersection(&self.bounds()) else {
            return;
        };
        for y in r.y..r.bottom() {
            let start = (y * self.width + r.x) as usize;
            self.cells[start..start + r.w as usize].fill(color);
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(BACKGROUND);
    }

    /// Row-major cell colours
    pub fn cells(&self) -> &[Rgb565] {
        &self.cells
    }

    /// Number of cells with `color`
    pub fn count(&self, color: Rgb565) -> usize {
        self.cells.iter().filter(|c| **c == color).count()
    }

    /// Flat index of an on-grid cell
    pub(crate) fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_grid(x, y).then(|| (y * self.width + x) as usize)
    }
}

/// Rectangle lifted off the canvas
#[derive(Clone, PartialEq, Eq)]
pub struct Selection {
    rect: Rect,
    cells: Vec<Rgb565>,
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("rect", &self.rect)
            .finish_non_exhaustive()
    }
}

impl Selection {
    /// Cut the on-grid part of `rect` out of `canvas`
    ///
    /// The hole is filled with [`BACKGROUND`]. On allocation failure the
    /// canvas is left untouched.
    pub fn cut(
        canvas: &mut Canvas,
        rect: Rect,
        budget: &mut ScratchBudget,
    ) -> Result<Self, AllocError> {
        let rect = rect
            .intersection(&canvas.bounds())
            .ok_or(AllocError::OverBudget)?;
        let mut cells = budget.alloc(rect.area() as usize)?;
        for y in rect.y..rect.bottom() {
            let start = (y * canvas.width + rect.x) as usize;
            cells.extend_from_slice(&canvas.cells[start..start + rect.w as usize]);
        }
        canvas.fill(rect, BACKGROUND);
        Ok(Self { rect, cells })
    }

    /// Current position and size, in cells
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn origin(&self) -> Point {
        self.rect.top_left()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    /// Colour at canvas cell `(x, y)` if the selection covers it
    pub fn get(&self, x: i32, y: i32) -> Option<Rgb565> {
        if !self.rect.contains(Point::new(x, y)) {
            return None;
        }
        let i = (y - self.rect.y) * self.rect.w + (x - self.rect.x);
        self.cells.get(i as usize).copied()
    }

    /// Move so the top-left is at `origin`, kept wholly inside `bounds`
    pub fn move_to(&mut self, origin: Point, bounds: Rect) {
        self.rect = self.rect.with_origin(origin).clamp_within(&bounds);
    }

    /// Write the buffer back into the canvas and release it
    pub fn commit(self, canvas: &mut Canvas, budget: &mut ScratchBudget) {
        let r = self.rect;
        for (i, color) in self.cells.iter().enumerate() {
            let i = i as i32;
            canvas.set(r.x + i % r.w, r.y + i / r.w, *color);
        }
        budget.free(self.cells.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_blank() {
        let c = Canvas::new(12, 7).unwrap();
        assert_eq!(c.len(), 84);
        assert_eq!(c.count(BACKGROUND), 84);
        assert_eq!(c.get(12, 0), None);
        assert_eq!(c.get(-1, 0), None);
    }

    #[test]
    fn test_fill_is_clipped() {
        let mut c = Canvas::new(10, 10).unwrap();
        c.fill(Rect::new(8, 8, 5, 5), palette::RED);
        assert_eq!(c.count(palette::RED), 4);
        c.set(50, 50, palette::RED);
        assert_eq!(c.count(palette::RED), 4);
    }

    #[test]
    fn test_budget_limits_and_frees() {
        let mut b = ScratchBudget::new(Some(100));
        let v: Vec<u32> = b.alloc(60).unwrap();
        assert!(v.capacity() >= 60);
        assert_eq!(b.alloc::<u32>(50), Err(AllocError::OverBudget));
        b.free(60);
        assert!(b.alloc::<u32>(100).is_ok());
        assert_eq!(b.in_use(), 100);
    }

    #[test]
    fn test_cut_and_commit() {
        let mut c = Canvas::new(10, 10).unwrap();
        c.set(2, 2, palette::RED);
        let mut budget = ScratchBudget::default();
        let mut sel = Selection::cut(&mut c, Rect::new(1, 1, 3, 3), &mut budget).unwrap();
        assert_eq!(c.count(palette::RED), 0);
        assert_eq!(sel.get(2, 2), Some(palette::RED));
        assert_eq!(budget.in_use(), 9);

        sel.move_to(Point::new(20, -4), c.bounds());
        assert_eq!(sel.rect(), Rect::new(7, 0, 3, 3));
        sel.commit(&mut c, &mut budget);
        assert_eq!(c.get(8, 1), Some(palette::RED));
        assert_eq!(budget.in_use(), 0);
    }

    #[test]
    fn test_cut_failure_leaves_canvas() {
        let mut c = Canvas::new(10, 10).unwrap();
        c.fill(Rect::new(0, 0, 10, 10), palette::BLUE);
        let mut budget = ScratchBudget::new(Some(8));
        let before = c.clone();
        assert_eq!(
            Selection::cut(&mut c, Rect::new(0, 0, 3, 3), &mut budget).unwrap_err(),
            AllocError::OverBudget
        );
        assert_eq!(c, before);
    }
}
