//! Grid rasterisers
//!
//! Shapes are produced as a stream of cells handed to a `plot` callback,
//! so the same code commits into the canvas and draws uncommitted
//! previews on screen.

use alloc::vec::Vec;

use touchdesk_display::{Point, Rect, Rgb565};

use super::canvas::Canvas;

/// Square of side `2r + 1` centred on `(cx, cy)`
pub fn stamp(cx: i32, cy: i32, r: i32, plot: &mut impl FnMut(i32, i32)) {
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            plot(x, y);
        }
    }
}

/// Bresenham line with a stamp at every step
pub fn line(from: Point, to: Point, r: i32, plot: &mut impl FnMut(i32, i32)) {
    let (mut x, mut y) = (from.x, from.y);
    let dx = (to.x - x).abs();
    let dy = -(to.y - y).abs();
    let sx = if x < to.x { 1 } else { -1 };
    let sy = if y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(x, y, r, plot);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Outline of the rectangle with corners `a` and `b` (inclusive)
pub fn rect_outline(a: Point, b: Point, r: i32, plot: &mut impl FnMut(i32, i32)) {
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    line(Point::new(x0, y0), Point::new(x1, y0), r, plot);
    line(Point::new(x1, y0), Point::new(x1, y1), r, plot);
    line(Point::new(x1, y1), Point::new(x0, y1), r, plot);
    line(Point::new(x0, y1), Point::new(x0, y0), r, plot);
}

/// Outline of the ellipse inscribed in the box with corners `a` and `b`
///
/// Integer midpoint walk over the bounding box; consecutive cells always
/// touch, so the outline has no gaps at radius 0.
pub fn ellipse_outline(a: Point, b: Point, r: i32, plot: &mut impl FnMut(i32, i32)) {
    if a.x == b.x || a.y == b.y {
        line(a, b, r, plot);
        return;
    }

    let mut x0 = a.x.min(b.x) as i64;
    let mut x1 = a.x.max(b.x) as i64;
    let top = a.y.min(b.y) as i64;

    let w = x1 - x0;
    let h = (a.y - b.y).abs() as i64;
    let odd = h & 1;

    let mut dx = 4 * (1 - w) * h * h;
    let mut dy = 4 * (odd + 1) * w * w;
    let mut err = dx + dy + odd * w * w;

    let mut y0 = top + (h + 1) / 2;
    let mut y1 = y0 - odd;
    let step_y = 8 * w * w;
    let step_x = 8 * h * h;

    let mut put = |x: i64, y: i64| stamp(x as i32, y as i32, r, plot);

    loop {
        put(x1, y0);
        put(x0, y0);
        put(x0, y1);
        put(x1, y1);
        let e2 = 2 * err;
        if e2 <= dy {
            y0 += 1;
            y1 -= 1;
            dy += step_y;
            err += dy;
        }
        if e2 >= dx || 2 * err > dy {
            x0 += 1;
            x1 -= 1;
            dx += step_x;
            err += dx;
        }
        if x0 > x1 {
            break;
        }
    }

    // Thin ellipses stop before the top and bottom rows; finish the tips
    while y0 - y1 <= h {
        put(x0 - 1, y0);
        put(x1 + 1, y0);
        y0 += 1;
        put(x0 - 1, y1);
        put(x1 + 1, y1);
        y1 -= 1;
    }
}

/// 3×5 "A" used by the text tool, top-left at `at`
pub fn text_marker(at: Point, plot: &mut impl FnMut(i32, i32)) {
    const GLYPH: [u8; 5] = [0b010, 0b101, 0b111, 0b101, 0b101];
    for (dy, row) in GLYPH.iter().enumerate() {
        for dx in 0..3 {
            if row & (0b100 >> dx) != 0 {
                plot(at.x + dx, at.y + dy as i32);
            }
        }
    }
}

/// Cells a shape between `a` and `b` may touch, grown by the stamp radius
pub fn shape_bounds(a: Point, b: Point, r: i32) -> Rect {
    Rect::from_points(a, b).inflate(r)
}

/// Replace the 4-connected region of `start`'s colour with `color`
///
/// A cell is checked and recoloured before it is pushed, so the colour
/// doubles as the visited mark and each cell enters the worklist at most
/// once. `worklist` must have capacity for every cell of the canvas.
///
/// Returns the bounding box of the recoloured cells, or `None` if nothing
/// changed (off-grid start, or the region already has `color`).
pub fn flood_fill(
    canvas: &mut Canvas,
    start: Point,
    color: Rgb565,
    worklist: &mut Vec<u32>,
) -> Option<Rect> {
    let old = canvas.get(start.x, start.y)?;
    if old == color {
        return None;
    }

    let width = canvas.width();
    let mut min = start;
    let mut max = start;
    worklist.clear();

    let mut visit = |canvas: &mut Canvas, worklist: &mut Vec<u32>, x: i32, y: i32| {
        let Some(i) = canvas.index(x, y) else {
            return;
        };
        if canvas.get(x, y) != Some(old) || worklist.len() == worklist.capacity() {
            return;
        }
        canvas.set(x, y, color);
        worklist.push(i as u32);
        min = Point::new(min.x.min(x), min.y.min(y));
        max = Point::new(max.x.max(x), max.y.max(y));
    };

    visit(canvas, worklist, start.x, start.y);
    while let Some(i) = worklist.pop() {
        let (x, y) = (i as i32 % width, i as i32 / width);
        visit(canvas, worklist, x + 1, y);
        visit(canvas, worklist, x - 1, y);
        visit(canvas, worklist, x, y + 1);
        visit(canvas, worklist, x, y - 1);
    }

    Some(Rect::from_points(min, max))
}
