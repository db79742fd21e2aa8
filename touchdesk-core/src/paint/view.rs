//! Paint window layout and rendering
//!
//! ```text
//! +------------------------------------------+
//! | title bar                             [X]|
//! | menu line                                |
//! +------+-----------------------------------+
//! | tool |                                   |
//! | grid |        canvas (2 px per cell)     |
//! |      |                                   |
//! +------+-----------------------------------+
//! | colour  | 16 swatches                    |
//! +------------------------------------------+
//! | status                                   |
//! +------------------------------------------+
//! ```

use heapless::Vec;
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};

use super::machine::PaintToolStateMachine;
use super::tool::Tool;

pub const TITLE_H: i32 = 18;
pub const MENU_H: i32 = 14;
pub const STATUS_H: i32 = 12;
pub const TOOLS_W: i32 = 52;
pub const PALETTE_H: i32 = 36;
pub const WORK_Y: i32 = TITLE_H + MENU_H;

/// Screen pixels per canvas cell
pub const PX: i32 = 2;
pub const CANVAS_X: i32 = TOOLS_W + 3;
pub const CANVAS_Y: i32 = WORK_Y + 3;
pub const CANVAS_W: i32 = 252;
pub const CANVAS_H: i32 = 150;
/// Canvas size in cells
pub const GRID_W: i32 = CANVAS_W / PX;
pub const GRID_H: i32 = CANVAS_H / PX;

const TOOL_BTN: i32 = 22;
const TOOL_GAP: i32 = 3;
const TOOL_COLS: i32 = 2;
const TOOL_X: i32 = 6;
const TOOL_Y: i32 = WORK_Y + 4;

const SWATCH: i32 = 14;
const SWATCH_GAP: i32 = 2;
const SWATCH_COLS: i32 = 8;
const SWATCH_X: i32 = 40;

const TITLE_BLUE: Rgb565 = Rgb565::new(0, 20, 28);

/// Selectable colours, two rows of eight
pub const PALETTE: [Rgb565; 16] = [
    palette::BLACK,
    palette::WHITE,
    Rgb565::new(15, 31, 15),
    Rgb565::new(24, 48, 24),
    palette::RED,
    Rgb565::new(31, 45, 0),
    palette::YELLOW,
    palette::GREEN,
    palette::CYAN,
    palette::BLUE,
    palette::MAGENTA,
    Rgb565::new(31, 41, 0),
    Rgb565::new(0, 32, 0),
    Rgb565::new(0, 0, 16),
    Rgb565::new(31, 31, 0),
    Rgb565::new(19, 51, 31),
];

/// Canvas area on screen
pub const fn canvas_rect() -> Rect {
    Rect::new(CANVAS_X, CANVAS_Y, CANVAS_W, CANVAS_H)
}

/// Cell under a screen point, if the point is on the canvas
pub fn cell_at(p: Point) -> Option<Point> {
    canvas_rect()
        .contains(p)
        .then(|| Point::new((p.x - CANVAS_X) / PX, (p.y - CANVAS_Y) / PX))
}

/// Cell under a screen point, clamped onto the canvas
pub fn cell_clamped(p: Point) -> Point {
    Point::new(
        ((p.x - CANVAS_X) / PX).clamp(0, GRID_W - 1),
        ((p.y - CANVAS_Y) / PX).clamp(0, GRID_H - 1),
    )
}

/// Screen rectangle of a rectangle of cells
pub fn cells_to_screen(cells: Rect) -> Rect {
    Rect::new(
        CANVAS_X + cells.x * PX,
        CANVAS_Y + cells.y * PX,
        cells.w * PX,
        cells.h * PX,
    )
}

pub fn tool_button(tool: Tool) -> Rect {
    let i = tool.index() as i32;
    let (col, row) = (i % TOOL_COLS, i / TOOL_COLS);
    Rect::new(
        TOOL_X + col * (TOOL_BTN + TOOL_GAP),
        TOOL_Y + row * (TOOL_BTN + TOOL_GAP),
        TOOL_BTN,
        TOOL_BTN,
    )
}

/// Tool button under `p`; gaps between buttons hit nothing
pub fn tool_at(p: Point) -> Option<Tool> {
    Tool::ALL.into_iter().find(|t| tool_button(*t).contains(p))
}

fn palette_top(screen: Rect) -> i32 {
    screen.bottom() - STATUS_H - PALETTE_H
}

pub fn swatch_rect(screen: Rect, i: usize) -> Rect {
    let i = i as i32;
    let (col, row) = (i % SWATCH_COLS, i / SWATCH_COLS);
    Rect::new(
        SWATCH_X + col * (SWATCH + SWATCH_GAP),
        palette_top(screen) + 4 + row * (SWATCH + SWATCH_GAP),
        SWATCH,
        SWATCH,
    )
}

/// Palette index under `p`
pub fn swatch_at(screen: Rect, p: Point) -> Option<usize> {
    (0..PALETTE.len()).find(|i| swatch_rect(screen, *i).contains(p))
}

/// Close button in the title bar
pub fn close_button(screen: Rect) -> Rect {
    Rect::new(screen.right() - 16, 2, 14, 14)
}

/// Whether `p` hits the close button (the whole top-right corner counts)
pub fn close_hit(screen: Rect, p: Point) -> bool {
    p.x > screen.right() - 16 && p.y < TITLE_H
}

pub fn status_rect(screen: Rect) -> Rect {
    Rect::new(screen.x, screen.bottom() - STATUS_H, screen.w, STATUS_H)
}

fn tools_rect(screen: Rect) -> Rect {
    Rect::new(0, WORK_Y, TOOLS_W, palette_top(screen) - WORK_Y)
}

fn palette_rect(screen: Rect) -> Rect {
    Rect::new(screen.x, palette_top(screen), screen.w, PALETTE_H)
}

/// Most cells blitted in one go
const ROW_CHUNK: usize = 64;
const ROW_PIXELS: usize = ROW_CHUNK * PX as usize;

impl PaintToolStateMachine {
    /// Paint the whole window
    pub fn draw(&mut self, surface: &mut dyn DrawSurface, now_ms: u32) {
        let screen = surface.bounds();
        let _ = surface.fill_rect(screen, palette::CHROME);
        draw_title(surface, screen);
        let _ = surface.fill_rect(Rect::new(0, TITLE_H, screen.w, MENU_H), palette::CHROME_LIGHT);
        let _ = surface.draw_text(
            "File  Edit  View  Image  Colors  Help",
            Point::new(6, TITLE_H + 2),
            Font::Small,
            palette::BLACK,
        );
        self.draw_tools(surface);
        self.draw_palette(surface);
        self.draw_status(surface, now_ms);
        let _ = surface.draw_rect(canvas_rect().inflate(2), palette::CHROME_DARK);
        let _ = surface.draw_rect(canvas_rect().inflate(1), palette::CHROME_DARK);

        self.damage_mut().clear();
        self.render_cells(surface, Rect::new(0, 0, self.canvas().width(), self.canvas().height()));
    }

    /// Repaint the tool grid
    pub fn draw_tools(&self, surface: &mut dyn DrawSurface) {
        let screen = surface.bounds();
        let area = tools_rect(screen);
        let _ = surface.fill_rect(area, palette::CHROME);
        let _ = surface.draw_line(
            Point::new(area.right(), area.y),
            Point::new(area.right(), area.bottom() - 1),
            palette::CHROME_DARK,
        );
        for tool in Tool::ALL {
            let selected = tool == self.tool();
            let fill = if selected { palette::WHITE } else { palette::CHROME };
            let r = tool_button(tool);
            let _ = surface.draw_button(r, "", selected, fill, palette::BLACK);
            if selected {
                let _ = surface.draw_rect(r, palette::BLACK);
            }
            draw_tool_icon(surface, r.center(), tool);
        }
    }

    /// Repaint the colour palette and current-colour box
    pub fn draw_palette(&self, surface: &mut dyn DrawSurface) {
        let screen = surface.bounds();
        let area = palette_rect(screen);
        let _ = surface.fill_rect(area, palette::CHROME_LIGHT);
        let _ = surface.draw_line(
            area.top_left(),
            Point::new(area.right() - 1, area.y),
            palette::CHROME_DARK,
        );

        let bx = 6;
        let by = area.y + 6;
        let _ = surface.draw_frame(Rect::new(bx, by, 18, 18), palette::WHITE, palette::BLACK);
        let _ = surface.draw_frame(Rect::new(bx + 6, by + 6, 18, 18), self.color(), palette::BLACK);

        for (i, color) in PALETTE.iter().enumerate() {
            let r = swatch_rect(screen, i);
            let _ = surface.draw_frame(r, *color, palette::CHROME_DARK);
            if *color == self.color() {
                let _ = surface.draw_rect(r.inflate(1), palette::BLACK);
            }
        }
    }

    /// Repaint the status bar
    pub fn draw_status(&self, surface: &mut dyn DrawSurface, now_ms: u32) {
        let r = status_rect(surface.bounds());
        let _ = surface.fill_rect(r, palette::CHROME_LIGHT);
        let _ = surface.draw_line(
            r.top_left(),
            Point::new(r.right() - 1, r.y),
            palette::WHITE,
        );
        let _ = surface.draw_text(
            self.status_text(now_ms),
            Point::new(r.x + 4, r.y + 2),
            Font::Small,
            palette::BLACK,
        );
    }

    /// Repaint every damaged part of the canvas
    ///
    /// Returns false if nothing was pending.
    pub fn flush(&mut self, surface: &mut dyn DrawSurface) -> bool {
        let rects = self.damage_mut().take();
        if rects.is_empty() {
            return false;
        }
        for cells in rects {
            self.render_cells(surface, cells);
        }
        true
    }

    /// Recomposite one rectangle of cells: canvas, floating selection,
    /// selection outline, then the rubber-band preview
    pub fn render_cells(&self, surface: &mut dyn DrawSurface, cells: Rect) {
        let grid = self.canvas().bounds();
        let Some(cells) = cells.intersection(&grid) else {
            return;
        };
        let clip = cells_to_screen(cells);
        surface.set_clip(Some(clip));

        for y in cells.y..cells.bottom() {
            let mut x = cells.x;
            while x < cells.right() {
                let n = (cells.right() - x).min(ROW_CHUNK as i32);
                let mut row: Vec<Rgb565, ROW_PIXELS> = Vec::new();
                for cx in x..x + n {
                    for _ in 0..PX {
                        let _ = row.push(self.pixel(cx, y));
                    }
                }
                let target = cells_to_screen(Rect::new(x, y, n, 1));
                for dy in 0..PX {
                    let _ = surface.blit_image(&row, Rect::new(target.x, target.y + dy, target.w, 1));
                }
                x += n;
            }
        }

        if let Some(sel) = self.selection() {
            let outline = cells_to_screen(sel.rect()).inflate(1);
            let _ = surface.draw_rect(outline, palette::BLACK);
        }

        if let Some(preview) = self.preview() {
            if preview.bounds().intersects(&cells) {
                preview.rasterize(&mut |x, y| {
                    if grid.contains(Point::new(x, y)) {
                        let _ = surface.fill_rect(
                            cells_to_screen(Rect::new(x, y, 1, 1)),
                            palette::BLACK,
                        );
                    }
                });
            }
        }

        surface.set_clip(None);
    }
}

fn draw_title(surface: &mut dyn DrawSurface, screen: Rect) {
    let _ = surface.fill_rect(Rect::new(0, 0, screen.w, TITLE_H), TITLE_BLUE);
    let _ = surface.draw_text("untitled - Paint", Point::new(6, 4), Font::Small, palette::WHITE);
    let close = close_button(screen);
    let _ = surface.fill_rect(close, palette::RED);
    let _ = surface.draw_text_centered("X", close, Font::Small, palette::WHITE);
}

fn draw_tool_icon(surface: &mut dyn DrawSurface, c: Point, tool: Tool) {
    let ink = palette::BLACK;
    let p = |dx: i32, dy: i32| c + Point::new(dx, dy);
    let _ = match tool {
        Tool::Select => surface.draw_line(p(-6, -6), p(4, 4), ink),
        Tool::RectSelect => surface.draw_rect(Rect::new(c.x - 7, c.y - 6, 14, 12), palette::CHROME_DARK),
        Tool::Erase => surface.draw_frame(Rect::new(c.x - 7, c.y - 4, 14, 8), palette::WHITE, ink),
        Tool::Fill => surface.draw_rect(Rect::new(c.x - 6, c.y - 2, 10, 7), ink),
        Tool::Pencil => surface.draw_line(p(-7, 6), p(7, -6), ink),
        Tool::Brush => surface.fill_rect(Rect::new(c.x - 2, c.y - 7, 4, 9), ink),
        Tool::Text => surface.draw_text_centered("A", Rect::new(c.x - 7, c.y - 7, 14, 14), Font::Medium, ink),
        Tool::Line => surface.draw_line(p(-7, 6), p(7, -6), ink),
        Tool::Rect => surface.draw_rect(Rect::new(c.x - 7, c.y - 6, 14, 12), ink),
        Tool::Ellipse => {
            let r = Rect::new(c.x - 6, c.y - 6, 13, 13);
            let mut res = Ok(());
            super::raster::ellipse_outline(r.top_left(), Point::new(r.right() - 1, r.bottom() - 1), 0, &mut |x, y| {
                if res.is_ok() {
                    res = surface.fill_rect(Rect::new(x, y, 1, 1), ink);
                }
            });
            res
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaintConfig;
    use touchdesk_display::{EgSurface, Framebuffer};

    const SCREEN: Rect = Rect::new(0, 0, 320, 240);

    fn surface() -> EgSurface<Framebuffer> {
        EgSurface::new(Framebuffer::new(320, 240, palette::BLACK))
    }

    fn machine() -> PaintToolStateMachine {
        PaintToolStateMachine::new(&PaintConfig::default(), GRID_W, GRID_H).unwrap()
    }

    #[test]
    fn test_grid_matches_canvas_area() {
        assert_eq!((GRID_W, GRID_H), (126, 75));
        assert_eq!(cell_at(Point::new(CANVAS_X, CANVAS_Y)), Some(Point::new(0, 0)));
        assert_eq!(cell_at(Point::new(CANVAS_X + 5, CANVAS_Y + 3)), Some(Point::new(2, 1)));
        assert_eq!(cell_at(Point::new(CANVAS_X - 1, CANVAS_Y)), None);
        assert_eq!(cell_clamped(Point::new(319, 0)), Point::new(GRID_W - 1, 0));
    }

    #[test]
    fn test_tool_hits() {
        assert_eq!(tool_at(Point::new(6, 36)), Some(Tool::Select));
        assert_eq!(tool_at(Point::new(31, 36)), Some(Tool::RectSelect));
        assert_eq!(tool_at(Point::new(31, 36 + 3 * 25)), Some(Tool::Line));
        assert_eq!(tool_at(Point::new(6, 36 + 4 * 25)), Some(Tool::Rect));
        assert_eq!(tool_at(Point::new(31 + 21, 36 + 4 * 25 + 21)), Some(Tool::Ellipse));
        // Gap between columns
        assert_eq!(tool_at(Point::new(29, 40)), None);
    }

    #[test]
    fn test_swatch_hits() {
        // Palette starts at 240 - 12 - 36 + 4
        assert_eq!(swatch_at(SCREEN, Point::new(40, 196)), Some(0));
        assert_eq!(swatch_at(SCREEN, Point::new(40 + 16 * 7, 196 + 16)), Some(15));
        assert_eq!(swatch_at(SCREEN, Point::new(54, 196)), None);
        assert!(close_hit(SCREEN, Point::new(310, 5)));
        assert!(!close_hit(SCREEN, Point::new(300, 5)));
    }

    #[test]
    fn test_flush_paints_only_damage() {
        let mut m = machine();
        let mut s = surface();
        m.draw(&mut s, 0);

        m.set_color(palette::RED);
        m.press(Point::new(10, 10), 0);
        m.release(10);
        // Scribble outside the canvas area the flush must not touch
        let _ = s.fill_rect(Rect::new(0, 0, 4, 4), palette::GREEN);
        assert!(m.flush(&mut s));
        assert!(!m.flush(&mut s));

        let fb = s.target();
        let px = cells_to_screen(Rect::new(10, 10, 1, 1));
        assert_eq!(fb.pixel(px.x, px.y), Some(palette::RED));
        assert_eq!(fb.pixel(px.x + 1, px.y + 1), Some(palette::RED));
        assert_eq!(fb.pixel(px.x + 2, px.y), Some(palette::WHITE));
        assert_eq!(fb.pixel(0, 0), Some(palette::GREEN));
    }

    #[test]
    fn test_preview_erased_by_redraw() {
        let mut m = machine();
        let mut s = surface();
        m.draw(&mut s, 0);
        m.set_tool(crate::paint::Tool::Line);
        m.press(Point::new(0, 0), 0);
        m.held(Point::new(20, 0), 10);
        m.flush(&mut s);
        let end = cells_to_screen(Rect::new(20, 0, 1, 1));
        assert_eq!(s.target().pixel(end.x, end.y), Some(palette::BLACK));

        // Shorter preview: the old tail goes back to the canvas colour
        m.held(Point::new(5, 0), 20);
        m.flush(&mut s);
        assert_eq!(s.target().pixel(end.x, end.y), Some(palette::WHITE));
        assert_eq!(m.canvas().count(palette::BLACK), 0);
    }

    #[test]
    fn test_full_draw_matches_region_redraw() {
        let mut m = machine();
        m.set_tool(Tool::Brush);
        m.press(Point::new(3, 3), 0);
        m.held(Point::new(40, 30), 10);
        m.release(20);
        m.set_tool(Tool::Select);
        m.press(Point::new(0, 0), 30);
        m.held(Point::new(20, 20), 40);
        m.release(50);

        let mut a = surface();
        m.draw(&mut a, 100);
        let mut b = surface();
        m.draw(&mut b, 100);
        m.render_cells(&mut b, m.canvas().bounds());
        assert_eq!(a.target().first_difference(b.target()), None);
    }
}
