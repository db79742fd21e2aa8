//! Draw surface trait
//!
//! Defines the pixel capability every shell component renders through.

use crate::color::Rgb565;
use crate::font::Font;
use crate::geometry::{Point, Rect};

/// Draw surface errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Pixel buffer does not match the requested area
    BufferOverflow,
}

/// Draw surface trait
///
/// A stateless pixel capability over a fixed-size grid. Coordinates outside
/// the surface (or outside the active clip) are silently discarded.
/// Text is positioned by its top-left corner.
pub trait DrawSurface {
    /// Full surface area
    fn bounds(&self) -> Rect;

    /// Restrict subsequent drawing to `clip` (intersected with the bounds)
    fn set_clip(&mut self, clip: Option<Rect>);

    /// Fill a rectangle
    fn fill_rect(&mut self, rect: Rect, color: Rgb565) -> Result<(), DisplayError>;

    /// Draw a one-pixel rectangle outline inside `rect`
    fn draw_rect(&mut self, rect: Rect, color: Rgb565) -> Result<(), DisplayError>;

    /// Draw a one-pixel line between two points, both inclusive
    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565) -> Result<(), DisplayError>;

    /// Draw text with its top-left corner at `pos`
    fn draw_text(
        &mut self,
        text: &str,
        pos: Point,
        font: Font,
        color: Rgb565,
    ) -> Result<(), DisplayError>;

    /// Copy a row-major block of pixels into `rect`
    ///
    /// `pixels.len()` must equal `rect.w * rect.h`.
    fn blit_image(&mut self, pixels: &[Rgb565], rect: Rect) -> Result<(), DisplayError>;

    /// Width `text` would occupy when drawn in `font`
    fn measure_text_width(&self, text: &str, font: Font) -> i32 {
        font.measure(text)
    }
}

/// Helper trait for drawing common UI elements
pub trait DrawSurfaceExt: DrawSurface {
    /// Filled rectangle with a one-pixel border
    fn draw_frame(&mut self, rect: Rect, fill: Rgb565, border: Rgb565) -> Result<(), DisplayError> {
        self.fill_rect(rect, fill)?;
        self.draw_rect(rect, border)
    }

    /// Raised push button with a centred label
    fn draw_button(
        &mut self,
        rect: Rect,
        label: &str,
        pressed: bool,
        fill: Rgb565,
        text: Rgb565,
    ) -> Result<(), DisplayError> {
        use crate::color::palette;

        self.fill_rect(rect, fill)?;
        let (light, dark) = if pressed {
            (palette::CHROME_DARK, palette::WHITE)
        } else {
            (palette::WHITE, palette::CHROME_DARK)
        };
        let x1 = rect.right() - 1;
        let y1 = rect.bottom() - 1;
        self.draw_line(Point::new(rect.x, rect.y), Point::new(x1, rect.y), light)?;
        self.draw_line(Point::new(rect.x, rect.y), Point::new(rect.x, y1), light)?;
        self.draw_line(Point::new(rect.x, y1), Point::new(x1, y1), dark)?;
        self.draw_line(Point::new(x1, rect.y), Point::new(x1, y1), dark)?;
        self.draw_text_centered(label, rect, Font::Small, text)
    }

    /// Text centred in `rect`
    fn draw_text_centered(
        &mut self,
        text: &str,
        rect: Rect,
        font: Font,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let w = self.measure_text_width(text, font);
        let x = rect.x + (rect.w - w) / 2;
        let y = rect.y + (rect.h - font.line_height()) / 2;
        self.draw_text(text, Point::new(x, y), font, color)
    }

    /// Fill the whole surface
    fn clear(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        let bounds = self.bounds();
        self.fill_rect(bounds, color)
    }
}

impl<T: DrawSurface + ?Sized> DrawSurfaceExt for T {}
