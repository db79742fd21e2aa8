//! embedded-graphics backend
//!
//! Adapts any RGB565 `DrawTarget` (an SPI panel driver, a simulator window,
//! or the in-memory [`Framebuffer`](crate::Framebuffer)) to [`DrawSurface`].

use embedded_graphics::draw_target::{DrawTarget, DrawTargetExt};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::primitives::{
    Line, Primitive, PrimitiveStyle, PrimitiveStyleBuilder, StrokeAlignment,
};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;

use crate::color::Rgb565;
use crate::font::Font;
use crate::geometry::{Point, Rect};
use crate::surface::{DisplayError, DrawSurface};

/// [`DrawSurface`] over an embedded-graphics draw target
pub struct EgSurface<D> {
    target: D,
    clip: Option<Rect>,
}

impl<D> EgSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: D) -> Self {
        Self { target, clip: None }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    /// Area drawing is currently allowed to touch
    fn drawable_area(&self) -> Rect {
        let bounds = self.bounds();
        match self.clip {
            Some(clip) => clip.intersection(&bounds).unwrap_or(Rect::EMPTY),
            None => bounds,
        }
    }
}

impl<D> DrawSurface for EgSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn bounds(&self) -> Rect {
        Rect::from(self.target.bounding_box())
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb565) -> Result<(), DisplayError> {
        if rect.is_empty() {
            return Ok(());
        }
        let area = self.drawable_area().to_rectangle();
        self.target
            .clipped(&area)
            .fill_solid(&rect.to_rectangle(), color)
            .map_err(|_| DisplayError::Communication)
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgb565) -> Result<(), DisplayError> {
        if rect.is_empty() {
            return Ok(());
        }
        let area = self.drawable_area().to_rectangle();
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(color)
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        rect.to_rectangle()
            .into_styled(style)
            .draw(&mut self.target.clipped(&area))
            .map_err(|_| DisplayError::Communication)
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565) -> Result<(), DisplayError> {
        let area = self.drawable_area().to_rectangle();
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(&mut self.target.clipped(&area))
            .map_err(|_| DisplayError::Communication)
    }

    fn draw_text(
        &mut self,
        text: &str,
        pos: Point,
        font: Font,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let area = self.drawable_area().to_rectangle();
        let style = MonoTextStyle::new(font.mono(), color);
        Text::with_baseline(text, pos, style, Baseline::Top)
            .draw(&mut self.target.clipped(&area))
            .map(|_| ())
            .map_err(|_| DisplayError::Communication)
    }

    fn blit_image(&mut self, pixels: &[Rgb565], rect: Rect) -> Result<(), DisplayError> {
        if rect.is_empty() {
            return Ok(());
        }
        if pixels.len() != rect.area() as usize {
            return Err(DisplayError::BufferOverflow);
        }
        let area = self.drawable_area().to_rectangle();
        self.target
            .clipped(&area)
            .fill_contiguous(&rect.to_rectangle(), pixels.iter().copied())
            .map_err(|_| DisplayError::Communication)
    }
}
