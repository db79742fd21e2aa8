//! In-memory RGB565 framebuffer
//!
//! A plain `DrawTarget` holding every pixel. The host build renders into it
//! and the tests compare its contents to check redraw behaviour.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::prelude::{OriginDimensions, Size};
use embedded_graphics::Pixel;

use crate::color::Rgb565;

/// Heap-backed framebuffer
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl Framebuffer {
    /// Create a framebuffer filled with `background`
    pub fn new(width: u32, height: u32, background: Rgb565) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// Number of pixels equal to `color`
    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    /// Index of the first pixel that differs from `other`, as (x, y)
    pub fn first_difference(&self, other: &Framebuffer) -> Option<(u32, u32)> {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .position(|(a, b)| a != b)
            .map(|i| (i as u32 % self.width, i as u32 / self.width))
    }
}

impl core::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            let (x, y) = (p.x as u32, p.y as u32);
            if x >= self.width || y >= self.height {
                continue;
            }
            self.pixels[(y * self.width + x) as usize] = color;
        }
        Ok(())
    }
}
