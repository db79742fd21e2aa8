//! Fonts and text metrics
//!
//! All layout math (word wrap, key labels, centring) goes through
//! [`Font::measure`], which reads the same monospace metrics the
//! renderer draws with, so headless tests see real glyph widths.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_7X13};
use embedded_graphics::mono_font::MonoFont;

/// Fonts available to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// 6×10, body text and labels
    #[default]
    Small,
    /// 7×13, titles and keyboard caps
    Medium,
    /// 10×20, large headings
    Large,
}

impl Font {
    /// Backing embedded-graphics font
    pub fn mono(self) -> &'static MonoFont<'static> {
        match self {
            Font::Small => &FONT_6X10,
            Font::Medium => &FONT_7X13,
            Font::Large => &FONT_10X20,
        }
    }

    /// Advance of one glyph in pixels, spacing included
    pub fn advance(self) -> i32 {
        let font = self.mono();
        (font.character_size.width + font.character_spacing) as i32
    }

    /// Line height in pixels
    pub fn line_height(self) -> i32 {
        self.mono().character_size.height as i32
    }

    /// Rendered width of `text` in pixels
    pub fn measure(self, text: &str) -> i32 {
        let n = text.chars().count() as i32;
        if n == 0 {
            return 0;
        }
        let font = self.mono();
        n * font.character_size.width as i32 + (n - 1) * font.character_spacing as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_matches_glyph_width() {
        assert_eq!(Font::Small.measure(""), 0);
        assert_eq!(Font::Small.measure("a"), 6);
        assert_eq!(Font::Small.measure("hello"), 30);
        assert_eq!(Font::Large.measure("ab"), 20);
    }

    #[test]
    fn test_line_heights() {
        assert_eq!(Font::Small.line_height(), 10);
        assert_eq!(Font::Medium.line_height(), 13);
        assert_eq!(Font::Large.line_height(), 20);
    }
}
