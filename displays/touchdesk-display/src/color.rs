//! Shell colour palette
//!
//! Colours are RGB565, the native format of the ILI9341 panel.

pub use embedded_graphics::pixelcolor::Rgb565;

/// Named colours used across the shell
pub mod palette {
    use super::Rgb565;

    pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
    pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
    pub const RED: Rgb565 = Rgb565::new(31, 0, 0);
    pub const GREEN: Rgb565 = Rgb565::new(0, 63, 0);
    pub const BLUE: Rgb565 = Rgb565::new(0, 0, 31);
    pub const YELLOW: Rgb565 = Rgb565::new(31, 63, 0);
    pub const CYAN: Rgb565 = Rgb565::new(0, 63, 31);
    pub const MAGENTA: Rgb565 = Rgb565::new(31, 0, 31);

    /// Classic desktop teal
    pub const DESKTOP: Rgb565 = Rgb565::new(0, 32, 16);
    /// Window chrome grey
    pub const CHROME: Rgb565 = Rgb565::new(24, 48, 24);
    pub const CHROME_DARK: Rgb565 = Rgb565::new(16, 32, 16);
    pub const CHROME_LIGHT: Rgb565 = Rgb565::new(28, 56, 28);
    /// Title bar / selection blue
    pub const NAVY: Rgb565 = Rgb565::new(0, 0, 16);
    pub const HIGHLIGHT: Rgb565 = Rgb565::new(0, 16, 26);
    pub const TRASH_HOVER: Rgb565 = Rgb565::new(31, 40, 0);
}
