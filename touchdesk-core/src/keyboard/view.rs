//! Keyboard rendering

use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Rgb565};

use super::layout::{KeyKind, KeyRect};
use super::machine::{KeyDamage, OnScreenKeyboard};

const KEY_FILL: Rgb565 = palette::CHROME_LIGHT;
const KEY_FILL_PRESSED: Rgb565 = palette::CHROME_DARK;

impl OnScreenKeyboard {
    /// Paint the whole keyboard
    pub fn draw(&mut self, surface: &mut dyn DrawSurface) {
        self.damage = KeyDamage::default();
        if !self.is_visible() {
            return;
        }
        let _ = surface.fill_rect(self.region(), palette::WHITE);
        let layout = self.layout();
        for (i, key) in layout.iter().enumerate() {
            self.draw_key(surface, key, Some(i) == self.active_key());
        }
    }

    /// Paint only what changed since the last draw
    ///
    /// Returns false if nothing was pending.
    pub fn render_damage(&mut self, surface: &mut dyn DrawSurface) -> bool {
        if self.damage.is_empty() {
            return false;
        }
        if self.damage.full {
            self.draw(surface);
            return true;
        }
        let cells = core::mem::take(&mut self.damage.cells);
        if self.is_visible() {
            let layout = self.layout();
            for i in cells {
                if let Some(key) = layout.get(i) {
                    self.draw_key(surface, key, Some(i) == self.active_key());
                }
            }
        }
        true
    }

    fn draw_key(&self, surface: &mut dyn DrawSurface, key: &KeyRect, pressed: bool) {
        let (fill, border) = if pressed {
            (KEY_FILL_PRESSED, palette::BLACK)
        } else {
            (KEY_FILL, palette::CHROME_DARK)
        };
        let _ = surface.draw_frame(key.rect, fill, border);

        let mut buf = [0u8; 4];
        let label = match key.kind {
            KeyKind::Char(c) => {
                let c = if !self.is_mode123() && c.is_ascii_alphabetic() && !self.is_caps() {
                    c.to_ascii_lowercase()
                } else {
                    c
                };
                &*c.encode_utf8(&mut buf)
            }
            KeyKind::Space => "SPACE",
            KeyKind::Delete => "DEL",
            KeyKind::Clear => "CLR",
            KeyKind::Mode if self.is_mode123() => "ABC",
            KeyKind::Mode => "123",
            KeyKind::Caps if self.is_caps() => "CAPS*",
            KeyKind::Caps => "CAPS",
        };
        let _ = surface.draw_text_centered(label, key.rect, Font::Medium, palette::BLACK);
    }
}
