//! Notes
//!
//! One text buffer, edited with the keyboard and kept in the store under
//! `notes`/`text`. It is loaded on open and saved on SAVE and on close.

use core::fmt::Write;

use touchdesk_core::config::{ShellConfig, KB_TEXT_MAX};
use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_core::keyboard::{KeyAction, OnScreenKeyboard};
use touchdesk_core::text::{line_count, wrap_lines};
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};
use touchdesk_hal::KeyValueStoreExt;

use super::{App, DragScroll, Env, OpenError};
use crate::ui;

pub const NAMESPACE: &str = "notes";
pub const KEY: &str = "text";

const FONT: Font = Font::Small;
const LINE_H: i32 = 12;
const PAD: i32 = 4;
const TOOLBAR_Y: i32 = ui::HEADER_H + 2;
const TOOLBAR_H: i32 = 18;
const HEADER_FILL: Rgb565 = Rgb565::new(24, 44, 0);

fn measure(s: &str) -> i32 {
    FONT.measure(s)
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    full: bool,
    text: bool,
    toolbar: bool,
}

pub struct NotesApp {
    screen: Rect,
    keyboard: OnScreenKeyboard,
    scroll: usize,
    drag: DragScroll,
    /// Buffer matches what is stored
    saved: bool,
    dirty: Dirty,
}

impl NotesApp {
    pub fn new(config: &ShellConfig, screen: Rect) -> Self {
        Self {
            screen,
            keyboard: OnScreenKeyboard::new(config.keyboard, screen),
            scroll: 0,
            drag: DragScroll::default(),
            saved: true,
            dirty: Dirty::default(),
        }
    }

    pub fn text(&self) -> &str {
        self.keyboard.text()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn save_button(&self) -> Rect {
        Rect::new(4, TOOLBAR_Y, 56, TOOLBAR_H)
    }

    pub fn text_rect(&self) -> Rect {
        let top = TOOLBAR_Y + TOOLBAR_H + 4;
        Rect::new(4, top, self.screen.w - 8, self.keyboard.region().y - top - 4)
    }

    fn wrap_width(&self) -> i32 {
        self.text_rect().w - 2 * PAD
    }

    fn visible_lines(&self) -> usize {
        ((self.text_rect().h - PAD) / LINE_H).max(1) as usize
    }

    fn max_scroll(&self) -> usize {
        line_count(self.text(), self.wrap_width(), measure).saturating_sub(self.visible_lines())
    }

    /// One-based line and column of the end of the text, in wrapped lines
    pub fn position(&self) -> (usize, usize) {
        let mut lines = 0;
        let mut last = "";
        for line in wrap_lines(self.text(), self.wrap_width(), measure) {
            lines += 1;
            last = line;
        }
        (lines.max(1), last.chars().count() + 1)
    }

    fn save(&mut self, env: &mut Env<'_>) {
        if env.store.set_str(NAMESPACE, KEY, self.keyboard.text()) {
            self.saved = true;
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("notes: save failed");
        }
        self.dirty.toolbar = true;
    }

    fn draw_toolbar(&self, surface: &mut dyn DrawSurface) {
        let bar = Rect::new(0, TOOLBAR_Y, self.screen.w, TOOLBAR_H);
        let _ = surface.fill_rect(bar, palette::CHROME_LIGHT);
        ui::button(surface, self.save_button(), "SAVE");

        let (line, col) = self.position();
        let mut label = heapless::String::<32>::new();
        let _ = write!(label, "Ln {}, Col {}", line, col);
        if !self.saved {
            let _ = label.push_str(" *");
        }
        let w = FONT.measure(&label);
        let at = Point::new(bar.right() - w - 6, bar.y + (TOOLBAR_H - FONT.line_height()) / 2);
        let _ = surface.draw_text(&label, at, FONT, palette::BLACK);
    }

    fn draw_text(&self, surface: &mut dyn DrawSurface) {
        let area = self.text_rect();
        let _ = surface.draw_frame(area, palette::WHITE, palette::CHROME_DARK);

        let mut y = area.y + PAD;
        for line in wrap_lines(self.text(), self.wrap_width(), measure)
            .skip(self.scroll)
            .take(self.visible_lines())
        {
            let _ = surface.draw_text(line, Point::new(area.x + PAD, y), FONT, palette::BLACK);
            y += LINE_H;
        }
    }

    fn draw_all(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.dirty = Dirty::default();
        let _ = surface.fill_rect(self.screen, palette::CHROME);
        ui::draw_header(surface, self.screen, "Notes", HEADER_FILL, env.status);
        self.draw_toolbar(surface);
        self.draw_text(surface);
        self.keyboard.draw(surface);
    }
}

impl App for NotesApp {
    fn open(&mut self, env: &mut Env<'_>) -> Result<(), OpenError> {
        let stored = env.store.get_str::<KB_TEXT_MAX>(NAMESPACE, KEY);
        self.keyboard.set_text(&stored);
        self.keyboard.set_visible(true);
        self.saved = true;
        self.scroll = self.max_scroll();
        self.drag.release();
        self.dirty.full = true;
        Ok(())
    }

    fn close(&mut self, env: &mut Env<'_>) {
        self.keyboard.release();
        self.drag.release();
        if !self.saved {
            self.save(env);
        }
    }

    fn handle(&mut self, event: TouchEvent, env: &mut Env<'_>) -> Response {
        let p = event.pos;
        match event.phase {
            TouchPhase::Press => {
                if ui::back_button(self.screen).contains(p) {
                    return Response::CloseSelf;
                }
                if self.save_button().contains(p) {
                    self.save(env);
                    return Response::Changed;
                }
                if self.text_rect().contains(p) {
                    self.drag.press(p.y);
                }
                Response::NoOp
            }
            TouchPhase::Held => {
                let scroll = self.drag.held(p.y, LINE_H, self.scroll, self.max_scroll());
                if scroll == self.scroll {
                    return Response::NoOp;
                }
                self.scroll = scroll;
                self.dirty.text = true;
                Response::Changed
            }
            TouchPhase::Release => {
                self.drag.release();
                Response::NoOp
            }
        }
    }

    fn key_changed(&mut self, action: KeyAction, _env: &mut Env<'_>) {
        if action != KeyAction::Changed {
            return;
        }
        self.saved = false;
        // Keep the end of the text, where typing happens, in view
        self.scroll = self.max_scroll();
        self.dirty.text = true;
        self.dirty.toolbar = true;
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.draw_all(surface, env);
    }

    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool {
        if self.dirty.full {
            self.draw_all(surface, env);
            return true;
        }
        let dirty = core::mem::take(&mut self.dirty);
        if dirty.toolbar {
            self.draw_toolbar(surface);
        }
        if dirty.text {
            self.draw_text(surface);
        }
        let keys = self.keyboard.render_damage(surface);
        dirty.toolbar || dirty.text || keys
    }

    fn keyboard(&self) -> Option<&OnScreenKeyboard> {
        Some(&self.keyboard)
    }

    fn keyboard_mut(&mut self) -> Option<&mut OnScreenKeyboard> {
        Some(&mut self.keyboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::Fixture;
    use touchdesk_hal::KeyValueStoreExt;

    fn app() -> NotesApp {
        NotesApp::new(&ShellConfig::default(), Rect::new(0, 0, 320, 240))
    }

    fn type_text(app: &mut NotesApp, fx: &mut Fixture, text: &str) {
        app.keyboard.set_text(text);
        app.key_changed(KeyAction::Changed, &mut fx.env(0));
    }

    #[test]
    fn test_layout() {
        let a = app();
        assert_eq!(a.text_rect(), Rect::new(4, 52, 312, 84));
        assert_eq!(a.wrap_width(), 304);
        assert_eq!(a.visible_lines(), 6);
    }

    #[test]
    fn test_open_loads_stored_text() {
        let mut fx = Fixture::new();
        fx.store.set_str(NAMESPACE, KEY, "shopping list");
        let mut a = app();
        a.open(&mut fx.env(0)).unwrap();
        assert_eq!(a.text(), "shopping list");
        assert!(a.is_saved());
    }

    #[test]
    fn test_close_saves_edits() {
        let mut fx = Fixture::new();
        let mut a = app();
        a.open(&mut fx.env(0)).unwrap();
        type_text(&mut a, &mut fx, "milk eggs");
        assert!(!a.is_saved());

        a.close(&mut fx.env(0));
        assert_eq!(fx.store.get_str::<64>(NAMESPACE, KEY).as_str(), "milk eggs");
    }

    #[test]
    fn test_save_button() {
        let mut fx = Fixture::new();
        let mut a = app();
        a.open(&mut fx.env(0)).unwrap();
        type_text(&mut a, &mut fx, "draft");
        let c = a.save_button().center();
        assert_eq!(a.handle(TouchEvent::press(c.x, c.y), &mut fx.env(0)), Response::Changed);
        assert!(a.is_saved());
        assert_eq!(fx.store.get_str::<64>(NAMESPACE, KEY).as_str(), "draft");
    }

    #[test]
    fn test_position_counts_wrapped_lines() {
        let mut fx = Fixture::new();
        let mut a = app();
        assert_eq!(a.position(), (1, 1));
        // 50 characters fit on one 304 px line of 6 px glyphs
        type_text(&mut a, &mut fx, &"x".repeat(53));
        assert_eq!(a.position(), (2, 4));
    }

    #[test]
    fn test_typing_scrolls_to_end_and_drag_scrolls_back() {
        let mut fx = Fixture::new();
        let mut a = app();
        a.open(&mut fx.env(0)).unwrap();
        type_text(&mut a, &mut fx, "short");
        assert_eq!(a.scroll, 0);

        // Twelve one-letter paragraphs and the empty line after the last
        type_text(&mut a, &mut fx, &"a\n".repeat(12));
        assert_eq!(line_count(a.text(), a.wrap_width(), measure), 13);
        assert_eq!(a.scroll, 7);

        let mut env = fx.env(0);
        a.handle(TouchEvent::press(100, 60), &mut env);
        a.handle(TouchEvent::held(100, 60 + LINE_H * 3), &mut env);
        assert_eq!(a.scroll, 4);
        a.handle(TouchEvent::held(100, 60 + LINE_H * 20), &mut env);
        assert_eq!(a.scroll, 0);
    }
}
