//! Settings window
//!
//! Edits a draft copy of the settings; SAVE persists the draft and makes
//! it current, BACK throws it away.

use core::fmt::Write;

use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};

use super::{App, Env, OpenError};
use crate::settings::{step_brightness, step_wrapping, Settings};
use crate::ui;

const HEADER_FILL: Rgb565 = Rgb565::new(12, 24, 12);
const LABEL_X: i32 = 12;
const MINUS_X: i32 = 190;
const PLUS_X: i32 = 284;
const STEP_W: i32 = 28;
const ROW_H: i32 = 18;
const BRIGHTNESS_Y: i32 = 38;
const AUTOCONNECT_Y: i32 = 78;
const HOUR_Y: i32 = 118;
const MINUTE_Y: i32 = 148;

/// Touchable controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Back,
    Brightness(bool),
    Autoconnect,
    Hour(bool),
    Minute(bool),
    Save,
}

fn minus(y: i32) -> Rect {
    Rect::new(MINUS_X, y, STEP_W, ROW_H)
}

fn plus(y: i32) -> Rect {
    Rect::new(PLUS_X, y, STEP_W, ROW_H)
}

/// Value cell between the − and + buttons
fn value_rect(y: i32) -> Rect {
    Rect::new(MINUS_X + STEP_W, y, PLUS_X - MINUS_X - STEP_W, ROW_H)
}

pub fn autoconnect_toggle() -> Rect {
    Rect::new(230, AUTOCONNECT_Y, 70, ROW_H)
}

pub fn save_button() -> Rect {
    Rect::new(110, 190, 100, 22)
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    full: bool,
    values: bool,
}

pub struct SettingsApp {
    screen: Rect,
    draft: Settings,
    dirty: Dirty,
}

impl SettingsApp {
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            draft: Settings::default(),
            dirty: Dirty::default(),
        }
    }

    /// Settings as edited so far
    pub fn draft(&self) -> &Settings {
        &self.draft
    }

    fn control_at(&self, p: Point) -> Option<Control> {
        let controls = [
            (ui::back_button(self.screen), Control::Back),
            (minus(BRIGHTNESS_Y), Control::Brightness(false)),
            (plus(BRIGHTNESS_Y), Control::Brightness(true)),
            (autoconnect_toggle(), Control::Autoconnect),
            (minus(HOUR_Y), Control::Hour(false)),
            (plus(HOUR_Y), Control::Hour(true)),
            (minus(MINUTE_Y), Control::Minute(false)),
            (plus(MINUTE_Y), Control::Minute(true)),
            (save_button(), Control::Save),
        ];
        controls
            .iter()
            .find(|(rect, _)| rect.contains(p))
            .map(|&(_, c)| c)
    }

    fn draw_values(&self, surface: &mut dyn DrawSurface) {
        let mut text = heapless::String::<8>::new();
        let _ = write!(text, "{}", self.draft.brightness);
        self.draw_value(surface, BRIGHTNESS_Y, &text);

        let on = self.draft.autoconnect;
        ui::toggle(surface, autoconnect_toggle(), if on { "ON" } else { "OFF" }, on);

        text.clear();
        let _ = write!(text, "{:02}", self.draft.time.0);
        self.draw_value(surface, HOUR_Y, &text);

        text.clear();
        let _ = write!(text, "{:02}", self.draft.time.1);
        self.draw_value(surface, MINUTE_Y, &text);
    }

    fn draw_value(&self, surface: &mut dyn DrawSurface, y: i32, text: &str) {
        let cell = value_rect(y);
        let _ = surface.draw_frame(cell, palette::WHITE, palette::CHROME_DARK);
        let _ = surface.draw_text_centered(text, cell, Font::Medium, palette::BLACK);
    }

    fn draw_all(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.dirty = Dirty::default();
        let _ = surface.fill_rect(self.screen, palette::CHROME);
        ui::draw_header(surface, self.screen, "Settings", HEADER_FILL, env.status);

        let rows = [
            ("Brightness", BRIGHTNESS_Y, true),
            ("Auto-connect WiFi", AUTOCONNECT_Y, false),
            ("Hour", HOUR_Y, true),
            ("Minute", MINUTE_Y, true),
        ];
        for (label, y, stepped) in rows {
            let at = Point::new(LABEL_X, y + (ROW_H - Font::Medium.line_height()) / 2);
            let _ = surface.draw_text(label, at, Font::Medium, palette::BLACK);
            if stepped {
                ui::button(surface, minus(y), "-");
                ui::button(surface, plus(y), "+");
            }
        }
        ui::button(surface, save_button(), "SAVE");
        self.draw_values(surface);
    }
}

impl App for SettingsApp {
    fn open(&mut self, env: &mut Env<'_>) -> Result<(), OpenError> {
        self.draft = *env.settings;
        self.draft.time = env.settings.now(env.now_ms);
        self.dirty.full = true;
        Ok(())
    }

    fn handle(&mut self, event: TouchEvent, env: &mut Env<'_>) -> Response {
        if event.phase != TouchPhase::Press {
            return Response::NoOp;
        }
        let Some(control) = self.control_at(event.pos) else {
            return Response::NoOp;
        };

        let draft = &mut self.draft;
        match control {
            Control::Back => return Response::CloseSelf,
            Control::Save => {
                draft.save(env.store, env.now_ms);
                *env.settings = *draft;
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "Settings saved: brightness {} autoconnect {} time {:02}:{:02}",
                    draft.brightness,
                    draft.autoconnect,
                    draft.time.0,
                    draft.time.1
                );
                return Response::CloseSelf;
            }
            Control::Brightness(up) => draft.brightness = step_brightness(draft.brightness, up),
            Control::Autoconnect => draft.autoconnect = !draft.autoconnect,
            Control::Hour(up) => draft.time.0 = step_wrapping(draft.time.0, up, 24),
            Control::Minute(up) => draft.time.1 = step_wrapping(draft.time.1, up, 60),
        }
        self.dirty.values = true;
        Response::Changed
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.draw_all(surface, env);
    }

    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool {
        if self.dirty.full {
            self.draw_all(surface, env);
            return true;
        }
        if core::mem::take(&mut self.dirty.values) {
            self.draw_values(surface);
            return true;
        }
        false
    }
}
