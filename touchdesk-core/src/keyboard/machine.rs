//! On-screen keyboard state machine
//!
//! Fed one sample per tick. Keys commit on press-start; Delete repeats
//! while held and a long hold on Caps clears the text once. A release is
//! honoured only after the panel has reported no contact for the debounce
//! window, so a single-tick dropout in the middle of a press does not
//! fire the key again.

use heapless::{String, Vec};
use touchdesk_display::{Point, Rect};

use crate::config::{KeyboardConfig, KB_TEXT_MAX};

use super::layout::{build_layout, find_kind, hit_test, keyboard_region, KeyKind, Layout, KB_Y};

/// Result of feeding the keyboard a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    None,
    /// The text changed
    Changed,
    /// Mode or caps flipped; the whole keyboard is damaged
    Redraw,
}

/// Keyboard area that needs repainting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KeyDamage {
    /// Whole keyboard
    pub full: bool,
    /// Individual key cells, by layout index
    pub cells: Vec<usize, 4>,
}

impl KeyDamage {
    fn cell(&mut self, idx: usize) {
        if self.full || self.cells.contains(&idx) {
            return;
        }
        if self.cells.push(idx).is_err() {
            self.full = true;
            self.cells.clear();
        }
    }

    fn all(&mut self) {
        self.full = true;
        self.cells.clear();
    }

    pub fn is_empty(&self) -> bool {
        !self.full && self.cells.is_empty()
    }
}

/// Delete autorepeat timing
#[derive(Debug, Clone, Copy)]
struct DeleteHold {
    start_ms: u32,
    last_ms: u32,
}

/// Caps long-hold tracking
#[derive(Debug, Clone, Copy)]
struct CapsHold {
    down_ms: u32,
    cleared: bool,
}

/// Virtual keyboard with its own text buffer
#[derive(Debug, Clone)]
pub struct OnScreenKeyboard {
    config: KeyboardConfig,
    screen: Rect,
    top: i32,
    text: String<KB_TEXT_MAX>,
    visible: bool,
    mode123: bool,
    caps: bool,

    /// A press is in progress (after debounce)
    stable_pressed: bool,
    last_touch_ms: u32,
    /// The current press already committed a key
    key_down: bool,
    active: Option<usize>,
    delete_hold: Option<DeleteHold>,
    caps_hold: Option<CapsHold>,

    pub(crate) damage: KeyDamage,
}

impl OnScreenKeyboard {
    /// Keyboard docked at the default position of `screen`
    pub fn new(config: KeyboardConfig, screen: Rect) -> Self {
        Self::with_top(config, screen, KB_Y)
    }

    /// Keyboard whose top edge is at `top`
    pub fn with_top(config: KeyboardConfig, screen: Rect, top: i32) -> Self {
        Self {
            config,
            screen,
            top,
            text: String::new(),
            visible: true,
            mode123: false,
            caps: false,
            stable_pressed: false,
            last_touch_ms: 0,
            key_down: false,
            active: None,
            delete_hold: None,
            caps_hold: None,
            damage: KeyDamage {
                full: true,
                cells: Vec::new(),
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, truncated to the configured maximum
    pub fn set_text(&mut self, s: &str) {
        self.text.clear();
        for c in s.chars() {
            if !self.push_char(c) {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide; hiding drops any press in progress
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        self.release();
        self.damage.all();
    }

    pub fn is_mode123(&self) -> bool {
        self.mode123
    }

    pub fn is_caps(&self) -> bool {
        self.caps
    }

    /// Index of the key currently shown pressed
    pub fn active_key(&self) -> Option<usize> {
        self.active
    }

    /// Current layout (rebuilt on every call)
    pub fn layout(&self) -> Layout {
        build_layout(self.mode123, self.screen, self.top)
    }

    /// Screen area the keyboard covers
    pub fn region(&self) -> Rect {
        keyboard_region(self.screen, self.top)
    }

    /// True if the keyboard is visible and `p` is inside its region
    pub fn claims(&self, p: Point) -> bool {
        self.visible && self.region().contains(p)
    }

    /// Feed one sample
    pub fn update(&mut self, pressed: bool, p: Point, now_ms: u32) -> KeyAction {
        if !self.visible {
            return KeyAction::None;
        }

        if !pressed {
            if self.stable_pressed
                && now_ms.wrapping_sub(self.last_touch_ms) > self.config.release_debounce_ms
            {
                self.release();
            }
            return KeyAction::None;
        }

        self.last_touch_ms = now_ms;
        if !self.stable_pressed {
            self.stable_pressed = true;
            self.key_down = false;
        }

        let layout = self.layout();
        let idx = hit_test(&layout, p, self.config.hit_pad_px);
        if idx != self.active {
            if let Some(old) = self.active {
                self.damage.cell(old);
            }
            if let Some(new) = idx {
                self.damage.cell(new);
            }
            self.active = idx;
        }

        if let Some(i) = self.active {
            if !self.key_down {
                self.key_down = true;
                let kind = layout[i].kind;
                return self.commit(kind, p, now_ms);
            }
        }

        self.hold(&layout, p, now_ms)
    }

    /// Drop any press in progress without firing anything
    pub fn release(&mut self) {
        self.stable_pressed = false;
        self.key_down = false;
        self.delete_hold = None;
        self.caps_hold = None;
        if let Some(old) = self.active.take() {
            self.damage.cell(old);
        }
    }

    fn commit(&mut self, kind: KeyKind, p: Point, now_ms: u32) -> KeyAction {
        match kind {
            KeyKind::Char(c) => {
                let c = if !self.mode123 && c.is_ascii_alphabetic() {
                    if self.caps {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    }
                } else {
                    c
                };
                self.push_char(c);
                KeyAction::Changed
            }
            KeyKind::Space => {
                self.push_char(' ');
                KeyAction::Changed
            }
            KeyKind::Delete => {
                self.text.pop();
                self.delete_hold = Some(DeleteHold {
                    start_ms: now_ms,
                    last_ms: now_ms,
                });
                KeyAction::Changed
            }
            KeyKind::Clear => {
                self.text.clear();
                KeyAction::Changed
            }
            KeyKind::Mode => {
                self.mode123 = !self.mode123;
                // Hitboxes moved; re-resolve the key under the finger
                self.active = hit_test(&self.layout(), p, self.config.hit_pad_px);
                self.damage.all();
                KeyAction::Redraw
            }
            KeyKind::Caps => {
                self.caps = !self.caps;
                self.caps_hold = Some(CapsHold {
                    down_ms: now_ms,
                    cleared: false,
                });
                self.damage.all();
                KeyAction::Redraw
            }
        }
    }

    fn hold(&mut self, layout: &Layout, p: Point, now_ms: u32) -> KeyAction {
        let pad = self.config.hit_pad_px;
        let on_key = |kind: KeyKind| {
            find_kind(layout, kind).is_some_and(|i| layout[i].rect.contains_padded(p, pad))
        };

        if !self.mode123 {
            if let Some(hold) = self.caps_hold.as_mut() {
                if !hold.cleared
                    && on_key(KeyKind::Caps)
                    && now_ms.wrapping_sub(hold.down_ms) >= self.config.caps_clear_hold_ms
                {
                    hold.cleared = true;
                    self.text.clear();
                    return KeyAction::Changed;
                }
            }
        }

        if let Some(hold) = self.delete_hold.as_mut() {
            if !on_key(KeyKind::Delete) {
                return KeyAction::None;
            }
            if now_ms.wrapping_sub(hold.start_ms) > self.config.repeat_delay_ms
                && now_ms.wrapping_sub(hold.last_ms) > self.config.repeat_interval_ms
            {
                hold.last_ms = now_ms;
                self.text.pop();
                return KeyAction::Changed;
            }
        }

        KeyAction::None
    }

    /// Append a character if there is room; returns false when full
    fn push_char(&mut self, c: char) -> bool {
        let max = (self.config.text_max as usize).min(KB_TEXT_MAX);
        if self.text.len() + c.len_utf8() > max {
            return false;
        }
        self.text.push(c).is_ok()
    }
}
