//! AI chat
//!
//! A scrolling history of prompt/reply pairs above an input bar, with the
//! on-screen keyboard docked at the bottom. SEND blocks the loop for one
//! backend round trip.

use heapless::{Deque, String};
use touchdesk_core::config::ShellConfig;
use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_core::keyboard::{KeyAction, OnScreenKeyboard};
use touchdesk_core::text::{line_count, wrap_lines};
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect};

use super::{App, DragScroll, Env};
use crate::ui;

/// Pairs kept; the oldest is dropped first
pub const MAX_MESSAGES: usize = 8;

/// Longest stored message, prefix included
pub const MESSAGE_MAX: usize = 512;

pub const USER_PREFIX: &str = "You: ";
pub const AI_PREFIX: &str = "AI:  ";

const FONT: Font = Font::Medium;
const LINE_H: i32 = 14;
const AI_COLLAPSED_LINES: usize = 3;
const BLOCK_GAP_LINES: usize = 1;

const CHAT_TOP: i32 = 32;
const CHAT_X0: i32 = 8;
const CHAT_X1: i32 = 316;
const WRAP_W: i32 = CHAT_X1 - CHAT_X0;

const INPUT_H: i32 = 28;
const INPUT_W: i32 = 240;
const INPUT_TEXT_W: i32 = 210;
const SIDE_X: i32 = 250;
const SIDE_W: i32 = 66;
const TOGGLE_H: i32 = 20;
const AI_TOGGLE: i32 = 14;

fn measure(s: &str) -> i32 {
    FONT.measure(s)
}

/// One exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// `"You: "` and the prompt
    pub user: String<MESSAGE_MAX>,
    /// `"AI:  "` and the reply
    pub ai: String<MESSAGE_MAX>,
    /// Long replies show in full instead of the first lines
    pub expanded: bool,
}

impl Message {
    fn new(prompt: &str, reply: &str) -> Self {
        Self {
            user: prefixed(USER_PREFIX, prompt),
            ai: prefixed(AI_PREFIX, reply),
            expanded: false,
        }
    }

    fn user_lines(&self) -> usize {
        line_count(&self.user, WRAP_W, measure)
    }

    fn ai_lines(&self) -> usize {
        line_count(&self.ai, WRAP_W, measure)
    }

    fn collapsible(&self) -> bool {
        self.ai_lines() > AI_COLLAPSED_LINES
    }

    fn ai_shown(&self) -> usize {
        let full = self.ai_lines();
        if self.expanded {
            full
        } else {
            full.min(AI_COLLAPSED_LINES)
        }
    }
}

fn prefixed(prefix: &str, text: &str) -> String<MESSAGE_MAX> {
    let mut out = String::new();
    for c in prefix.chars().chain(text.chars()) {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Pending repaint
#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    full: bool,
    history: bool,
    input: bool,
}

pub struct ChatApp {
    screen: Rect,
    keyboard: OnScreenKeyboard,
    messages: Deque<Message, MAX_MESSAGES>,
    /// First visible history line
    scroll: usize,
    drag: DragScroll,
    dirty: Dirty,
}

impl ChatApp {
    pub fn new(config: &ShellConfig, screen: Rect) -> Self {
        Self {
            screen,
            keyboard: OnScreenKeyboard::new(config.keyboard, screen),
            messages: Deque::new(),
            scroll: 0,
            drag: DragScroll::default(),
            dirty: Dirty::default(),
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Current keyboard text
    pub fn input(&self) -> &str {
        self.keyboard.text()
    }

    // Layout depends on whether the keyboard is up

    fn input_y(&self) -> i32 {
        if self.keyboard.is_visible() {
            self.keyboard.region().y - INPUT_H - 6
        } else {
            self.screen.bottom() - INPUT_H - 6
        }
    }

    pub fn input_rect(&self) -> Rect {
        Rect::new(4, self.input_y(), INPUT_W, INPUT_H)
    }

    pub fn send_button(&self) -> Rect {
        Rect::new(SIDE_X, self.input_y(), SIDE_W, INPUT_H)
    }

    pub fn keyboard_toggle(&self) -> Rect {
        Rect::new(SIDE_X, self.input_y() - TOGGLE_H - 4, SIDE_W, TOGGLE_H)
    }

    fn chat_bottom(&self) -> i32 {
        self.input_y() - 6 - TOGGLE_H - 4
    }

    pub fn history_rect(&self) -> Rect {
        Rect::new(CHAT_X0, CHAT_TOP, WRAP_W, self.chat_bottom() - CHAT_TOP)
    }

    fn visible_lines(&self) -> usize {
        ((self.chat_bottom() - CHAT_TOP) / LINE_H).max(0) as usize
    }

    fn total_lines(&self) -> usize {
        self.messages
            .iter()
            .map(|m| m.user_lines() + m.ai_shown() + BLOCK_GAP_LINES)
            .sum()
    }

    fn max_scroll(&self) -> usize {
        self.total_lines().saturating_sub(self.visible_lines())
    }

    /// Message whose expand toggle is under `p`
    fn ai_toggle_at(&self, p: Point) -> Option<usize> {
        let last = self.scroll + self.visible_lines();
        let mut line = 0;
        for (i, m) in self.messages.iter().enumerate() {
            line += m.user_lines();
            if m.collapsible()
                && (self.scroll..last).contains(&line)
                && ai_toggle_rect(CHAT_TOP + (line - self.scroll) as i32 * LINE_H).contains(p)
            {
                return Some(i);
            }
            line += m.ai_shown() + BLOCK_GAP_LINES;
        }
        None
    }

    fn set_keyboard_visible(&mut self, visible: bool) {
        self.keyboard.set_visible(visible);
        self.scroll = self.scroll.min(self.max_scroll());
        self.dirty.full = true;
    }

    fn send(&mut self, env: &mut Env<'_>) -> Response {
        let text = self.keyboard.text().trim();
        if text.is_empty() {
            return Response::NoOp;
        }
        let mut prompt = String::<MESSAGE_MAX>::new();
        let _ = prompt.push_str(text);

        self.keyboard.clear();
        self.dirty.input = true;

        #[cfg(feature = "defmt")]
        defmt::info!("chat: sending {} bytes", prompt.len());

        let reply = env.chat.send(&prompt);
        if self.messages.is_full() {
            self.messages.pop_front();
        }
        let _ = self.messages.push_back(Message::new(&prompt, &reply));

        self.scroll = 0;
        self.dirty.history = true;
        Response::Changed
    }

    fn on_press(&mut self, p: Point, env: &mut Env<'_>) -> Response {
        if ui::back_button(self.screen).contains(p) {
            return Response::CloseSelf;
        }
        if self.keyboard_toggle().contains(p) {
            self.set_keyboard_visible(!self.keyboard.is_visible());
            return Response::Changed;
        }
        if !self.keyboard.is_visible() && self.input_rect().contains(p) {
            self.set_keyboard_visible(true);
            return Response::Changed;
        }
        if self.send_button().contains(p) {
            return self.send(env);
        }
        if self.history_rect().contains(p) {
            if let Some(i) = self.ai_toggle_at(p) {
                if let Some(m) = self.messages.iter_mut().nth(i) {
                    m.expanded = !m.expanded;
                }
                self.scroll = self.scroll.min(self.max_scroll());
                self.dirty.history = true;
                return Response::Changed;
            }
            self.drag.press(p.y);
        }
        Response::NoOp
    }

    fn draw_history(&self, surface: &mut dyn DrawSurface) {
        let area = self.history_rect();
        let _ = surface.fill_rect(area, palette::WHITE);

        let first = self.scroll;
        let last = first + self.visible_lines();
        let y_of = |line: usize| CHAT_TOP + (line - first) as i32 * LINE_H;
        let mut line = 0;

        for m in self.messages.iter() {
            if line >= last {
                break;
            }
            for text in wrap_lines(&m.user, WRAP_W, measure) {
                if (first..last).contains(&line) {
                    let _ = surface.draw_text(text, Point::new(CHAT_X0, y_of(line)), FONT, palette::BLACK);
                }
                line += 1;
            }

            let ai_first = line;
            for text in wrap_lines(&m.ai, WRAP_W, measure).take(m.ai_shown()) {
                if (first..last).contains(&line) {
                    let _ = surface.draw_text(text, Point::new(CHAT_X0, y_of(line)), FONT, palette::NAVY);
                }
                line += 1;
            }
            if m.collapsible() && (first..last).contains(&ai_first) {
                draw_ai_toggle(surface, ai_toggle_rect(y_of(ai_first)), m.expanded);
            }

            line += BLOCK_GAP_LINES;
        }
    }

    fn draw_input_bar(&self, surface: &mut dyn DrawSurface) {
        let label = if self.keyboard.is_visible() { "HIDE" } else { "SHOW" };
        ui::button(surface, self.keyboard_toggle(), label);
        ui::button(surface, self.send_button(), "SEND");
        self.draw_input_text(surface);
    }

    fn draw_input_text(&self, surface: &mut dyn DrawSurface) {
        let rect = self.input_rect();
        let _ = surface.draw_frame(rect, palette::WHITE, palette::BLACK);

        let text = ui::tail_fitting(self.keyboard.text(), INPUT_TEXT_W, FONT);
        let y = rect.y + (rect.h - FONT.line_height()) / 2;
        let _ = surface.draw_text(text, Point::new(rect.x + 6, y), FONT, palette::BLACK);

        // Caret
        let x = rect.x + 7 + FONT.measure(text);
        let _ = surface.fill_rect(Rect::new(x, y, 2, FONT.line_height()), palette::BLUE);
    }

    fn draw_all(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.dirty = Dirty::default();
        let _ = surface.fill_rect(self.screen, palette::WHITE);
        ui::draw_header(surface, self.screen, "AI Chat", palette::BLUE, env.status);
        self.draw_history(surface);
        self.draw_input_bar(surface);
        self.keyboard.draw(surface);
    }
}

fn ai_toggle_rect(y: i32) -> Rect {
    Rect::new(CHAT_X1 - AI_TOGGLE - 2, y, AI_TOGGLE, AI_TOGGLE)
}

/// Small box with a caret pointing the way the block will change
fn draw_ai_toggle(surface: &mut dyn DrawSurface, rect: Rect, expanded: bool) {
    let _ = surface.draw_frame(rect, palette::CHROME_LIGHT, palette::BLACK);
    let c = rect.center();
    let (tip, base) = if expanded { (c.y - 3, c.y + 2) } else { (c.y + 3, c.y - 2) };
    for dx in 0..=4 {
        let y = base + (tip - base) * dx / 4;
        let _ = surface.draw_line(Point::new(c.x - 4 + dx, y), Point::new(c.x + 4 - dx, y), palette::BLACK);
    }
}

impl App for ChatApp {
    fn open(&mut self, _env: &mut Env<'_>) -> Result<(), super::OpenError> {
        self.keyboard.set_visible(true);
        self.drag.release();
        self.dirty.full = true;
        Ok(())
    }

    fn close(&mut self, _env: &mut Env<'_>) {
        self.keyboard.release();
        self.drag.release();
    }

    fn handle(&mut self, event: TouchEvent, env: &mut Env<'_>) -> Response {
        match event.phase {
            TouchPhase::Press => self.on_press(event.pos, env),
            TouchPhase::Held => {
                if !self.drag.is_active() {
                    return Response::NoOp;
                }
                let scroll = self.drag.held(event.pos.y, LINE_H, self.scroll, self.max_scroll());
                if scroll == self.scroll {
                    return Response::NoOp;
                }
                self.scroll = scroll;
                self.dirty.history = true;
                Response::Changed
            }
            TouchPhase::Release => {
                self.drag.release();
                Response::NoOp
            }
        }
    }

    fn key_changed(&mut self, action: KeyAction, _env: &mut Env<'_>) {
        if action == KeyAction::Changed {
            self.dirty.input = true;
        }
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
        if dirty.history {
            self.draw_history(surface);
        }
        if dirty.input {
            self.draw_input_text(surface);
        }
        let keys = self.keyboard.render_damage(surface);
        dirty.history || dirty.input || keys
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
    use crate::apps::testing::{surface, Fixture};
    use core::fmt::Write;

    fn app() -> ChatApp {
        ChatApp::new(&ShellConfig::default(), Rect::new(0, 0, 320, 240))
    }

    fn press(app: &mut ChatApp, fx: &mut Fixture, r: Rect) -> Response {
        let c = r.center();
        let mut env = fx.env(0);
        let res = app.handle(TouchEvent::press(c.x, c.y), &mut env);
        app.handle(TouchEvent::release(c.x, c.y), &mut env);
        res
    }

    #[test]
    fn test_layout_follows_keyboard() {
        let mut a = app();
        assert_eq!(a.input_rect(), Rect::new(4, 106, 240, 28));
        assert_eq!(a.send_button(), Rect::new(250, 106, 66, 28));
        assert_eq!(a.visible_lines(), 3);
        assert!(!a.history_rect().intersects(&a.keyboard_toggle()));

        a.set_keyboard_visible(false);
        assert_eq!(a.input_rect().y, 206);
        assert_eq!(a.visible_lines(), 10);
    }

    #[test]
    fn test_send_trims_and_appends_pair() {
        let mut fx = Fixture::new();
        let mut a = app();
        a.keyboard.set_text("  hello there ");
        let send = a.send_button();
        assert_eq!(press(&mut a, &mut fx, send), Response::Changed);

        assert_eq!(fx.chat.prompts, ["hello there"]);
        assert_eq!(a.input(), "");
        let m = a.messages().next().unwrap();
        assert_eq!(m.user.as_str(), "You: hello there");
        assert_eq!(m.ai.as_str(), "AI:  Hello!");
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let mut fx = Fixture::new();
        let mut a = app();
        a.keyboard.set_text("   ");
        let send = a.send_button();
        assert_eq!(press(&mut a, &mut fx, send), Response::NoOp);
        assert!(fx.chat.prompts.is_empty());
        assert_eq!(a.input(), "   ");
    }

    #[test]
    fn test_history_keeps_newest_eight() {
        let mut fx = Fixture::new();
        let mut a = app();
        for i in 0..10 {
            let mut s = String::<8>::new();
            let _ = write!(s, "m{}", i);
            a.keyboard.set_text(&s);
            let send = a.send_button();
            press(&mut a, &mut fx, send);
        }
        assert_eq!(a.messages().count(), MAX_MESSAGES);
        assert_eq!(a.messages().next().unwrap().user.as_str(), "You: m2");
    }

    #[test]
    fn test_long_reply_collapses_and_expands() {
        let mut fx = Fixture::new();
        fx.chat.reply = "word ".repeat(60);
        let mut a = app();
        a.set_keyboard_visible(false);
        a.keyboard.set_text("q");
        let send = a.send_button();
        press(&mut a, &mut fx, send);

        let m = a.messages().next().unwrap();
        assert!(m.ai_lines() > AI_COLLAPSED_LINES);
        assert_eq!(a.total_lines(), 1 + 3 + 1);

        // The toggle sits on the reply's first line, right after the prompt
        let toggle = ai_toggle_rect(CHAT_TOP + LINE_H);
        assert_eq!(press(&mut a, &mut fx, toggle), Response::Changed);
        assert!(a.messages().next().unwrap().expanded);
        assert!(a.total_lines() > 5);
    }

    #[test]
    fn test_drag_scrolls_by_lines() {
        let mut fx = Fixture::new();
        let mut a = app();
        for _ in 0..4 {
            a.keyboard.set_text("hi");
            let send = a.send_button();
            press(&mut a, &mut fx, send);
        }
        // 4 × (1 + 1 + 1) lines, 3 visible
        assert_eq!(a.max_scroll(), 9);

        let mut env = fx.env(0);
        a.handle(TouchEvent::press(100, 70), &mut env);
        assert_eq!(a.handle(TouchEvent::held(100, 40), &mut env), Response::Changed);
        assert_eq!(a.scroll(), 2);
        // 2 px left over from the first move, 14 more make a line
        a.handle(TouchEvent::held(100, 56), &mut env);
        assert_eq!(a.scroll(), 1);
        a.handle(TouchEvent::release(100, 56), &mut env);
        assert_eq!(a.handle(TouchEvent::held(100, 0), &mut env), Response::NoOp);
    }

    #[test]
    fn test_keyboard_toggle_and_input_tap() {
        let mut fx = Fixture::new();
        let mut a = app();
        let toggle = a.keyboard_toggle();
        press(&mut a, &mut fx, toggle);
        assert!(!a.keyboard.is_visible());

        let input = a.input_rect();
        press(&mut a, &mut fx, input);
        assert!(a.keyboard.is_visible());
    }

    #[test]
    fn test_back_closes() {
        let mut fx = Fixture::new();
        let mut a = app();
        let back = ui::back_button(a.screen);
        assert_eq!(press(&mut a, &mut fx, back), Response::CloseSelf);
    }

    #[test]
    fn test_flush_repaints_input_only_when_typed() {
        let mut fx = Fixture::new();
        let mut a = app();
        let mut s = surface();
        let env = fx.env(0);
        a.draw(&mut s, &env);
        assert!(!a.flush(&mut s, &env));

        a.keyboard.set_text("abc");
        a.dirty.input = true;
        assert!(a.flush(&mut s, &env));
        assert!(!a.flush(&mut s, &env));
    }
}
