//! Internet viewer
//!
//! Shows one built-in page, word-wrapped to the window and scrolled by
//! dragging. There is no network access behind it; the link state only
//! decides whether the offline banner is shown.

use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_core::text::{line_count, wrap_lines};
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};

use super::{App, DragScroll, Env, OpenError};
use crate::ui;

pub const ADDRESS: &str = "http://touchdesk.local/welcome";

pub const PAGE: &str = "Welcome to Touchdesk\n\
\n\
This page is served from the shell itself. Drag the text up and down to \
scroll through it.\n\
\n\
Desktop: tap an icon to select it, hold it to open its menu, or drag it \
to move it around. Dropping an icon on the Trash hides it until it is \
restored from the Trash window.\n\
\n\
Start menu: the Start button on the taskbar lists every application, \
including the ones whose icons are in the Trash.\n\
\n\
Keyboard: keys fire when pressed. Hold DEL to repeat and hold CAPS to \
clear the whole line. The 123 key switches to numbers and symbols.\n\
\n\
Paint: pick a tool on the left and a colour at the bottom. The select \
tool lifts a rectangle that can be dragged to a new place.\n\
\n\
WiFi: open the WiFi window to scan for networks and join one. The \
signal bars in every header turn green once a network is joined.";

const FONT: Font = Font::Small;
const LINE_H: i32 = 12;
const PAD: i32 = 6;
const ADDRESS_H: i32 = 18;
const BANNER_H: i32 = 16;
const HEADER_FILL: Rgb565 = Rgb565::new(0, 20, 24);

fn measure(s: &str) -> i32 {
    FONT.measure(s)
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    full: bool,
    page: bool,
}

pub struct InternetApp {
    screen: Rect,
    scroll: usize,
    drag: DragScroll,
    /// Link state the page was last drawn with
    online: bool,
    dirty: Dirty,
}

impl InternetApp {
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            scroll: 0,
            drag: DragScroll::default(),
            online: false,
            dirty: Dirty::default(),
        }
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    fn address_rect(&self) -> Rect {
        Rect::new(4, ui::HEADER_H + 2, self.screen.w - 8, ADDRESS_H)
    }

    fn banner_rect(&self) -> Rect {
        let a = self.address_rect();
        Rect::new(a.x, a.bottom() + 2, a.w, BANNER_H)
    }

    /// Page area; shrinks by the banner height while offline
    pub fn page_rect(&self) -> Rect {
        let top = if self.online {
            self.address_rect().bottom() + 2
        } else {
            self.banner_rect().bottom() + 2
        };
        Rect::new(4, top, self.screen.w - 8, self.screen.bottom() - top - 4)
    }

    fn wrap_width(&self) -> i32 {
        self.page_rect().w - 2 * PAD
    }

    fn visible_lines(&self) -> usize {
        ((self.page_rect().h - PAD) / LINE_H).max(1) as usize
    }

    pub fn max_scroll(&self) -> usize {
        line_count(PAGE, self.wrap_width(), measure).saturating_sub(self.visible_lines())
    }

    fn set_online(&mut self, online: bool) {
        if online != self.online {
            self.online = online;
            self.scroll = self.scroll.min(self.max_scroll());
            self.dirty.full = true;
        }
    }

    fn draw_page(&self, surface: &mut dyn DrawSurface) {
        let area = self.page_rect();
        let _ = surface.draw_frame(area, palette::WHITE, palette::CHROME_DARK);
        let mut y = area.y + PAD / 2;
        for line in wrap_lines(PAGE, self.wrap_width(), measure)
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
        ui::draw_header(surface, self.screen, "Internet", HEADER_FILL, env.status);

        let address = self.address_rect();
        let _ = surface.draw_frame(address, palette::WHITE, palette::CHROME_DARK);
        let text = ui::tail_fitting(ADDRESS, address.w - 8, FONT);
        let at = Point::new(address.x + 4, address.y + (ADDRESS_H - FONT.line_height()) / 2);
        let _ = surface.draw_text(text, at, FONT, palette::NAVY);

        if !self.online {
            let banner = self.banner_rect();
            let _ = surface.fill_rect(banner, palette::YELLOW);
            let _ = surface.draw_text_centered(
                "Offline - showing cached page",
                banner,
                FONT,
                palette::BLACK,
            );
        }
        self.draw_page(surface);
    }
}

impl App for InternetApp {
    fn open(&mut self, env: &mut Env<'_>) -> Result<(), OpenError> {
        self.online = env.status.wifi_connected;
        self.scroll = 0;
        self.drag.release();
        self.dirty.full = true;
        Ok(())
    }

    fn close(&mut self, _env: &mut Env<'_>) {
        self.drag.release();
    }

    fn handle(&mut self, event: TouchEvent, _env: &mut Env<'_>) -> Response {
        let p = event.pos;
        match event.phase {
            TouchPhase::Press => {
                if ui::back_button(self.screen).contains(p) {
                    return Response::CloseSelf;
                }
                if self.page_rect().contains(p) {
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
                self.dirty.page = true;
                Response::Changed
            }
            TouchPhase::Release => {
                self.drag.release();
                Response::NoOp
            }
        }
    }

    fn tick(&mut self, env: &mut Env<'_>) {
        self.set_online(env.status.wifi_connected);
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.draw_all(surface, env);
    }

    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool {
        if self.dirty.full {
            self.draw_all(surface, env);
            return true;
        }
        if core::mem::take(&mut self.dirty.page) {
            self.draw_page(surface);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::{surface, Fixture};

    const SCREEN: Rect = Rect::new(0, 0, 320, 240);

    fn opened(fx: &mut Fixture, online: bool) -> InternetApp {
        let mut app = InternetApp::new(SCREEN);
        let mut env = fx.env(0);
        env.status.wifi_connected = online;
        app.open(&mut env).unwrap();
        app
    }

    #[test]
    fn test_page_is_taller_than_window() {
        let mut fx = Fixture::new();
        let app = opened(&mut fx, true);
        assert!(app.max_scroll() > 0);
    }

    #[test]
    fn test_offline_banner_takes_page_space() {
        let mut fx = Fixture::new();
        let online = opened(&mut fx, true);
        let offline = opened(&mut fx, false);
        assert!(!offline.is_online());
        assert_eq!(online.page_rect().h - offline.page_rect().h, BANNER_H + 2);
    }

    #[test]
    fn test_drag_scrolls_and_clamps() {
        let mut fx = Fixture::new();
        let mut app = opened(&mut fx, true);
        let mut env = fx.env(0);
        let y = app.page_rect().y + 100;

        app.handle(TouchEvent::press(100, y), &mut env);
        assert_eq!(app.handle(TouchEvent::held(100, y - LINE_H * 2), &mut env), Response::Changed);
        assert_eq!(app.scroll(), 2);
        app.handle(TouchEvent::held(100, y - LINE_H * 200), &mut env);
        assert_eq!(app.scroll(), app.max_scroll());
        app.handle(TouchEvent::release(100, 0), &mut env);

        // Drags starting on the address bar do not scroll
        app.handle(TouchEvent::press(100, 35), &mut env);
        assert_eq!(app.handle(TouchEvent::held(100, 200), &mut env), Response::NoOp);
    }

    #[test]
    fn test_link_change_redraws() {
        let mut fx = Fixture::new();
        let mut app = opened(&mut fx, false);
        let mut s = surface();
        app.draw(&mut s, &fx.env(0));
        assert!(!app.flush(&mut s, &fx.env(0)));
        assert_eq!(s.target().pixel(10, app.banner_rect().y + 1), Some(palette::YELLOW));

        let mut env = fx.env(0);
        env.status.wifi_connected = true;
        app.tick(&mut env);
        assert!(app.flush(&mut s, &env));
        assert_ne!(s.target().pixel(10, app.banner_rect().y + 1), Some(palette::YELLOW));
    }

    #[test]
    fn test_back_closes() {
        let mut fx = Fixture::new();
        let mut app = opened(&mut fx, true);
        let c = ui::back_button(SCREEN).center();
        assert_eq!(app.handle(TouchEvent::press(c.x, c.y), &mut fx.env(0)), Response::CloseSelf);
    }
}
