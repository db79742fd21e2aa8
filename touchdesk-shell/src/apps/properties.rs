//! Properties panel for one desktop icon; any tap closes it

use touchdesk_core::desktop::icons::icon_body;
use touchdesk_core::desktop::IconId;
use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect};

use super::{App, Env};

const PANEL: Rect = Rect::new(40, 50, 240, 140);

pub struct PropertiesApp {
    screen: Rect,
    icon: IconId,
    dirty: bool,
}

impl PropertiesApp {
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            icon: IconId::Chat,
            dirty: false,
        }
    }

    /// Select the icon the panel describes
    pub fn show(&mut self, icon: IconId) {
        self.icon = icon;
        self.dirty = true;
    }

    pub fn icon(&self) -> IconId {
        self.icon
    }
}

impl App for PropertiesApp {
    fn handle(&mut self, event: TouchEvent, _env: &mut Env<'_>) -> Response {
        match event.phase {
            TouchPhase::Press => Response::CloseSelf,
            _ => Response::NoOp,
        }
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface, _env: &Env<'_>) {
        self.dirty = false;
        let _ = surface.fill_rect(self.screen, palette::DESKTOP);
        let _ = surface.draw_frame(PANEL, palette::CHROME, palette::BLACK);

        let title = Rect::new(PANEL.x + 1, PANEL.y + 1, PANEL.w - 2, 20);
        let _ = surface.fill_rect(title, palette::NAVY);
        let _ = surface.draw_text("Properties", Point::new(title.x + 6, title.y + 4), Font::Medium, palette::WHITE);

        let body = icon_body(Point::new(PANEL.x + 12, PANEL.y + 32));
        let _ = surface.draw_frame(body, palette::CHROME_LIGHT, palette::CHROME_DARK);
        let x = body.right() + 12;
        let _ = surface.draw_text(self.icon.label(), Point::new(x, PANEL.y + 36), Font::Medium, palette::BLACK);
        let _ = surface.draw_text(
            self.icon.description(),
            Point::new(PANEL.x + 12, body.bottom() + 12),
            Font::Small,
            palette::BLACK,
        );
        let _ = surface.draw_text_centered(
            "Tap anywhere to close",
            Rect::new(PANEL.x, PANEL.bottom() - 20, PANEL.w, 16),
            Font::Small,
            palette::CHROME_DARK,
        );
    }

    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool {
        if !self.dirty {
            return false;
        }
        self.draw(surface, env);
        true
    }

    fn status_slot(&self, _screen: Rect) -> Option<Rect> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::{surface, Fixture};

    #[test]
    fn test_any_press_closes() {
        let mut fx = Fixture::new();
        let mut app = PropertiesApp::new(Rect::new(0, 0, 320, 240));
        app.show(IconId::Notes);
        assert_eq!(app.icon(), IconId::Notes);
        let mut env = fx.env(0);
        assert_eq!(app.handle(TouchEvent::press(5, 5), &mut env), Response::CloseSelf);
        assert_eq!(app.handle(TouchEvent::release(5, 5), &mut env), Response::NoOp);
    }

    #[test]
    fn test_show_repaints_once() {
        let mut fx = Fixture::new();
        let mut app = PropertiesApp::new(Rect::new(0, 0, 320, 240));
        let mut s = surface();
        app.show(IconId::Wifi);
        assert!(app.flush(&mut s, &fx.env(0)));
        assert!(!app.flush(&mut s, &fx.env(0)));
        assert_eq!(s.target().pixel(PANEL.x + 2, PANEL.y + 2), Some(palette::NAVY));
    }
}
