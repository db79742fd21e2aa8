//! Trash window: lists deleted icons and puts them back on the desktop

use heapless::Vec;
use touchdesk_core::desktop::{Desktop, IconId};
use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};

use super::{App, Env, OpenError};
use crate::ui;

const HEADER_FILL: Rgb565 = Rgb565::new(20, 20, 10);
const LIST_Y: i32 = ui::HEADER_H + 8;
const ROW_H: i32 = 24;

pub fn restore_button() -> Rect {
    Rect::new(20, 204, 120, 24)
}

pub fn restore_all_button() -> Rect {
    Rect::new(180, 204, 120, 24)
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    full: bool,
    list: bool,
}

pub struct TrashApp {
    screen: Rect,
    /// Deleted icons in desktop order, as of the last refresh
    items: Vec<IconId, { IconId::COUNT }>,
    selected: Option<usize>,
    dirty: Dirty,
}

impl TrashApp {
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            items: Vec::new(),
            selected: None,
            dirty: Dirty::default(),
        }
    }

    pub fn items(&self) -> &[IconId] {
        &self.items
    }

    pub fn selected(&self) -> Option<IconId> {
        self.selected.and_then(|i| self.items.get(i).copied())
    }

    fn list_rect(&self) -> Rect {
        Rect::new(8, LIST_Y, self.screen.w - 16, restore_button().y - LIST_Y - 8)
    }

    fn row_rect(&self, i: usize) -> Rect {
        let list = self.list_rect();
        Rect::new(list.x + 2, list.y + 2 + i as i32 * ROW_H, list.w - 4, ROW_H)
    }

    fn row_at(&self, p: Point) -> Option<usize> {
        (0..self.items.len()).find(|&i| self.row_rect(i).contains(p))
    }

    fn refresh(&mut self, desktop: &Desktop) {
        let mask = desktop.trash();
        self.items.clear();
        for id in mask.deleted() {
            let _ = self.items.push(id);
        }
        if self.selected.is_some_and(|i| i >= self.items.len()) {
            self.selected = None;
        }
        self.dirty.list = true;
    }

    fn draw_list(&self, surface: &mut dyn DrawSurface) {
        let list = self.list_rect();
        let _ = surface.draw_frame(list, palette::WHITE, palette::CHROME_DARK);

        if self.items.is_empty() {
            let _ = surface.draw_text_centered("Trash is empty", list, Font::Medium, palette::CHROME_DARK);
            return;
        }
        for (i, id) in self.items.iter().enumerate() {
            let row = self.row_rect(i);
            let (fill, fg) = if self.selected == Some(i) {
                (palette::HIGHLIGHT, palette::WHITE)
            } else {
                (palette::WHITE, palette::BLACK)
            };
            let _ = surface.fill_rect(row, fill);
            let _ = surface.draw_text(id.label(), Point::new(row.x + 6, row.y + 5), Font::Medium, fg);
            let _ = surface.draw_text(
                id.description(),
                Point::new(row.x + 80, row.y + 7),
                Font::Small,
                fg,
            );
        }
    }

    fn draw_all(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.dirty = Dirty::default();
        let _ = surface.fill_rect(self.screen, palette::CHROME);
        ui::draw_header(surface, self.screen, "Trash", HEADER_FILL, env.status);
        ui::button(surface, restore_button(), "Restore");
        ui::button(surface, restore_all_button(), "Restore All");
        self.draw_list(surface);
    }
}

impl App for TrashApp {
    fn open(&mut self, env: &mut Env<'_>) -> Result<(), OpenError> {
        self.selected = None;
        self.refresh(env.desktop);
        self.dirty.full = true;
        Ok(())
    }

    fn handle(&mut self, event: TouchEvent, env: &mut Env<'_>) -> Response {
        if event.phase != TouchPhase::Press {
            return Response::NoOp;
        }
        let p = event.pos;

        if ui::back_button(self.screen).contains(p) {
            return Response::CloseSelf;
        }
        if restore_button().contains(p) {
            let Some(id) = self.selected() else {
                return Response::NoOp;
            };
            if env.desktop.restore(id) {
                #[cfg(feature = "defmt")]
                defmt::info!("Restored {} from trash", id);
            }
            self.selected = None;
            self.refresh(env.desktop);
            return Response::Changed;
        }
        if restore_all_button().contains(p) {
            if self.items.is_empty() {
                return Response::NoOp;
            }
            env.desktop.restore_all();
            #[cfg(feature = "defmt")]
            defmt::info!("Restored all icons from trash");
            self.selected = None;
            self.refresh(env.desktop);
            return Response::Changed;
        }
        if let Some(i) = self.row_at(p) {
            if self.selected != Some(i) {
                self.selected = Some(i);
                self.dirty.list = true;
                return Response::Changed;
            }
        }
        Response::NoOp
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.draw_all(surface, env);
    }

    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool {
        if self.dirty.full {
            self.draw_all(surface, env);
            return true;
        }
        if core::mem::take(&mut self.dirty.list) {
            self.draw_list(surface);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::Fixture;
    use touchdesk_core::desktop::TrashMask;

    const SCREEN: Rect = Rect::new(0, 0, 320, 240);

    fn tap(app: &mut TrashApp, fx: &mut Fixture, p: Point) -> Response {
        app.handle(TouchEvent::press(p.x, p.y), &mut fx.env(0))
    }

    fn with_deleted(ids: &[IconId]) -> (Fixture, TrashApp) {
        let mut fx = Fixture::new();
        let mut mask = TrashMask::default();
        for &id in ids {
            mask.delete(id);
        }
        fx.desktop.set_trash(mask);
        let mut app = TrashApp::new(SCREEN);
        app.open(&mut fx.env(0)).unwrap();
        (fx, app)
    }

    #[test]
    fn test_lists_deleted_in_desktop_order() {
        let (_fx, app) = with_deleted(&[IconId::Wifi, IconId::Chat]);
        assert_eq!(app.items(), &[IconId::Chat, IconId::Wifi]);
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn test_restore_needs_selection() {
        let (mut fx, mut app) = with_deleted(&[IconId::Paint]);
        assert_eq!(tap(&mut app, &mut fx, restore_button().center()), Response::NoOp);
        assert!(!fx.desktop.is_visible(IconId::Paint));
    }

    #[test]
    fn test_restore_selected() {
        let (mut fx, mut app) = with_deleted(&[IconId::Paint, IconId::Notes]);
        let row = app.row_rect(1).center();
        assert_eq!(tap(&mut app, &mut fx, row), Response::Changed);
        assert_eq!(app.selected(), Some(IconId::Notes));

        assert_eq!(tap(&mut app, &mut fx, restore_button().center()), Response::Changed);
        assert!(fx.desktop.is_visible(IconId::Notes));
        assert!(!fx.desktop.is_visible(IconId::Paint));
        assert_eq!(app.items(), &[IconId::Paint]);
        assert_eq!(app.selected(), None);
        assert!(fx.desktop.take_trash_changed().is_some());
    }

    #[test]
    fn test_restore_all() {
        let (mut fx, mut app) = with_deleted(&[IconId::Chat, IconId::Internet, IconId::Wifi]);
        assert_eq!(tap(&mut app, &mut fx, restore_all_button().center()), Response::Changed);
        assert!(app.items().is_empty());
        assert!(fx.desktop.trash().is_empty());
        assert_eq!(tap(&mut app, &mut fx, restore_all_button().center()), Response::NoOp);
    }

    #[test]
    fn test_back_closes() {
        let (mut fx, mut app) = with_deleted(&[]);
        assert_eq!(tap(&mut app, &mut fx, ui::back_button(SCREEN).center()), Response::CloseSelf);
    }
}
