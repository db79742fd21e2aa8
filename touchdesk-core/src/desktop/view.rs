//! Desktop rendering
//!
//! Layers, back to front: wallpaper, icons, context menu, taskbar, start
//! menu, cursor. A region redraw clips to the damaged rectangle and
//! repaints every layer that intersects it.

use core::fmt::Write;

use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};

use super::icons::{self, IconId};
use super::menu::{ContextItem, PopupMenu, START_ITEMS};
use super::{cursor_rect, start_button, status_area, taskbar_rect, Desktop};
use crate::damage::Compositor;

const WALLPAPER_BAND: i32 = 16;
const TASKBAR: Rgb565 = Rgb565::new(0, 35, 31);
const TASKBAR_EDGE: Rgb565 = Rgb565::new(15, 31, 15);
const START_STRIPE_W: i32 = 28;

fn wallpaper_color(band: i32) -> Rgb565 {
    let b = band.clamp(0, 15) as u8;
    Rgb565::new(0, 40 - b, 14 + b / 2)
}

fn icon_color(id: IconId) -> Rgb565 {
    match id {
        IconId::Chat => Rgb565::new(4, 40, 28),
        IconId::Paint => Rgb565::new(28, 30, 4),
        IconId::Trash => palette::CHROME,
        IconId::Internet => Rgb565::new(2, 20, 28),
        IconId::Notes => Rgb565::new(30, 58, 12),
        IconId::Wifi => Rgb565::new(10, 50, 10),
    }
}

fn icon_tag(id: IconId) -> &'static str {
    match id {
        IconId::Chat => "AI",
        IconId::Paint => "Pt",
        IconId::Trash => "",
        IconId::Internet => "e",
        IconId::Notes => "Nt",
        IconId::Wifi => "Wi",
    }
}

impl Desktop {
    /// Repaint all pending damage
    ///
    /// Returns false if nothing was pending.
    pub fn flush(&mut self, surface: &mut dyn DrawSurface) -> bool {
        let rects = self.damage.take();
        for rect in &rects {
            self.redraw_region(surface, *rect);
        }
        !rects.is_empty()
    }

    fn compose(&self, surface: &mut dyn DrawSurface, rect: Rect) {
        draw_wallpaper(surface, rect);

        for id in self.visible_icons() {
            if self.icon_box(id).intersects(&rect) {
                self.draw_icon(surface, id);
            }
        }

        if let Some((_, menu)) = self.context_menu() {
            if menu.rect().intersects(&rect) {
                draw_menu(surface, menu, 0, |i| ContextItem::ALL[i].label());
            }
        }

        if taskbar_rect(self.screen).intersects(&rect) {
            self.draw_taskbar(surface);
        }

        if let Some(menu) = self.start_menu() {
            if menu.rect().intersects(&rect) {
                let stripe = Rect::new(menu.rect().x + 1, menu.rect().y + 1, START_STRIPE_W, menu.rect().h - 2);
                draw_menu(surface, menu, START_STRIPE_W, |i| START_ITEMS[i].1);
                let _ = surface.fill_rect(stripe, palette::NAVY);
            }
        }

        if let Some(p) = self.cursor {
            if cursor_rect(p).intersects(&rect) {
                draw_cursor(surface, p);
            }
        }
    }

    fn draw_icon(&self, surface: &mut dyn DrawSurface, id: IconId) {
        let pos = self.icons.position(id);
        let body = icons::icon_body(pos);

        if id == IconId::Trash && self.hover_trash {
            let _ = surface.fill_rect(body.inflate(2), palette::TRASH_HOVER);
        }
        let _ = surface.draw_frame(body, icon_color(id), palette::BLACK);
        let _ = surface.draw_text_centered(icon_tag(id), body, Font::Medium, palette::WHITE);

        if id == IconId::Trash {
            // Bin outline, with paper inside when something was deleted
            let bin = Rect::new(body.x + 10, body.y + 8, 20, 26);
            let _ = surface.draw_rect(bin, palette::BLACK);
            for i in 0..self.trash.count().min(4) as i32 {
                let y = bin.y + 5 + i * 5;
                let _ = surface.draw_line(Point::new(bin.x + 4, y), Point::new(bin.right() - 5, y), palette::WHITE);
            }
        }

        if self.armed == Some(id) {
            let _ = surface.draw_rect(body.inflate(1), palette::YELLOW);
        }

        let slot = icons::label_slot(pos);
        let label = id.label();
        let tw = surface.measure_text_width(label, Font::Small);
        if self.selected == Some(id) {
            let w = (tw + 14).clamp(34, icons::LABEL_W);
            let chip = Rect::new(slot.center().x - w / 2, slot.y + 2, w, 18);
            let _ = surface.draw_frame(chip, palette::HIGHLIGHT, palette::WHITE);
            let _ = surface.draw_text_centered(label, chip, Font::Small, palette::WHITE);
        } else {
            let at = Point::new(
                slot.x + (slot.w - tw) / 2,
                slot.y + (slot.h - Font::Small.line_height()) / 2,
            );
            let _ = surface.draw_text(label, at + Point::new(1, 1), Font::Small, palette::BLACK);
            let _ = surface.draw_text(label, at, Font::Small, palette::WHITE);
        }
    }

    fn draw_taskbar(&self, surface: &mut dyn DrawSurface) {
        let bar = taskbar_rect(self.screen);
        let _ = surface.fill_rect(bar, TASKBAR);
        let _ = surface.draw_line(bar.top_left(), Point::new(bar.right() - 1, bar.y), TASKBAR_EDGE);

        let open = self.start_menu().is_some();
        let _ = surface.draw_button(start_button(self.screen), "Start", open, palette::CHROME, palette::BLACK);

        let area = status_area(self.screen);
        let _ = surface.draw_frame(area, palette::CHROME_LIGHT, palette::CHROME_DARK);

        // Signal bars
        let bars = if self.status.wifi_connected {
            palette::GREEN
        } else {
            palette::CHROME_DARK
        };
        for i in 0..3 {
            let h = 4 + i * 3;
            let r = Rect::new(area.x + 5 + i * 5, area.bottom() - 3 - h, 3, h);
            let _ = surface.fill_rect(r, bars);
        }

        let mut clock = heapless::String::<8>::new();
        let _ = write!(clock, "{:02}:{:02}", self.status.hour, self.status.minute);
        let text = Rect::new(area.x + 22, area.y, area.w - 24, area.h);
        let _ = surface.draw_text_centered(&clock, text, Font::Small, palette::BLACK);
    }
}

impl Compositor for Desktop {
    fn redraw_region(&mut self, surface: &mut dyn DrawSurface, rect: Rect) {
        let Some(rect) = rect.intersection(&self.screen) else {
            return;
        };
        surface.set_clip(Some(rect));
        self.compose(surface, rect);
        surface.set_clip(None);
    }

    fn draw_full(&mut self, surface: &mut dyn DrawSurface) {
        self.damage.clear();
        surface.set_clip(None);
        self.compose(surface, self.screen);
    }
}

fn draw_wallpaper(surface: &mut dyn DrawSurface, rect: Rect) {
    let first = rect.y.div_euclid(WALLPAPER_BAND);
    let last = (rect.bottom() - 1).div_euclid(WALLPAPER_BAND);
    for band in first..=last {
        let strip = Rect::new(rect.x, band * WALLPAPER_BAND, rect.w, WALLPAPER_BAND);
        if let Some(r) = strip.intersection(&rect) {
            let _ = surface.fill_rect(r, wallpaper_color(band));
        }
    }
}

fn draw_menu(
    surface: &mut dyn DrawSurface,
    menu: &PopupMenu,
    indent: i32,
    label: impl Fn(usize) -> &'static str,
) {
    let _ = surface.draw_frame(menu.rect(), palette::CHROME, palette::BLACK);
    for i in 0..menu.len() {
        let item = menu.item_rect(i);
        let color = if menu.active() == Some(i) {
            let _ = surface.fill_rect(item, palette::HIGHLIGHT);
            palette::WHITE
        } else {
            palette::BLACK
        };
        let at = Point::new(
            item.x + indent + 6,
            item.y + (item.h - Font::Medium.line_height()) / 2,
        );
        let _ = surface.draw_text(label(i), at, Font::Medium, color);
    }
}

fn draw_cursor(surface: &mut dyn DrawSurface, p: Point) {
    let r = cursor_rect(p);
    let _ = surface.draw_line(Point::new(r.x, p.y), Point::new(r.right() - 1, p.y), palette::WHITE);
    let _ = surface.draw_line(Point::new(p.x, r.y), Point::new(p.x, r.bottom() - 1), palette::WHITE);
}
