//! Window chrome shared by the applications
//!
//! Every full-screen app has a coloured header with its title, a status
//! strip (signal bars and clock) and a BACK button at the right.

use core::fmt::Write;

use touchdesk_core::desktop::StatusInfo;
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};

pub const HEADER_H: i32 = 28;
const BACK_W: i32 = 52;
const BACK_H: i32 = 17;
const STATUS_W: i32 = 90;
const STATUS_H: i32 = 16;

/// Header strip across the top of `screen`
pub fn header_rect(screen: Rect) -> Rect {
    Rect::new(screen.x, screen.y, screen.w, HEADER_H)
}

pub fn back_button(screen: Rect) -> Rect {
    Rect::new(screen.right() - BACK_W - 8, screen.y + 6, BACK_W, BACK_H)
}

/// Signal and clock strip, left of the BACK button
pub fn status_rect(screen: Rect) -> Rect {
    let back = back_button(screen);
    Rect::new(back.x - STATUS_W - 6, screen.y + 6, STATUS_W, STATUS_H)
}

/// Area below the header
pub fn body_rect(screen: Rect) -> Rect {
    Rect::new(screen.x, screen.y + HEADER_H, screen.w, screen.h - HEADER_H)
}

/// Header with title, status strip and BACK
pub fn draw_header(
    surface: &mut dyn DrawSurface,
    screen: Rect,
    title: &str,
    fill: Rgb565,
    status: StatusInfo,
) {
    let _ = surface.fill_rect(header_rect(screen), fill);
    let _ = surface.draw_text(title, Point::new(screen.x + 8, screen.y + 8), Font::Medium, palette::WHITE);
    draw_status(surface, status_rect(screen), status);
    let _ = surface.draw_button(back_button(screen), "BACK", false, palette::CHROME, palette::BLACK);
}

/// Signal bars and `HH:MM`
pub fn draw_status(surface: &mut dyn DrawSurface, rect: Rect, status: StatusInfo) {
    let _ = surface.draw_frame(rect, palette::CHROME_LIGHT, palette::CHROME_DARK);

    let bars = if status.wifi_connected {
        palette::GREEN
    } else {
        palette::CHROME_DARK
    };
    for i in 0..3 {
        let h = 4 + i * 3;
        let r = Rect::new(rect.x + 5 + i * 5, rect.bottom() - 3 - h, 3, h);
        let _ = surface.fill_rect(r, bars);
    }

    let mut clock = heapless::String::<8>::new();
    let _ = write!(clock, "{:02}:{:02}", status.hour, status.minute);
    let text = Rect::new(rect.x + 22, rect.y, rect.w - 24, rect.h);
    let _ = surface.draw_text_centered(&clock, text, Font::Small, palette::BLACK);
}

/// Plain push button
pub fn button(surface: &mut dyn DrawSurface, rect: Rect, label: &str) {
    let _ = surface.draw_button(rect, label, false, palette::CHROME, palette::BLACK);
}

/// Push button drawn latched down while `on`
pub fn toggle(surface: &mut dyn DrawSurface, rect: Rect, label: &str, on: bool) {
    let fill = if on { palette::CHROME_LIGHT } else { palette::CHROME };
    let _ = surface.draw_button(rect, label, on, fill, palette::BLACK);
}

/// Text cut from the left so its tail fits `max_width`
pub fn tail_fitting(text: &str, max_width: i32, font: Font) -> &str {
    let mut start = 0;
    while font.measure(&text[start..]) > max_width {
        match text[start..].chars().next() {
            Some(c) => start += c.len_utf8(),
            None => break,
        }
    }
    &text[start..]
}
