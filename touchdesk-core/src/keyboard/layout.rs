//! Keyboard layout
//!
//! The layout is a pure function of the mode and the screen geometry and
//! is rebuilt on every hit test, so a mode toggle can never leave stale
//! hitboxes behind.

use heapless::Vec;
use touchdesk_display::{Point, Rect};

/// Most keys a layout can hold
pub const MAX_KEYS: usize = 64;

/// Default top edge of the keyboard on a 240-pixel-high panel
pub const KB_Y: i32 = 140;

const PAD_L: i32 = 6;
const PAD_R: i32 = 6;
const GAP: i32 = 1;
const FN_W: i32 = 54;
const CAPS_W: i32 = 54;
/// Row 2 is indented relative to row 1
const ROW2_INDENT: i32 = 10;

const ALPHA_ROW1: &str = "QWERTYUIOP";
const ALPHA_ROW2: &str = "ASDFGHJKL";
const ALPHA_ROW3: &str = "ZXCVBNM";
const NUM_ROW1: &str = "1234567890";
const NUM_ROW2: &str = "-/:;()$&@";
const NUM_ROW3: &str = ".,?!'\"+=#";

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyKind {
    Char(char),
    Space,
    Delete,
    /// Toggle between letters and numbers/symbols
    Mode,
    Caps,
    Clear,
}

/// One key's rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyRect {
    pub rect: Rect,
    pub kind: KeyKind,
}

pub type Layout = Vec<KeyRect, MAX_KEYS>;

/// Top edge of the keyboard, kept at least 60 px above the bottom
pub fn keyboard_top(screen: Rect, top: i32) -> i32 {
    top.clamp(screen.y, screen.bottom() - 60)
}

/// Key height for the four rows below `top`, clamped to 18..=28
pub fn key_height(screen: Rect, top: i32) -> i32 {
    let avail = screen.bottom() - keyboard_top(screen, top);
    ((avail - 3 * GAP) / 4).clamp(18, 28)
}

/// Area the keyboard occupies
pub fn keyboard_region(screen: Rect, top: i32) -> Rect {
    let top = keyboard_top(screen, top);
    Rect::new(screen.x, top, screen.w, screen.bottom() - top)
}

/// Build the key rectangles for a mode, row-major, left to right
pub fn build_layout(mode123: bool, screen: Rect, top: i32) -> Layout {
    let mut keys = Layout::new();
    let kh = key_height(screen, top);
    let top = keyboard_top(screen, top);
    let row_y = |row: i32| top + row * (kh + GAP);

    let right = screen.right() - PAD_R;
    let x_mode = right - FN_W;
    let x_clr = x_mode - GAP - FN_W;
    let x_del = x_mode;
    let row1_x = screen.x + PAD_L;
    let row2_x = row1_x + ROW2_INDENT;

    let (r1, r2, r3) = if mode123 {
        (NUM_ROW1, NUM_ROW2, NUM_ROW3)
    } else {
        (ALPHA_ROW1, ALPHA_ROW2, ALPHA_ROW3)
    };

    push_row(&mut keys, r1, row1_x, right, row_y(0), kh);

    push_row(&mut keys, r2, row2_x, x_del - GAP, row_y(1), kh);
    push(&mut keys, Rect::new(x_del, row_y(1), FN_W, kh), KeyKind::Delete);

    let row3_x = if mode123 {
        row1_x
    } else {
        push(&mut keys, Rect::new(row1_x, row_y(2), CAPS_W, kh), KeyKind::Caps);
        row1_x + CAPS_W + GAP
    };
    push_row(&mut keys, r3, row3_x, x_clr - GAP, row_y(2), kh);
    push(&mut keys, Rect::new(x_clr, row_y(2), FN_W, kh), KeyKind::Clear);
    push(&mut keys, Rect::new(x_mode, row_y(2), FN_W, kh), KeyKind::Mode);

    push(
        &mut keys,
        Rect::new(row1_x, row_y(3), right - row1_x, kh),
        KeyKind::Space,
    );

    keys
}

/// Lay out a row of character keys evenly between `x0` and `x1`
fn push_row(keys: &mut Layout, chars: &str, x0: i32, x1: i32, y: i32, h: i32) {
    let n = chars.chars().count() as i32;
    if n == 0 {
        return;
    }
    let w = ((x1 - x0) - (n - 1) * GAP) / n;
    let mut x = x0;
    for c in chars.chars() {
        push(keys, Rect::new(x, y, w, h), KeyKind::Char(c));
        x += w + GAP;
    }
}

fn push(keys: &mut Layout, rect: Rect, kind: KeyKind) {
    // Layouts are far below MAX_KEYS; an overflowing key is simply absent
    let _ = keys.push(KeyRect { rect, kind });
}

/// Index of the first key whose padded rectangle contains `p`
///
/// Overlapping padded rectangles resolve to the earliest key in layout
/// order.
pub fn hit_test(keys: &[KeyRect], p: Point, pad: i32) -> Option<usize> {
    keys.iter().position(|k| k.rect.contains_padded(p, pad))
}

/// Index of the first key of a kind
pub fn find_kind(keys: &[KeyRect], kind: KeyKind) -> Option<usize> {
    keys.iter().position(|k| k.kind == kind)
}
