//! Popup menus
//!
//! The icon context menu and the start menu share one model: a column of
//! fixed-height items inside a frame, with at most one active item.
//!
//! A menu opened mid-gesture (long hold, start button press) receives the
//! rest of that gesture. Releasing without sliding keeps it open; sliding
//! past the drag threshold tracks the item under the finger and releasing
//! on one chooses it. Once open, a press outside the menu dismisses it.

use touchdesk_display::{Point, Rect};

use crate::input::{TouchEvent, TouchPhase};
use crate::state::AppId;

pub const MENU_ITEM_H: i32 = 20;
pub const CONTEXT_MENU_W: i32 = 150;
pub const START_MENU_W: i32 = 160;
/// Frame thickness around the item column
const INSET: i32 = 3;

/// Context menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContextItem {
    Open,
    Move,
    Properties,
    Cancel,
}

impl ContextItem {
    pub const ALL: [ContextItem; 4] = [
        ContextItem::Open,
        ContextItem::Move,
        ContextItem::Properties,
        ContextItem::Cancel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContextItem::Open => "Open",
            ContextItem::Move => "Move",
            ContextItem::Properties => "Properties",
            ContextItem::Cancel => "Cancel",
        }
    }
}

/// Start menu entries, top to bottom
pub const START_ITEMS: [(AppId, &str); 7] = [
    (AppId::Chat, "AI Chat"),
    (AppId::Paint, "Paint"),
    (AppId::Notes, "Notes"),
    (AppId::Internet, "Internet"),
    (AppId::Wifi, "WiFi"),
    (AppId::Settings, "Settings"),
    (AppId::Trash, "Trash"),
];

/// Result of feeding a touch event to an open menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuOutcome {
    Unchanged,
    /// The active item changed
    Changed,
    /// Item `n` was chosen; the menu should close
    Chosen(usize),
    /// The menu should close without a choice
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Tracking {
    /// No finger on the menu
    Idle,
    /// Finger still down from the gesture that opened the menu
    Opening { origin: Point },
    /// Following the finger over the items
    Items,
}

/// Open popup menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PopupMenu {
    rect: Rect,
    count: usize,
    active: Option<usize>,
    tracking: Tracking,
}

const fn menu_height(count: usize) -> i32 {
    count as i32 * MENU_ITEM_H + 2 * INSET
}

impl PopupMenu {
    /// Icon context menu at the finger, pushed back on-screen
    pub fn context(at: Point, screen: Rect) -> Self {
        let count = ContextItem::ALL.len();
        let (w, h) = (CONTEXT_MENU_W, menu_height(count));
        let mut x = at.x;
        let mut y = at.y;
        if x + w > screen.right() {
            x = screen.right() - w - 2;
        }
        if y + h > screen.bottom() {
            y = screen.bottom() - h - 2;
        }
        Self::opened(Rect::new(x.max(screen.x), y.max(screen.y), w, h), count, at)
    }

    /// Start menu sitting on top of the start button
    pub fn start(button: Rect, screen: Rect, at: Point) -> Self {
        let count = START_ITEMS.len();
        let h = menu_height(count);
        let y = (button.y - h).max(screen.y);
        Self::opened(Rect::new(button.x, y, START_MENU_W, h), count, at)
    }

    fn opened(rect: Rect, count: usize, origin: Point) -> Self {
        Self {
            rect,
            count,
            active: None,
            tracking: Tracking::Opening { origin },
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Area of item `i`
    pub fn item_rect(&self, i: usize) -> Rect {
        Rect::new(
            self.rect.x + INSET,
            self.rect.y + INSET + i as i32 * MENU_ITEM_H,
            self.rect.w - 2 * INSET,
            MENU_ITEM_H,
        )
    }

    /// Item under `p`, if any
    pub fn item_at(&self, p: Point) -> Option<usize> {
        if !self.rect.contains(p) {
            return None;
        }
        let rel = p.y - (self.rect.y + INSET);
        if rel < 0 {
            return None;
        }
        let i = (rel / MENU_ITEM_H) as usize;
        (i < self.count).then_some(i)
    }

    fn track(&mut self, p: Point) -> MenuOutcome {
        let item = self.item_at(p);
        if item == self.active {
            MenuOutcome::Unchanged
        } else {
            self.active = item;
            MenuOutcome::Changed
        }
    }

    /// Feed one touch event; `threshold_px` is the drag threshold that
    /// separates a slide from a resting finger
    pub fn handle(&mut self, event: TouchEvent, threshold_px: i32) -> MenuOutcome {
        let p = event.pos;
        match event.phase {
            TouchPhase::Press => {
                if !self.rect.contains(p) {
                    return MenuOutcome::Dismissed;
                }
                self.tracking = Tracking::Items;
                self.track(p)
            }
            TouchPhase::Held => match self.tracking {
                Tracking::Opening { origin } => {
                    let d = p - origin;
                    if d.x.abs() > threshold_px || d.y.abs() > threshold_px {
                        self.tracking = Tracking::Items;
                        self.track(p)
                    } else {
                        MenuOutcome::Unchanged
                    }
                }
                Tracking::Items => self.track(p),
                Tracking::Idle => MenuOutcome::Unchanged,
            },
            TouchPhase::Release => {
                let tracking = core::mem::replace(&mut self.tracking, Tracking::Idle);
                match (tracking, self.active) {
                    (Tracking::Items, Some(i)) => MenuOutcome::Chosen(i),
                    (Tracking::Items, None) => MenuOutcome::Dismissed,
                    _ => MenuOutcome::Unchanged,
                }
            }
        }
    }
}
