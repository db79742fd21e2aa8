//! Desktop icons and their footprints

use touchdesk_display::{Point, Rect};

pub const ICON_W: i32 = 40;
pub const ICON_H: i32 = 40;
pub const LABEL_W: i32 = 96;
pub const LABEL_H: i32 = 22;
const LABEL_GAP: i32 = 4;
const LABEL_PAD: i32 = 2;

/// Desktop icons, in hit-test order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IconId {
    Chat,
    Paint,
    Trash,
    Internet,
    Notes,
    Wifi,
}

impl IconId {
    pub const COUNT: usize = 6;

    pub const ALL: [IconId; Self::COUNT] = [
        IconId::Chat,
        IconId::Paint,
        IconId::Trash,
        IconId::Internet,
        IconId::Notes,
        IconId::Wifi,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            IconId::Chat => "Chat",
            IconId::Paint => "Paint",
            IconId::Trash => "Trash",
            IconId::Internet => "Internet",
            IconId::Notes => "Notes",
            IconId::Wifi => "WiFi",
        }
    }

    /// One-line description for the properties panel
    pub fn description(self) -> &'static str {
        match self {
            IconId::Chat => "Chat with the AI assistant",
            IconId::Paint => "Draw on a small canvas",
            IconId::Trash => "Deleted desktop icons",
            IconId::Internet => "Read-only web viewer",
            IconId::Notes => "Single page text notes",
            IconId::Wifi => "Scan and join networks",
        }
    }

    /// Factory placement
    pub fn default_position(self) -> Point {
        match self {
            IconId::Chat => Point::new(24, 40),
            IconId::Paint => Point::new(24, 100),
            IconId::Trash => Point::new(24, 160),
            IconId::Internet => Point::new(90, 40),
            IconId::Notes => Point::new(90, 100),
            IconId::Wifi => Point::new(90, 160),
        }
    }

    /// Bit in the trash mask; the Trash icon itself can never be deleted
    pub fn trash_bit(self) -> Option<u8> {
        match self {
            IconId::Chat => Some(0),
            IconId::Paint => Some(1),
            IconId::Internet => Some(2),
            IconId::Notes => Some(3),
            IconId::Wifi => Some(4),
            IconId::Trash => None,
        }
    }
}

/// Icon image area with its top-left at `pos`
pub fn icon_body(pos: Point) -> Rect {
    Rect::new(pos.x, pos.y, ICON_W, ICON_H)
}

/// Label slot centred under the icon
pub fn label_slot(pos: Point) -> Rect {
    Rect::new(
        pos.x + ICON_W / 2 - LABEL_W / 2,
        pos.y + ICON_H + LABEL_GAP,
        LABEL_W,
        LABEL_H,
    )
}

/// Icon plus label, padded; may extend past the screen
pub fn footprint(pos: Point) -> Rect {
    icon_body(pos).union(&label_slot(pos)).inflate(LABEL_PAD)
}

/// Footprint clipped to the screen: hit box, highlight and damage area
pub fn icon_box(pos: Point, screen: Rect) -> Rect {
    footprint(pos).intersection(&screen).unwrap_or(Rect::EMPTY)
}

/// Current icon positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IconSet {
    positions: [Point; IconId::COUNT],
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            positions: IconId::ALL.map(IconId::default_position),
        }
    }
}

impl IconSet {
    pub fn position(&self, id: IconId) -> Point {
        self.positions[id.index()]
    }

    pub fn set_position(&mut self, id: IconId, pos: Point) {
        self.positions[id.index()] = pos;
    }
}
