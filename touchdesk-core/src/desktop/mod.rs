//! Desktop: icons, trash, taskbar and popup menus
//!
//! The desktop is the bottom routing layer. It turns presses on icons into
//! taps (open the application), long holds (context menu) and drags (move
//! the icon, or delete it by dropping it on the trash). Every state change
//! records the screen area it affects; [`Desktop::flush`] repaints exactly
//! those areas through the compositor in [`view`].

pub mod icons;
pub mod menu;
pub mod trash;
pub mod view;

use touchdesk_display::{Point, Rect};

use crate::config::{DisplayConfig, GestureConfig};
use crate::damage::DamageList;
use crate::input::{clamp_position, DragController, DragToken, DropZones, Gesture, TouchEvent, TouchPhase};
use crate::state::AppId;

pub use icons::{IconId, IconSet};
pub use menu::{ContextItem, MenuOutcome, PopupMenu, START_ITEMS};
pub use trash::TrashMask;

pub const TASKBAR_H: i32 = 20;
const CURSOR_R: i32 = 3;

/// Start button in the bottom-left corner of the taskbar
pub fn start_button(screen: Rect) -> Rect {
    Rect::new(screen.x + 4, screen.bottom() - TASKBAR_H + 2, 58, 16)
}

/// Taskbar clock and network indicator
pub fn status_area(screen: Rect) -> Rect {
    Rect::new(screen.right() - 92, screen.bottom() - TASKBAR_H + 2, 90, 16)
}

pub fn taskbar_rect(screen: Rect) -> Rect {
    Rect::new(screen.x, screen.bottom() - TASKBAR_H, screen.w, TASKBAR_H)
}

fn cursor_rect(p: Point) -> Rect {
    Rect::new(p.x - CURSOR_R, p.y - CURSOR_R, 2 * CURSOR_R + 1, 2 * CURSOR_R + 1)
}

/// What the taskbar status area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusInfo {
    pub hour: u8,
    pub minute: u8,
    pub wifi_connected: bool,
}

/// Result of a desktop event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DesktopAction {
    /// Nothing visible changed
    None,
    /// Damage was recorded
    Redraw,
    /// Bring an application to the front
    Open(AppId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Modal {
    Context { menu: PopupMenu, icon: IconId },
    Start { menu: PopupMenu },
}

impl Modal {
    fn menu(&self) -> &PopupMenu {
        match self {
            Modal::Context { menu, .. } | Modal::Start { menu } => menu,
        }
    }

    fn menu_mut(&mut self) -> &mut PopupMenu {
        match self {
            Modal::Context { menu, .. } | Modal::Start { menu } => menu,
        }
    }
}

/// Press on an icon, from press-start to release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct IconPress {
    icon: IconId,
    token: DragToken,
    /// Finger position relative to the icon's top-left
    grab: Point,
    /// Only presses on the icon image (or an armed move) can drag
    movable: bool,
}

/// Desktop state
#[derive(Debug, Clone)]
pub struct Desktop {
    screen: Rect,
    drag: DragController,
    status_refresh_ms: u32,
    icons: IconSet,
    trash: TrashMask,
    trash_changed: bool,
    selected: Option<IconId>,
    armed: Option<IconId>,
    press: Option<IconPress>,
    hover_trash: bool,
    modal: Option<Modal>,
    status: StatusInfo,
    status_at: Option<u32>,
    cursor: Option<Point>,
    damage: DamageList,
}

impl Desktop {
    pub fn new(gesture: &GestureConfig, display: &DisplayConfig) -> Self {
        Self {
            screen: Rect::new(0, 0, display.width, display.height),
            drag: DragController::new(gesture),
            status_refresh_ms: display.status_refresh_ms,
            icons: IconSet::default(),
            trash: TrashMask::default(),
            trash_changed: false,
            selected: None,
            armed: None,
            press: None,
            hover_trash: false,
            modal: None,
            status: StatusInfo::default(),
            status_at: None,
            cursor: None,
            damage: DamageList::new(),
        }
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Area icons may be dragged in
    pub fn icon_area(&self) -> Rect {
        Rect::new(self.screen.x, self.screen.y, self.screen.w, self.screen.h - TASKBAR_H)
    }

    pub fn icon_position(&self, id: IconId) -> Point {
        self.icons.position(id)
    }

    /// Hit box and redraw area of an icon with its label
    pub fn icon_box(&self, id: IconId) -> Rect {
        icons::icon_box(self.icons.position(id), self.screen)
    }

    pub fn trash_box(&self) -> Rect {
        self.icon_box(IconId::Trash)
    }

    pub fn is_visible(&self, id: IconId) -> bool {
        !self.trash.is_deleted(id)
    }

    /// Icons still on the desktop, in hit-test order
    pub fn visible_icons(&self) -> impl Iterator<Item = IconId> + '_ {
        IconId::ALL.into_iter().filter(|id| self.is_visible(*id))
    }

    pub fn selected(&self) -> Option<IconId> {
        self.selected
    }

    /// Icon whose next press drags immediately
    pub fn armed(&self) -> Option<IconId> {
        self.armed
    }

    pub fn is_hovering_trash(&self) -> bool {
        self.hover_trash
    }

    pub fn trash(&self) -> TrashMask {
        self.trash
    }

    pub fn status(&self) -> StatusInfo {
        self.status
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn damage_mut(&mut self) -> &mut DamageList {
        &mut self.damage
    }

    pub fn modal_visible(&self) -> bool {
        self.modal.is_some()
    }

    /// The open context menu and the icon it belongs to
    pub fn context_menu(&self) -> Option<(IconId, &PopupMenu)> {
        match &self.modal {
            Some(Modal::Context { menu, icon }) => Some((*icon, menu)),
            _ => None,
        }
    }

    pub fn start_menu(&self) -> Option<&PopupMenu> {
        match &self.modal {
            Some(Modal::Start { menu }) => Some(menu),
            _ => None,
        }
    }

    /// Icon under `p` and whether the hit was on its image
    ///
    /// Images win over labels so a label overlapping a neighbour's image
    /// never steals the press.
    pub fn hit_test(&self, p: Point) -> Option<(IconId, bool)> {
        self.visible_icons()
            .find(|id| icons::icon_body(self.icons.position(*id)).contains(p))
            .map(|id| (id, true))
            .or_else(|| {
                self.visible_icons()
                    .find(|id| self.icon_box(*id).contains(p))
                    .map(|id| (id, false))
            })
    }

    /// Replace the trash mask (loaded from storage)
    pub fn set_trash(&mut self, trash: TrashMask) {
        if trash != self.trash {
            self.trash = trash;
            self.damage.add(self.screen);
        }
    }

    /// Put a deleted icon back
    pub fn restore(&mut self, id: IconId) -> bool {
        if !self.trash.restore(id) {
            return false;
        }
        self.trash_changed = true;
        self.damage.add(self.icon_box(id));
        self.damage.add(self.trash_box());
        true
    }

    pub fn restore_all(&mut self) {
        if self.trash.is_empty() {
            return;
        }
        self.trash.restore_all();
        self.trash_changed = true;
        self.damage.add(self.screen);
    }

    /// Mask to persist, if it changed since the last call
    pub fn take_trash_changed(&mut self) -> Option<TrashMask> {
        core::mem::take(&mut self.trash_changed).then_some(self.trash)
    }

    /// Update the taskbar status, at most once per refresh interval
    ///
    /// Returns true if the status area was damaged.
    pub fn update_status(&mut self, status: StatusInfo, now_ms: u32) -> bool {
        if let Some(at) = self.status_at {
            if now_ms.wrapping_sub(at) < self.status_refresh_ms {
                return false;
            }
        }
        self.status_at = Some(now_ms);
        if status == self.status {
            return false;
        }
        self.status = status;
        self.damage.add(status_area(self.screen));
        true
    }

    /// Move or hide the touch cursor
    pub fn set_cursor(&mut self, pos: Option<Point>) {
        if pos == self.cursor {
            return;
        }
        if let Some(old) = self.cursor {
            self.damage.add(cursor_rect(old));
        }
        if let Some(new) = pos {
            self.damage.add(cursor_rect(new));
        }
        self.cursor = pos;
    }

    /// Handle an event routed to the desktop layer
    pub fn handle(&mut self, event: TouchEvent, now_ms: u32) -> DesktopAction {
        match event.phase {
            TouchPhase::Press => self.on_press(event.pos, now_ms),
            TouchPhase::Held => self.on_held(event.pos, now_ms),
            TouchPhase::Release => self.on_release(now_ms),
        }
    }

    /// Handle an event routed to the open menu
    pub fn handle_modal(&mut self, event: TouchEvent) -> DesktopAction {
        let threshold = self.drag.threshold_px();
        let Some(modal) = self.modal.as_mut() else {
            return DesktopAction::None;
        };
        let before = modal.menu().active();
        match modal.menu_mut().handle(event, threshold) {
            MenuOutcome::Unchanged => DesktopAction::None,
            MenuOutcome::Changed => {
                let menu = *modal.menu();
                for i in [before, menu.active()].into_iter().flatten() {
                    self.damage.add(menu.item_rect(i));
                }
                DesktopAction::Redraw
            }
            MenuOutcome::Dismissed => {
                self.close_modal();
                DesktopAction::Redraw
            }
            MenuOutcome::Chosen(i) => {
                let modal = *modal;
                self.close_modal();
                self.choose(modal, i)
            }
        }
    }

    fn choose(&mut self, modal: Modal, item: usize) -> DesktopAction {
        match modal {
            Modal::Context { icon, .. } => match ContextItem::ALL.get(item) {
                Some(ContextItem::Open) => DesktopAction::Open(AppId::for_icon(icon)),
                Some(ContextItem::Properties) => DesktopAction::Open(AppId::Properties(icon)),
                Some(ContextItem::Move) => {
                    self.armed = Some(icon);
                    self.damage.add(self.icon_box(icon));
                    DesktopAction::Redraw
                }
                Some(ContextItem::Cancel) | None => DesktopAction::Redraw,
            },
            Modal::Start { .. } => match START_ITEMS.get(item) {
                Some((app, _)) => DesktopAction::Open(*app),
                None => DesktopAction::Redraw,
            },
        }
    }

    /// Close any open menu
    pub fn close_modal(&mut self) {
        if let Some(modal) = self.modal.take() {
            self.damage.add(modal.menu().rect());
            if matches!(modal, Modal::Start { .. }) {
                self.damage.add(start_button(self.screen));
            }
        }
    }

    fn open_modal(&mut self, modal: Modal) {
        self.close_modal();
        self.damage.add(modal.menu().rect());
        if matches!(modal, Modal::Start { .. }) {
            self.damage.add(start_button(self.screen));
        }
        self.modal = Some(modal);
    }

    fn select(&mut self, id: Option<IconId>) -> bool {
        if id == self.selected {
            return false;
        }
        for icon in [self.selected, id].into_iter().flatten() {
            self.damage.add(self.icon_box(icon));
        }
        self.selected = id;
        true
    }

    fn on_press(&mut self, p: Point, now_ms: u32) -> DesktopAction {
        let armed = self.armed.take();
        if let Some(icon) = armed {
            self.damage.add(self.icon_box(icon));
        }
        self.press = None;

        let button = start_button(self.screen);
        if button.contains(p) {
            self.open_modal(Modal::Start {
                menu: PopupMenu::start(button, self.screen, p),
            });
            return DesktopAction::Redraw;
        }

        let Some((icon, on_body)) = self.hit_test(p) else {
            return if self.select(None) {
                DesktopAction::Redraw
            } else {
                DesktopAction::None
            };
        };

        let latched = armed == Some(icon);
        let token = if latched {
            self.drag.begin_latched(p, now_ms)
        } else {
            self.drag.begin(p, now_ms)
        };
        self.press = Some(IconPress {
            icon,
            token,
            grab: p - self.icons.position(icon),
            movable: on_body || latched,
        });

        if self.select(Some(icon)) {
            DesktopAction::Redraw
        } else {
            DesktopAction::None
        }
    }

    fn on_held(&mut self, p: Point, now_ms: u32) -> DesktopAction {
        let Some(press) = self.press.as_mut() else {
            return DesktopAction::None;
        };
        let gesture = self.drag.update(&mut press.token, p, now_ms);
        let press = *press;

        match gesture {
            Gesture::LongHold => {
                // The menu owns the rest of this gesture
                self.press = None;
                self.open_modal(Modal::Context {
                    menu: PopupMenu::context(p, self.screen),
                    icon: press.icon,
                });
                DesktopAction::Redraw
            }
            Gesture::DragMove { .. } if press.movable => {
                self.move_icon(press.icon, p - press.grab);
                self.set_hover(press.icon.trash_bit().is_some() && self.trash_box().contains(p));
                DesktopAction::Redraw
            }
            _ => DesktopAction::None,
        }
    }

    fn on_release(&mut self, now_ms: u32) -> DesktopAction {
        let Some(press) = self.press.take() else {
            return DesktopAction::None;
        };
        self.set_hover(false);

        if press.movable && press.token.is_dragging() {
            let drag = self.drag;
            if drag.drop_on(&press.token, press.icon, self).is_some() {
                #[cfg(feature = "defmt")]
                defmt::info!("icon {:?} moved to trash", press.icon);
            }
            return DesktopAction::Redraw;
        }

        match self.drag.end(press.token, now_ms) {
            Gesture::Tap => DesktopAction::Open(AppId::for_icon(press.icon)),
            _ => DesktopAction::None,
        }
    }

    fn move_icon(&mut self, id: IconId, pos: Point) {
        let old = self.icon_box(id);
        let wanted = icons::footprint(pos);
        let placed = clamp_position(wanted, self.icon_area());
        self.icons
            .set_position(id, pos + (placed.top_left() - wanted.top_left()));
        self.damage.add_change(Some(old), Some(self.icon_box(id)));
    }

    fn set_hover(&mut self, hover: bool) {
        if hover != self.hover_trash {
            self.hover_trash = hover;
            self.damage.add(self.trash_box());
        }
    }
}

impl DropZones for Desktop {
    type Target = IconId;
    type Zone = IconId;

    fn zone_at(&self, target: IconId, pos: Point) -> Option<IconId> {
        (target.trash_bit().is_some() && self.trash_box().contains(pos)).then_some(IconId::Trash)
    }

    fn on_drop(&mut self, target: IconId, _zone: IconId) -> bool {
        if !self.trash.delete(target) {
            return false;
        }
        // Restored icons come back at their factory spot
        self.damage.add(self.icon_box(target));
        self.icons.set_position(target, target.default_position());
        self.damage.add(self.trash_box());
        if self.selected == Some(target) {
            self.selected = None;
        }
        self.trash_changed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Desktop {
        Desktop::new(&GestureConfig::default(), &DisplayConfig::default())
    }

    fn tap(d: &mut Desktop, x: i32, y: i32, now: u32) -> DesktopAction {
        d.handle(TouchEvent::press(x, y), now);
        d.handle(TouchEvent::release(x, y), now + 50)
    }

    #[test]
    fn test_tap_opens_application() {
        let mut d = desktop();
        assert_eq!(tap(&mut d, 30, 110, 0), DesktopAction::Open(AppId::Paint));
        assert_eq!(d.selected(), Some(IconId::Paint));
        assert!(!d.damage_mut().is_empty());
    }

    #[test]
    fn test_press_on_empty_desktop_deselects() {
        let mut d = desktop();
        d.handle(TouchEvent::press(30, 50), 0);
        assert_eq!(d.selected(), Some(IconId::Chat));
        d.handle(TouchEvent::release(30, 50), 10);
        assert_eq!(d.handle(TouchEvent::press(250, 50), 20), DesktopAction::Redraw);
        assert_eq!(d.selected(), None);
        assert_eq!(d.handle(TouchEvent::press(250, 50), 30), DesktopAction::None);
    }

    #[test]
    fn test_body_wins_over_neighbour_label() {
        let d = desktop();
        // Paint's label slot reaches under the trash image
        assert_eq!(d.hit_test(Point::new(40, 165)), Some((IconId::Trash, true)));
        assert_eq!(d.hit_test(Point::new(130, 150)), Some((IconId::Notes, false)));
        assert_eq!(d.hit_test(Point::new(250, 50)), None);
    }

    #[test]
    fn test_long_hold_opens_context_menu() {
        let mut d = desktop();
        d.handle(TouchEvent::press(30, 110), 0);
        assert_eq!(d.handle(TouchEvent::held(31, 110), 200), DesktopAction::None);
        assert_eq!(d.handle(TouchEvent::held(31, 111), 380), DesktopAction::Redraw);
        let (icon, menu) = d.context_menu().unwrap();
        assert_eq!(icon, IconId::Paint);
        assert_eq!(menu.rect().top_left(), Point::new(31, 111));

        // Lifting the finger keeps the menu up
        assert_eq!(d.handle_modal(TouchEvent::release(31, 111)), DesktopAction::None);
        assert!(d.modal_visible());

        // Properties is the third item
        let item = menu_item(&d, 2);
        d.handle_modal(TouchEvent::press(item.x, item.y));
        assert_eq!(
            d.handle_modal(TouchEvent::release(item.x, item.y)),
            DesktopAction::Open(AppId::Properties(IconId::Paint))
        );
        assert!(!d.modal_visible());
    }

    fn menu_item(d: &Desktop, i: usize) -> Point {
        let menu = d.context_menu().map(|(_, m)| *m).or(d.start_menu().copied()).unwrap();
        menu.item_rect(i).center()
    }

    #[test]
    fn test_move_item_arms_latched_drag() {
        let mut d = desktop();
        d.handle(TouchEvent::press(100, 50), 0);
        d.handle(TouchEvent::held(100, 50), 400);
        let item = menu_item(&d, 1);
        d.handle_modal(TouchEvent::held(item.x, item.y));
        assert_eq!(d.handle_modal(TouchEvent::release(item.x, item.y)), DesktopAction::Redraw);
        assert_eq!(d.armed(), Some(IconId::Internet));

        // One pixel is enough to move an armed icon
        d.handle(TouchEvent::press(100, 50), 1000);
        d.handle(TouchEvent::held(101, 50), 1010);
        assert_eq!(d.icon_position(IconId::Internet), Point::new(91, 40));
        assert_eq!(d.handle(TouchEvent::release(101, 50), 1020), DesktopAction::Redraw);
        assert_eq!(d.armed(), None);
    }

    #[test]
    fn test_drag_to_trash_deletes_icon() {
        let mut d = desktop();
        d.handle(TouchEvent::press(30, 50), 0);
        d.handle(TouchEvent::held(40, 80), 10);
        assert!(!d.is_hovering_trash());
        d.handle(TouchEvent::held(44, 180), 20);
        assert!(d.is_hovering_trash());
        assert_eq!(d.handle(TouchEvent::release(44, 180), 30), DesktopAction::Redraw);

        assert!(!d.is_hovering_trash());
        assert!(d.trash().is_deleted(IconId::Chat));
        assert_eq!(d.selected(), None);
        assert_eq!(d.take_trash_changed(), Some(d.trash()));
        assert_eq!(d.take_trash_changed(), None);
        assert_eq!(d.hit_test(Point::new(30, 50)), None);

        assert!(d.restore(IconId::Chat));
        assert_eq!(d.icon_position(IconId::Chat), IconId::Chat.default_position());
        assert_eq!(d.hit_test(Point::new(30, 50)), Some((IconId::Chat, true)));
    }

    #[test]
    fn test_trash_is_not_its_own_drop_zone() {
        let mut d = desktop();
        d.handle(TouchEvent::press(40, 170), 0);
        d.handle(TouchEvent::held(60, 170), 10);
        assert!(!d.is_hovering_trash());
        d.handle(TouchEvent::release(60, 170), 20);
        assert!(d.trash().is_empty());
        assert_eq!(d.icon_position(IconId::Trash).x, 44);
    }

    #[test]
    fn test_label_press_does_not_drag() {
        let mut d = desktop();
        let before = d.icon_position(IconId::Notes);
        d.handle(TouchEvent::press(130, 150), 0);
        d.handle(TouchEvent::held(160, 150), 10);
        assert_eq!(d.handle(TouchEvent::release(160, 150), 20), DesktopAction::None);
        assert_eq!(d.icon_position(IconId::Notes), before);
        assert_eq!(tap(&mut d, 130, 150, 100), DesktopAction::Open(AppId::Notes));
    }

    #[test]
    fn test_drag_is_clamped_to_icon_area() {
        let mut d = desktop();
        d.handle(TouchEvent::press(100, 50), 0);
        d.handle(TouchEvent::held(-200, -200), 10);
        let fp = icons::footprint(d.icon_position(IconId::Internet));
        assert_eq!(fp.top_left(), Point::new(0, 0));

        d.handle(TouchEvent::held(900, 900), 20);
        let fp = icons::footprint(d.icon_position(IconId::Internet));
        assert!(d.icon_area().contains_rect(&fp));
        assert_eq!(fp.right(), 320);
        assert_eq!(fp.bottom(), 220);
    }

    #[test]
    fn test_start_menu() {
        let mut d = desktop();
        assert_eq!(d.handle(TouchEvent::press(10, 230), 0), DesktopAction::Redraw);
        assert!(d.start_menu().is_some());
        assert_eq!(d.handle_modal(TouchEvent::release(10, 230)), DesktopAction::None);

        let item = menu_item(&d, 1);
        d.handle_modal(TouchEvent::press(item.x, item.y));
        assert_eq!(
            d.handle_modal(TouchEvent::release(item.x, item.y)),
            DesktopAction::Open(AppId::Paint)
        );
        assert!(!d.modal_visible());

        // Pressing the start button again while open closes the menu
        d.handle(TouchEvent::press(10, 230), 100);
        d.handle_modal(TouchEvent::release(10, 230));
        assert_eq!(d.handle_modal(TouchEvent::press(10, 230)), DesktopAction::Redraw);
        assert!(!d.modal_visible());
    }

    #[test]
    fn test_status_refresh_is_throttled() {
        let mut d = desktop();
        let s = |minute| StatusInfo {
            hour: 12,
            minute,
            wifi_connected: true,
        };
        assert!(d.update_status(s(30), 0));
        d.damage_mut().clear();
        assert!(!d.update_status(s(31), 500));
        assert!(d.damage_mut().is_empty());
        assert!(d.update_status(s(31), 900));
        let area = status_area(d.screen());
        assert_eq!(d.damage_mut().rects(), [area]);
        assert!(!d.update_status(s(31), 2000));
    }

    #[test]
    fn test_cursor_damage() {
        let mut d = desktop();
        d.set_cursor(Some(Point::new(100, 100)));
        d.set_cursor(Some(Point::new(200, 100)));
        assert_eq!(
            d.damage_mut().rects(),
            [Rect::new(97, 97, 7, 7), Rect::new(197, 97, 7, 7)]
        );
    }
}
