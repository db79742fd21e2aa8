//! Full-screen applications
//!
//! Each application is one owned struct, built once when the shell starts
//! and kept for the life of the shell. The shell hands the focused one
//! every routed event together with an [`Env`] of the collaborators it may
//! touch; state changes are recorded as pending redraw and painted later
//! in the same tick by [`App::flush`].

pub mod chat;
pub mod internet;
pub mod notes;
pub mod paint;
pub mod properties;
pub mod settings;
pub mod trash;
pub mod wifi;

use touchdesk_core::desktop::{Desktop, StatusInfo};
use touchdesk_core::input::{Response, TouchEvent};
use touchdesk_core::keyboard::{KeyAction, OnScreenKeyboard};
use touchdesk_core::traits::{ChatBackend, WifiDriver};
use touchdesk_display::{DrawSurface, Rect};
use touchdesk_hal::KeyValueStore;

use crate::settings::Settings;
use crate::ui;

pub use chat::ChatApp;
pub use internet::InternetApp;
pub use notes::NotesApp;
pub use paint::PaintApp;
pub use properties::PropertiesApp;
pub use settings::SettingsApp;
pub use trash::TrashApp;
pub use wifi::WifiApp;

/// Why an application refused to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError {
    /// A buffer the application needs could not be allocated
    OutOfMemory,
}

/// Collaborators lent to an application for one call
pub struct Env<'a> {
    /// Tick timestamp
    pub now_ms: u32,
    /// What the status strip shows this tick
    pub status: StatusInfo,
    pub store: &'a mut dyn KeyValueStore,
    pub wifi: &'a mut dyn WifiDriver,
    pub chat: &'a mut dyn ChatBackend,
    pub desktop: &'a mut Desktop,
    pub settings: &'a mut Settings,
}

/// A full-screen application
pub trait App {
    /// Called when the application gains focus
    fn open(&mut self, _env: &mut Env<'_>) -> Result<(), OpenError> {
        Ok(())
    }

    /// Called when focus returns to the desktop
    fn close(&mut self, _env: &mut Env<'_>) {}

    /// Handle an event routed to the application layer
    fn handle(&mut self, event: TouchEvent, env: &mut Env<'_>) -> Response;

    /// The keyboard changed its text or layout
    fn key_changed(&mut self, _action: KeyAction, _env: &mut Env<'_>) {}

    /// Once per tick while focused
    fn tick(&mut self, _env: &mut Env<'_>) {}

    /// Paint the whole screen
    fn draw(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>);

    /// Paint what changed since the last draw; false if nothing was pending
    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool;

    /// Where the status strip sits, if the application shows one
    fn status_slot(&self, screen: Rect) -> Option<Rect> {
        Some(ui::status_rect(screen))
    }

    fn keyboard(&self) -> Option<&OnScreenKeyboard> {
        None
    }

    fn keyboard_mut(&mut self) -> Option<&mut OnScreenKeyboard> {
        None
    }
}

/// Drag-to-scroll by whole lines
///
/// Finger movement accumulates until it amounts to a full line height;
/// dragging down moves towards the start of the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragScroll {
    last_y: Option<i32>,
    accum: i32,
}

impl DragScroll {
    pub fn press(&mut self, y: i32) {
        self.last_y = Some(y);
        self.accum = 0;
    }

    pub fn is_active(&self) -> bool {
        self.last_y.is_some()
    }

    /// New first visible line after the finger moved to `y`
    pub fn held(&mut self, y: i32, line_h: i32, first: usize, max_first: usize) -> usize {
        let Some(last) = self.last_y else {
            return first;
        };
        self.last_y = Some(y);
        self.accum += y - last;
        let steps = self.accum / line_h;
        if steps == 0 {
            return first;
        }
        self.accum -= steps * line_h;
        (first as i32 - steps).clamp(0, max_first as i32) as usize
    }

    pub fn release(&mut self) {
        self.last_y = None;
        self.accum = 0;
    }
}

#[cfg(test)]
pub(crate) mod testing;
