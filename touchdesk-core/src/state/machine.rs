//! Focus states and transitions

use super::events::FocusEvent;
use crate::desktop::IconId;

/// Applications the shell can bring to the front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppId {
    Chat,
    Paint,
    Notes,
    Internet,
    Settings,
    Trash,
    Wifi,
    /// Properties panel for one desktop icon
    Properties(IconId),
}

impl AppId {
    /// Application launched by a desktop icon
    pub fn for_icon(icon: IconId) -> Self {
        match icon {
            IconId::Chat => AppId::Chat,
            IconId::Paint => AppId::Paint,
            IconId::Trash => AppId::Trash,
            IconId::Internet => AppId::Internet,
            IconId::Notes => AppId::Notes,
            IconId::Wifi => AppId::Wifi,
        }
    }

    /// Whether this application shows the on-screen keyboard
    pub fn uses_keyboard(&self) -> bool {
        matches!(self, AppId::Chat | AppId::Notes | AppId::Wifi)
    }
}

/// Who owns the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Focus {
    /// Desktop icons, taskbar and menus
    #[default]
    Desktop,
    /// A single full-screen application
    App(AppId),
}

impl Focus {
    /// The focused application, if any
    pub fn app(&self) -> Option<AppId> {
        match self {
            Focus::App(app) => Some(*app),
            Focus::Desktop => None,
        }
    }

    pub fn is_desktop(&self) -> bool {
        matches!(self, Focus::Desktop)
    }

    /// Process an event and return the next focus
    pub fn transition(self, event: FocusEvent) -> Self {
        use FocusEvent::*;
        use Focus::*;

        match (self, event) {
            (Desktop, Open(app)) => App(app),
            (App(_), Close) => Desktop,

            // One application at a time; opening another is ignored
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_close() {
        let focus = Focus::default();
        let chat = focus.transition(FocusEvent::Open(AppId::Chat));
        assert_eq!(chat, Focus::App(AppId::Chat));
        assert_eq!(chat.transition(FocusEvent::Close), Focus::Desktop);
    }

    #[test]
    fn test_ignored_events() {
        assert_eq!(Focus::Desktop.transition(FocusEvent::Close), Focus::Desktop);
        let paint = Focus::App(AppId::Paint);
        assert_eq!(paint.transition(FocusEvent::Open(AppId::Notes)), paint);
    }

    #[test]
    fn test_icon_apps() {
        assert_eq!(AppId::for_icon(IconId::Chat), AppId::Chat);
        assert_eq!(AppId::for_icon(IconId::Wifi), AppId::Wifi);
        assert!(AppId::Notes.uses_keyboard());
        assert!(!AppId::Paint.uses_keyboard());
        assert!(!AppId::Properties(IconId::Paint).uses_keyboard());
    }
}
