//! Events that move focus

use super::machine::AppId;

/// Events that can trigger focus transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FocusEvent {
    /// Icon tap, context menu `Open` or a start menu item
    Open(AppId),
    /// The focused application closed itself
    Close,
}

impl FocusEvent {
    /// Application this event opens, if any
    pub fn opens(&self) -> Option<AppId> {
        match self {
            FocusEvent::Open(app) => Some(*app),
            FocusEvent::Close => None,
        }
    }
}
