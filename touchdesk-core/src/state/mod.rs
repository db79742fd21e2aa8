//! Focus state machine
//!
//! Exactly one of the desktop or a single application owns the screen and
//! the non-modal input layers at any time.

pub mod events;
pub mod machine;

pub use events::FocusEvent;
pub use machine::{AppId, Focus};
