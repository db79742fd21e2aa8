//! On-screen keyboard
//!
//! Reusable virtual keyboard for chat, notes and wifi password entry.

pub mod layout;
pub mod machine;
mod view;

pub use layout::{build_layout, hit_test, KeyKind, KeyRect, Layout, KB_Y, MAX_KEYS};
pub use machine::{KeyAction, OnScreenKeyboard};
