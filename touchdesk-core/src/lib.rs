//! Board-agnostic core of the touch desktop shell
//!
//! This crate contains all interaction logic that does not depend on
//! specific hardware:
//!
//! - Touch edge detection and the z-ordered gesture router
//! - Tap / long-hold / drag disambiguation
//! - On-screen keyboard layout, hit-testing and key repeat
//! - Paint canvas and tool state machine
//! - Desktop icons, menus and the damage-redraw compositor
//! - Focus state machine
//! - Configuration type definitions
//!
//! Every component is driven once per tick with a level-triggered touch
//! sample and a millisecond timestamp, and reports the rectangles it
//! damaged instead of repainting the whole screen.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod damage;
pub mod desktop;
pub mod input;
pub mod keyboard;
pub mod paint;
pub mod state;
pub mod text;
pub mod traits;
