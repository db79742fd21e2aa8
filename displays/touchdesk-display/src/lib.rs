//! Draw-surface abstraction and shared rendering pieces for Touchdesk
//!
//! This crate provides:
//! - `Rect` geometry with the union/intersection/clamp math damage tracking needs
//! - `DrawSurface` trait: the stateless pixel capability every component draws through
//! - `DrawSurfaceExt` helpers for common widgets (buttons, frames, centred labels)
//! - `EgSurface`, a `DrawSurface` over any `embedded-graphics` RGB565 draw target
//! - `Framebuffer`, an in-memory draw target used on the host and in tests
//!
//! # Architecture
//!
//! Components never keep a framebuffer of their own. They compute which
//! rectangle changed and ask the surface to repaint exactly that area,
//! optionally with a clip so overlapping layers can be recomposited
//! back-to-front without touching pixels outside the damage.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod color;
pub mod eg;
pub mod font;
pub mod framebuffer;
pub mod geometry;
pub mod surface;

// Re-export key types
pub use color::Rgb565;
pub use eg::EgSurface;
pub use font::Font;
pub use framebuffer::Framebuffer;
pub use geometry::{Point, Rect};
pub use surface::{DisplayError, DrawSurface, DrawSurfaceExt};

/// Default panel width in pixels
pub const SCREEN_WIDTH: i32 = 320;

/// Default panel height in pixels
pub const SCREEN_HEIGHT: i32 = 240;
