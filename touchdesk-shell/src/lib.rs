//! Touchdesk shell
//!
//! Composition root of the touch desktop:
//!
//! - [`Shell`]: the polling loop, focus and redraw scheduling
//! - Full-screen applications (chat, paint, notes, internet viewer,
//!   settings, trash, wifi, icon properties)
//! - Window chrome shared by the applications
//! - Persisted user settings and the manual wall clock
//! - TOML configuration with an embedded default
//!
//! Hardware is reached only through the `touchdesk-hal` and
//! `touchdesk-core` collaborator traits, so the whole shell runs headless
//! on the host against in-memory doubles.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod apps;
pub mod clock;
pub mod config;
pub mod settings;
pub mod shell;
pub mod ui;

pub use shell::Shell;
