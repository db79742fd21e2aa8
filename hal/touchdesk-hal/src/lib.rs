//! Touchdesk Hardware Abstraction Layer
//!
//! This crate defines the hardware-facing traits the shell talks to. Board
//! support code implements them; everything above runs headless on the host
//! against the in-memory implementations provided here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  touchdesk-shell (apps, polling loop)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  touchdesk-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ touch panel   │       │  NVS / flash  │
//! │  (I2C bus)    │       │   key-value   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`storage::KeyValueStore`] - Persistent namespaced key/value storage
//! - [`clock::Clock`] - Monotonic millisecond clock

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod clock;
pub mod i2c;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use clock::{Clock, ManualClock};
pub use i2c::{EhI2c, I2cBus};
pub use storage::{KeyValueStore, KeyValueStoreExt, MemoryStore, StorageError};
