//! Configuration types
//!
//! Every tunable threshold of the shell and its default. Loaded from
//! TOML by the shell crate.

pub mod types;

pub use types::*;
