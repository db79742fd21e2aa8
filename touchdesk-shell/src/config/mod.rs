//! Configuration loading
//!
//! The shell reads a TOML file from the key/value store if one was
//! provisioned there, otherwise it uses the copy embedded at build time.

pub mod loader;

pub use loader::{load_config, load_from_store, load_or_default, ConfigError, DEFAULT_CONFIG};
