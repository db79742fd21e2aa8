//! Configuration parsing
//!
//! Parses a `ShellConfig` from TOML. A provisioned file in the key/value
//! store wins over the embedded default; anything unreadable falls back so
//! the shell always boots.

use core::str;

#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};

use touchdesk_core::config::ShellConfig;
use touchdesk_hal::{KeyValueStore, StorageError};

/// Configuration compiled into the image
pub const DEFAULT_CONFIG: &str = include_str!("../../shell.toml");

/// Store namespace of a provisioned configuration file
pub const CONFIG_NAMESPACE: &str = "config";

/// Store key of a provisioned configuration file
pub const CONFIG_KEY: &str = "toml";

/// Maximum TOML config size
const MAX_TOML_SIZE: usize = 2048;

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Store read failed
    Storage(StorageError),
    /// TOML parsing or deserialization failed
    TomlParse,
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Storage(e)
    }
}

/// Parse and sanitize a TOML configuration
///
/// Missing tables and keys take their defaults.
pub fn load_config(text: &str) -> Result<ShellConfig, ConfigError> {
    let config: ShellConfig = toml::from_str(text).map_err(|_e| {
        #[cfg(feature = "defmt")]
        warn!("TOML parse error: {}", defmt::Display2Format(&_e));
        ConfigError::TomlParse
    })?;
    let config = config.sanitized();
    log_config_summary(&config);
    Ok(config)
}

/// Parse `text`, falling back to the built-in defaults
pub fn load_or_default(text: &str) -> ShellConfig {
    match load_config(text) {
        Ok(config) => config,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            warn!("Config unusable ({:?}), using defaults", _e);
            ShellConfig::default()
        }
    }
}

/// Load the provisioned configuration, or the embedded one
pub fn load_from_store(store: &mut dyn KeyValueStore) -> ShellConfig {
    match read_stored(store) {
        Ok(config) => {
            #[cfg(feature = "defmt")]
            info!("Loaded configuration from store");
            config
        }
        Err(ConfigError::Storage(StorageError::NotFound)) => {
            #[cfg(feature = "defmt")]
            debug!("No stored config, using embedded default");
            load_or_default(DEFAULT_CONFIG)
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            warn!("Stored config rejected: {:?}, using embedded default", _e);
            load_or_default(DEFAULT_CONFIG)
        }
    }
}

fn read_stored(store: &mut dyn KeyValueStore) -> Result<ShellConfig, ConfigError> {
    let mut buffer = [0u8; MAX_TOML_SIZE];
    let len = store.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buffer)?;

    #[cfg(feature = "defmt")]
    debug!("Read {} bytes of TOML from store", len);

    let text = str::from_utf8(&buffer[..len]).map_err(|_| ConfigError::InvalidUtf8)?;
    load_config(text)
}

/// Log a summary of the loaded configuration
fn log_config_summary(_config: &ShellConfig) {
    #[cfg(feature = "defmt")]
    {
        info!("Configuration loaded");
        debug!(
            "  gesture: drag {} px, hold {} ms",
            _config.gesture.drag_threshold_px, _config.gesture.hold_ms
        );
        debug!(
            "  keyboard: repeat {}/{} ms, debounce {} ms",
            _config.keyboard.repeat_delay_ms,
            _config.keyboard.repeat_interval_ms,
            _config.keyboard.release_debounce_ms
        );
        debug!(
            "  display: {}x{}",
            _config.display.width, _config.display.height
        );
    }
}
