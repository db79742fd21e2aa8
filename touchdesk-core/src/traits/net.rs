//! Network collaborator traits
//!
//! Wifi scanning is fire-and-poll; the chat backend is a single blocking
//! call that always returns text, errors included.

use alloc::string::String;

/// Longest SSID the shell keeps
pub const MAX_SSID_LEN: usize = 32;

/// Most networks a single scan reports
pub const MAX_SCAN_RESULTS: usize = 16;

/// One access point from a scan
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkInfo {
    pub ssid: heapless::String<MAX_SSID_LEN>,
    /// Signal strength in dBm
    pub rssi: i8,
    /// Open network, no password needed
    pub auth_open: bool,
}

impl NetworkInfo {
    /// Build from a string slice, truncating long SSIDs
    pub fn new(ssid: &str, rssi: i8, auth_open: bool) -> Self {
        let mut s = heapless::String::new();
        for c in ssid.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        Self {
            ssid: s,
            rssi,
            auth_open,
        }
    }
}

/// Result of asking the driver to start a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanStart {
    Started,
    /// A scan is already running
    Busy,
    Error,
}

/// Result of polling a running scan
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanPoll {
    Running,
    Done(heapless::Vec<NetworkInfo, MAX_SCAN_RESULTS>),
    Failed,
}

/// Station link state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Failed,
}

/// Wifi station driver
pub trait WifiDriver {
    /// Start an asynchronous scan
    fn scan_async(&mut self) -> ScanStart;

    /// Poll the scan started by [`scan_async`](Self::scan_async)
    ///
    /// Must keep being called until it stops returning `Running` so the
    /// driver can release its scan resources.
    fn poll_scan(&mut self) -> ScanPoll;

    /// Begin connecting; progress is observed through [`status`](Self::status)
    fn connect(&mut self, ssid: &str, password: &str);

    /// Current link state
    fn status(&self) -> LinkStatus;

    /// SSID of the current association, if any
    fn connected_ssid(&self) -> Option<heapless::String<MAX_SSID_LEN>>;
}

/// Remote chat completion service
pub trait ChatBackend {
    /// Send a prompt and block until the reply arrives
    ///
    /// Failures come back as ordinary text such as `"401 Unauthorized"`.
    fn send(&mut self, prompt: &str) -> String;
}
