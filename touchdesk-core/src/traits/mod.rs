//! Collaborator traits
//!
//! These traits are implemented by board support code (or by host
//! simulations) and consumed by the shell.

pub mod net;
pub mod touch;

pub use net::{ChatBackend, LinkStatus, NetworkInfo, ScanPoll, ScanStart, WifiDriver};
pub use touch::{TouchSample, TouchSource};
