//! Mock collaborators shared by the application and shell tests

extern crate std;

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use touchdesk_core::config::ShellConfig;
use touchdesk_core::desktop::{Desktop, StatusInfo};
use touchdesk_core::traits::net::MAX_SSID_LEN;
use touchdesk_core::traits::{ChatBackend, LinkStatus, NetworkInfo, ScanPoll, ScanStart, WifiDriver};
use touchdesk_display::color::palette;
use touchdesk_display::{EgSurface, Framebuffer};
use touchdesk_hal::MemoryStore;

use super::Env;
use crate::settings::Settings;

/// Scripted wifi driver
#[derive(Debug, Default)]
pub struct MockWifi {
    /// Answers to `scan_async`, `Started` once exhausted
    pub starts: VecDeque<ScanStart>,
    /// Answers to `poll_scan`, `Running` once exhausted
    pub polls: VecDeque<ScanPoll>,
    pub scan_calls: usize,
    pub poll_calls: usize,
    pub connects: Vec<(String, String)>,
    pub link: LinkStatus,
    /// Status a `connect` call moves to
    pub connect_outcome: LinkStatus,
    pub ssid: Option<String>,
}

impl MockWifi {
    pub fn new() -> Self {
        Self {
            connect_outcome: LinkStatus::Connected,
            ..Self::default()
        }
    }

    pub fn done(networks: &[(&str, i8, bool)]) -> ScanPoll {
        let mut list = heapless::Vec::new();
        for &(ssid, rssi, open) in networks {
            let _ = list.push(NetworkInfo::new(ssid, rssi, open));
        }
        ScanPoll::Done(list)
    }
}

impl WifiDriver for MockWifi {
    fn scan_async(&mut self) -> ScanStart {
        self.scan_calls += 1;
        self.starts.pop_front().unwrap_or(ScanStart::Started)
    }

    fn poll_scan(&mut self) -> ScanPoll {
        self.poll_calls += 1;
        self.polls.pop_front().unwrap_or(ScanPoll::Running)
    }

    fn connect(&mut self, ssid: &str, password: &str) {
        self.connects.push((ssid.into(), password.into()));
        self.link = self.connect_outcome;
        if self.link == LinkStatus::Connected {
            self.ssid = Some(ssid.into());
        }
    }

    fn status(&self) -> LinkStatus {
        self.link
    }

    fn connected_ssid(&self) -> Option<heapless::String<MAX_SSID_LEN>> {
        let ssid = self.ssid.as_ref()?;
        let mut out = heapless::String::new();
        out.push_str(ssid).ok()?;
        Some(out)
    }
}

/// Chat backend answering every prompt with the same reply
#[derive(Debug)]
pub struct MockChat {
    pub reply: String,
    pub prompts: Vec<String>,
}

impl MockChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.into(),
            prompts: Vec::new(),
        }
    }
}

impl ChatBackend for MockChat {
    fn send(&mut self, prompt: &str) -> alloc::string::String {
        self.prompts.push(prompt.into());
        self.reply.clone()
    }
}

/// Everything an application borrows, owned in one place
pub struct Fixture {
    pub store: MemoryStore,
    pub wifi: MockWifi,
    pub chat: MockChat,
    pub desktop: Desktop,
    pub settings: Settings,
}

impl Fixture {
    pub fn new() -> Self {
        let config = ShellConfig::default();
        Self {
            store: MemoryStore::new(),
            wifi: MockWifi::new(),
            chat: MockChat::replying("Hello!"),
            desktop: Desktop::new(&config.gesture, &config.display),
            settings: Settings::default(),
        }
    }

    pub fn env(&mut self, now_ms: u32) -> Env<'_> {
        Env {
            now_ms,
            status: StatusInfo::default(),
            store: &mut self.store,
            wifi: &mut self.wifi,
            chat: &mut self.chat,
            desktop: &mut self.desktop,
            settings: &mut self.settings,
        }
    }
}

/// Blank 320×240 test surface
pub fn surface() -> EgSurface<Framebuffer> {
    EgSurface::new(Framebuffer::new(320, 240, palette::BLACK))
}
