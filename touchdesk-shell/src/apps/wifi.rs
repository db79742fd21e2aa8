//! WiFi window
//!
//! List mode shows the last scan, strongest network first, and starts a
//! new scan on open and on Refresh. Connect mode asks for the password
//! with the on-screen keyboard.
//!
//! Scanning is fire-and-poll. A scan that fails to start, fails while
//! running or runs past the timeout is retried after a short backoff, a
//! bounded number of times. Closing the window does not abandon a running
//! scan: the driver must be polled until it finishes so it can release the
//! scan, so the shell keeps calling [`WifiApp::background`] and the
//! results of that scan are thrown away.
//!
//! Connecting is fire-and-forget; progress is read from the driver's link
//! status on every tick, focused or not, and the credentials are stored
//! once the link comes up.

use core::fmt::Write;

use heapless::{String, Vec};
use touchdesk_core::config::{ShellConfig, WifiConfig, KB_TEXT_MAX};
use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_core::keyboard::{KeyAction, OnScreenKeyboard};
use touchdesk_core::traits::net::{MAX_SCAN_RESULTS, MAX_SSID_LEN};
use touchdesk_core::traits::{LinkStatus, NetworkInfo, ScanPoll, ScanStart};
use touchdesk_display::color::palette;
use touchdesk_display::{DrawSurface, DrawSurfaceExt, Font, Point, Rect, Rgb565};
use touchdesk_hal::KeyValueStoreExt;

use super::{App, DragScroll, Env, OpenError};
use crate::ui;

pub const NAMESPACE: &str = "wifi";
pub const KEY_SSID: &str = "ssid";
pub const KEY_PASS: &str = "pass";

/// Networks kept from one scan
pub const MAX_NETWORKS: usize = 12;

const HEADER_FILL: Rgb565 = palette::NAVY;
const ROW_H: i32 = 20;
const BUTTON_W: i32 = 92;
const BUTTON_H: i32 = 20;

type StatusText = String<64>;
type Ssid = String<MAX_SSID_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    List,
    Connect,
}

/// Scan progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    Idle,
    Running { started_ms: u32 },
    /// Waiting out the backoff before the next attempt
    Backoff { since_ms: u32 },
}

#[derive(Debug, Clone)]
struct Pending {
    ssid: Ssid,
    password: String<KB_TEXT_MAX>,
    started_ms: u32,
}

// List mode
pub fn list_rect() -> Rect {
    Rect::new(4, ui::HEADER_H + 4, 312, 160)
}

pub fn refresh_button() -> Rect {
    Rect::new(4, 216, BUTTON_W, BUTTON_H)
}

pub fn connect_button() -> Rect {
    Rect::new(114, 216, BUTTON_W, BUTTON_H)
}

pub fn list_back_button() -> Rect {
    Rect::new(224, 216, BUTTON_W, BUTTON_H)
}

fn list_status_rect() -> Rect {
    Rect::new(4, 196, 312, 16)
}

// Connect mode; the keyboard sits below
fn ssid_rect() -> Rect {
    Rect::new(4, ui::HEADER_H + 4, 312, 20)
}

pub fn password_rect() -> Rect {
    Rect::new(4, 58, 246, 20)
}

pub fn see_button() -> Rect {
    Rect::new(256, 58, 60, 20)
}

pub fn ok_button() -> Rect {
    Rect::new(4, 84, BUTTON_W, BUTTON_H)
}

pub fn cancel_button() -> Rect {
    Rect::new(114, 84, BUTTON_W, BUTTON_H)
}

pub fn forget_button() -> Rect {
    Rect::new(224, 84, BUTTON_W, BUTTON_H)
}

fn connect_status_rect() -> Rect {
    Rect::new(4, 110, 312, 16)
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    full: bool,
    list: bool,
    status: bool,
    password: bool,
}

pub struct WifiApp {
    config: WifiConfig,
    screen: Rect,
    /// Password entry
    keyboard: OnScreenKeyboard,
    mode: Mode,
    networks: Vec<NetworkInfo, MAX_NETWORKS>,
    selected: Option<usize>,
    scroll: usize,
    drag: DragScroll,

    scan: ScanState,
    /// Attempts made since the last successful scan, not counting the first
    retries: u8,
    /// The running scan was started by a window that has since closed
    abort_on_next_poll: bool,

    pending: Option<Pending>,
    saved_ssid: Ssid,
    show_password: bool,
    status: StatusText,
    dirty: Dirty,
}

impl WifiApp {
    pub fn new(config: &ShellConfig, screen: Rect) -> Self {
        let mut keyboard = OnScreenKeyboard::new(config.keyboard, screen);
        keyboard.set_visible(false);
        Self {
            config: config.wifi,
            screen,
            keyboard,
            mode: Mode::List,
            networks: Vec::new(),
            selected: None,
            scroll: 0,
            drag: DragScroll::default(),
            scan: ScanState::Idle,
            retries: 0,
            abort_on_next_poll: false,
            pending: None,
            saved_ssid: String::new(),
            show_password: false,
            status: String::new(),
            dirty: Dirty::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn networks(&self) -> &[NetworkInfo] {
        &self.networks
    }

    pub fn selected(&self) -> Option<&NetworkInfo> {
        self.selected.and_then(|i| self.networks.get(i))
    }

    pub fn scan_state(&self) -> ScanState {
        self.scan
    }

    pub fn is_connecting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn status_text(&self) -> &str {
        &self.status
    }

    /// A scan started before the window closed still needs polling
    pub fn is_draining(&self) -> bool {
        self.abort_on_next_poll && matches!(self.scan, ScanState::Running { .. })
    }

    fn set_status(&mut self, text: &str) {
        self.status.clear();
        for c in text.chars() {
            if self.status.push(c).is_err() {
                break;
            }
        }
        self.dirty.status = true;
    }

    fn link_summary(&mut self, env: &Env<'_>) {
        let mut text = StatusText::new();
        if env.wifi.status() == LinkStatus::Connected {
            let ssid = env.wifi.connected_ssid().unwrap_or_default();
            let _ = write!(text, "Connected  {}", ssid);
        } else if !self.saved_ssid.is_empty() {
            let _ = write!(text, "Not connected (saved: {})", self.saved_ssid);
        } else {
            let _ = text.push_str("Not connected");
        }
        self.set_status(&text);
    }

    // Scanning

    fn start_scan(&mut self, env: &mut Env<'_>) {
        if self.pending.is_some() {
            self.set_status("Busy connecting...");
            return;
        }
        match env.wifi.scan_async() {
            ScanStart::Started | ScanStart::Busy => {
                #[cfg(feature = "defmt")]
                defmt::debug!("wifi: scan started (attempt {})", self.retries + 1);
                self.scan = ScanState::Running {
                    started_ms: env.now_ms,
                };
                self.set_status("Scanning...");
            }
            ScanStart::Error => self.retry(env.now_ms, "Scan start failed, retrying..."),
        }
    }

    fn retry(&mut self, now_ms: u32, message: &str) {
        if self.retries >= self.config.max_retries {
            #[cfg(feature = "defmt")]
            defmt::warn!("wifi: scan gave up after {} retries", self.retries);
            self.scan = ScanState::Idle;
            self.retries = 0;
            self.set_status("Scan failed");
            return;
        }
        self.retries += 1;
        self.scan = ScanState::Backoff { since_ms: now_ms };
        self.set_status(message);
    }

    /// Advance the scan while the window is focused
    fn poll_scan(&mut self, env: &mut Env<'_>) {
        match self.scan {
            ScanState::Idle => {}
            ScanState::Backoff { since_ms } => {
                if self.pending.is_none()
                    && env.now_ms.wrapping_sub(since_ms) >= self.config.retry_backoff_ms
                {
                    self.start_scan(env);
                }
            }
            ScanState::Running { started_ms } => match env.wifi.poll_scan() {
                ScanPoll::Running => {
                    if env.now_ms.wrapping_sub(started_ms) > self.config.scan_timeout_ms {
                        self.retry(env.now_ms, "Scan timeout, retrying...");
                    }
                }
                ScanPoll::Failed => self.retry(env.now_ms, "Scan failed, retrying..."),
                ScanPoll::Done(found) => {
                    self.scan = ScanState::Idle;
                    if core::mem::take(&mut self.abort_on_next_poll) {
                        return;
                    }
                    self.harvest(found, env);
                }
            },
        }
    }

    /// Keep the strongest networks with a usable name, strongest first
    fn harvest(&mut self, found: Vec<NetworkInfo, MAX_SCAN_RESULTS>, env: &Env<'_>) {
        let mut sorted: Vec<NetworkInfo, MAX_SCAN_RESULTS> = found
            .into_iter()
            .filter(|n| !n.ssid.trim().is_empty())
            .collect();
        sorted.sort_unstable_by(|a, b| b.rssi.cmp(&a.rssi).then_with(|| a.ssid.cmp(&b.ssid)));

        self.networks.clear();
        for n in sorted.into_iter().take(MAX_NETWORKS) {
            let _ = self.networks.push(n);
        }
        self.retries = 0;
        self.scroll = 0;

        let prefer = match env.wifi.connected_ssid() {
            Some(ssid) if env.wifi.status() == LinkStatus::Connected => ssid,
            _ => self.saved_ssid.clone(),
        };
        self.selected = if prefer.is_empty() {
            None
        } else {
            self.networks.iter().position(|n| n.ssid == prefer)
        };

        #[cfg(feature = "defmt")]
        defmt::info!("wifi: scan found {} networks", self.networks.len());
        let mut text = StatusText::new();
        if self.networks.is_empty() {
            let _ = text.push_str("No networks found");
        } else {
            let _ = write!(text, "Found {} networks", self.networks.len());
        }
        self.set_status(&text);
        self.dirty.list = true;
    }

    // Connecting

    fn connect(&mut self, env: &mut Env<'_>, password: &str) {
        let Some(net) = self.selected().cloned() else {
            self.set_status("Select a network first");
            return;
        };
        if !net.auth_open && password.is_empty() {
            self.set_status("Password required");
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("wifi: connecting to {}", net.ssid.as_str());
        env.wifi.connect(&net.ssid, password);
        let mut pass = String::new();
        let _ = pass.push_str(password);
        self.pending = Some(Pending {
            ssid: net.ssid,
            password: pass,
            started_ms: env.now_ms,
        });
        self.set_status("Connecting...");
    }

    fn poll_connect(&mut self, env: &mut Env<'_>) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };
        let outcome = match env.wifi.status() {
            LinkStatus::Connected => {
                let ok = env.store.set_str(NAMESPACE, KEY_SSID, &pending.ssid)
                    & env.store.set_str(NAMESPACE, KEY_PASS, &pending.password);
                if !ok {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("wifi: credentials not saved");
                }
                self.saved_ssid = pending.ssid.clone();
                #[cfg(feature = "defmt")]
                defmt::info!("wifi: connected to {}", pending.ssid.as_str());
                "Connected. Saved"
            }
            LinkStatus::Failed => "Connection failed",
            LinkStatus::Idle | LinkStatus::Connecting => {
                if env.now_ms.wrapping_sub(pending.started_ms) <= self.config.connect_timeout_ms {
                    return;
                }
                "Connection timed out"
            }
        };
        self.pending = None;
        self.set_status(outcome);
    }

    /// Housekeeping while another window has focus
    ///
    /// Drains a scan the closed window left running and follows a
    /// connection attempt to its end.
    pub fn background(&mut self, env: &mut Env<'_>) {
        self.poll_connect(env);
        match self.scan {
            ScanState::Running { started_ms } => match env.wifi.poll_scan() {
                ScanPoll::Running => {
                    if env.now_ms.wrapping_sub(started_ms) > self.config.scan_timeout_ms {
                        self.scan = ScanState::Idle;
                        self.abort_on_next_poll = false;
                    }
                }
                ScanPoll::Failed | ScanPoll::Done(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("wifi: discarded scan finished after close");
                    self.scan = ScanState::Idle;
                    self.abort_on_next_poll = false;
                }
            },
            ScanState::Backoff { .. } => self.scan = ScanState::Idle,
            ScanState::Idle => {}
        }
    }

    // Modes

    fn enter_connect(&mut self, env: &mut Env<'_>) {
        let Some(net) = self.selected() else {
            self.set_status("Select a network first");
            return;
        };
        let stored = env.store.get_str::<MAX_SSID_LEN>(NAMESPACE, KEY_SSID);
        let known = stored == net.ssid;
        self.mode = Mode::Connect;
        self.show_password = false;
        self.drag.release();
        if known {
            let pass = env.store.get_str::<KB_TEXT_MAX>(NAMESPACE, KEY_PASS);
            self.keyboard.set_text(&pass);
        } else {
            self.keyboard.clear();
        }
        self.keyboard.set_visible(true);
        self.set_status("Enter the password");
        self.dirty.full = true;
    }

    fn enter_list(&mut self) {
        self.mode = Mode::List;
        self.keyboard.set_visible(false);
        self.keyboard.clear();
        self.dirty.full = true;
    }

    // Touch

    fn list_press(&mut self, p: Point, env: &mut Env<'_>) -> Response {
        if list_back_button().contains(p) {
            return Response::CloseSelf;
        }
        if refresh_button().contains(p) {
            if !matches!(self.scan, ScanState::Running { .. }) {
                self.retries = 0;
                self.start_scan(env);
            }
            return Response::Changed;
        }
        if connect_button().contains(p) {
            match self.selected().map(|n| n.auth_open) {
                Some(true) => self.connect(env, ""),
                Some(false) => self.enter_connect(env),
                None => self.set_status("Select a network first"),
            }
            return Response::Changed;
        }
        if list_rect().contains(p) {
            self.drag.press(p.y);
            let row = ((p.y - list_rect().y - 2).max(0) / ROW_H) as usize;
            let idx = self.scroll + row;
            if row < self.visible_rows() && idx < self.networks.len() && self.selected != Some(idx) {
                self.selected = Some(idx);
                let mut text = StatusText::new();
                let _ = write!(text, "Selected: {}", self.networks[idx].ssid);
                self.set_status(&text);
                self.dirty.list = true;
                return Response::Changed;
            }
        }
        Response::NoOp
    }

    fn connect_press(&mut self, p: Point, env: &mut Env<'_>) -> Response {
        if ok_button().contains(p) {
            let mut password = String::<KB_TEXT_MAX>::new();
            let _ = password.push_str(self.keyboard.text());
            self.connect(env, &password);
            if self.pending.is_some() {
                self.enter_list();
            }
            return Response::Changed;
        }
        if cancel_button().contains(p) {
            self.enter_list();
            self.link_summary(env);
            return Response::Changed;
        }
        if forget_button().contains(p) {
            env.store.forget(NAMESPACE, KEY_SSID);
            env.store.forget(NAMESPACE, KEY_PASS);
            self.saved_ssid.clear();
            self.keyboard.clear();
            self.dirty.password = true;
            self.set_status("Saved WiFi cleared");
            return Response::Changed;
        }
        if see_button().contains(p) {
            self.show_password = !self.show_password;
            self.dirty.password = true;
            return Response::Changed;
        }
        Response::NoOp
    }

    // Drawing

    fn max_scroll(&self) -> usize {
        self.networks.len().saturating_sub(self.visible_rows())
    }

    fn visible_rows(&self) -> usize {
        ((list_rect().h - 4) / ROW_H) as usize
    }

    fn draw_list(&self, surface: &mut dyn DrawSurface) {
        let list = list_rect();
        let _ = surface.draw_frame(list, palette::WHITE, palette::CHROME_DARK);
        for (row, (i, net)) in self
            .networks
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(self.visible_rows())
            .enumerate()
        {
            let r = Rect::new(list.x + 2, list.y + 2 + row as i32 * ROW_H, list.w - 4, ROW_H);
            let (fill, fg) = if self.selected == Some(i) {
                (palette::HIGHLIGHT, palette::WHITE)
            } else {
                (palette::WHITE, palette::BLACK)
            };
            let _ = surface.fill_rect(r, fill);
            let name = ui::tail_fitting(&net.ssid, r.w - 90, Font::Medium);
            let _ = surface.draw_text(name, Point::new(r.x + 4, r.y + 3), Font::Medium, fg);
            if !net.auth_open {
                let _ = surface.draw_text("*", Point::new(r.right() - 70, r.y + 3), Font::Medium, fg);
            }
            draw_signal(surface, Point::new(r.right() - 50, r.bottom() - 4), net.rssi, fg);
        }
    }

    fn draw_status_line(&self, surface: &mut dyn DrawSurface) {
        let r = match self.mode {
            Mode::List => list_status_rect(),
            Mode::Connect => connect_status_rect(),
        };
        let _ = surface.fill_rect(r, palette::CHROME);
        let text = ui::tail_fitting(&self.status, r.w, Font::Small);
        let _ = surface.draw_text(text, Point::new(r.x, r.y + 3), Font::Small, palette::BLACK);
    }

    fn draw_password(&self, surface: &mut dyn DrawSurface) {
        let field = password_rect();
        let _ = surface.draw_frame(field, palette::WHITE, palette::CHROME_DARK);
        let text = self.keyboard.text();
        let mut masked = String::<KB_TEXT_MAX>::new();
        let shown = if self.show_password {
            text
        } else {
            for _ in text.chars() {
                let _ = masked.push('*');
            }
            masked.as_str()
        };
        let shown = ui::tail_fitting(shown, field.w - 8, Font::Medium);
        let _ = surface.draw_text(shown, Point::new(field.x + 4, field.y + 3), Font::Medium, palette::BLACK);
        ui::button(surface, see_button(), if self.show_password { "Hide" } else { "See" });
    }

    fn draw_all(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.dirty = Dirty::default();
        let _ = surface.fill_rect(self.screen, palette::CHROME);
        match self.mode {
            Mode::List => {
                ui::draw_header(surface, self.screen, "Wireless Networks", HEADER_FILL, env.status);
                self.draw_list(surface);
                ui::button(surface, refresh_button(), "Refresh");
                ui::button(surface, connect_button(), "Connect");
                ui::button(surface, list_back_button(), "Back");
            }
            Mode::Connect => {
                ui::draw_header(surface, self.screen, "Connect", HEADER_FILL, env.status);
                let ssid = ssid_rect();
                let _ = surface.draw_frame(ssid, palette::WHITE, palette::CHROME_DARK);
                let name = self.selected().map(|n| n.ssid.as_str()).unwrap_or("");
                let _ = surface.draw_text("Network:", Point::new(ssid.x + 4, ssid.y + 5), Font::Small, palette::CHROME_DARK);
                let _ = surface.draw_text(name, Point::new(ssid.x + 60, ssid.y + 3), Font::Medium, palette::BLACK);
                self.draw_password(surface);
                ui::button(surface, ok_button(), "OK");
                ui::button(surface, cancel_button(), "Cancel");
                ui::button(surface, forget_button(), "Forget");
            }
        }
        self.draw_status_line(surface);
        // Paints nothing while hidden but clears pending key damage
        self.keyboard.draw(surface);
    }
}

/// Four bars, lit by signal strength
fn draw_signal(surface: &mut dyn DrawSurface, base: Point, rssi: i8, color: Rgb565) {
    let lit = match rssi {
        r if r >= -55 => 4,
        r if r >= -65 => 3,
        r if r >= -75 => 2,
        r if r >= -85 => 1,
        _ => 0,
    };
    for b in 0..4 {
        let h = 3 + b * 3;
        let bar = Rect::new(base.x + b * 6, base.y - h, 4, h);
        let fill = if b < lit { color } else { palette::CHROME_LIGHT };
        let _ = surface.fill_rect(bar, fill);
    }
}

impl App for WifiApp {
    fn open(&mut self, env: &mut Env<'_>) -> Result<(), OpenError> {
        self.mode = Mode::List;
        self.keyboard.set_visible(false);
        self.keyboard.clear();
        self.drag.release();
        self.saved_ssid = env.store.get_str::<MAX_SSID_LEN>(NAMESPACE, KEY_SSID);
        self.abort_on_next_poll = false;
        self.retries = 0;
        self.link_summary(env);
        match self.scan {
            ScanState::Running { .. } => self.set_status("Scanning..."),
            _ => self.start_scan(env),
        }
        self.dirty.full = true;
        Ok(())
    }

    fn close(&mut self, _env: &mut Env<'_>) {
        self.keyboard.release();
        self.drag.release();
        match self.scan {
            ScanState::Running { .. } => self.abort_on_next_poll = true,
            ScanState::Backoff { .. } => self.scan = ScanState::Idle,
            ScanState::Idle => {}
        }
    }

    fn handle(&mut self, event: TouchEvent, env: &mut Env<'_>) -> Response {
        let p = event.pos;
        match event.phase {
            TouchPhase::Press => {
                if ui::back_button(self.screen).contains(p) {
                    return Response::CloseSelf;
                }
                match self.mode {
                    Mode::List => self.list_press(p, env),
                    Mode::Connect => self.connect_press(p, env),
                }
            }
            TouchPhase::Held => {
                let scroll = self.drag.held(p.y, ROW_H, self.scroll, self.max_scroll());
                if scroll == self.scroll {
                    return Response::NoOp;
                }
                self.scroll = scroll;
                self.dirty.list = true;
                Response::Changed
            }
            TouchPhase::Release => {
                self.drag.release();
                Response::NoOp
            }
        }
    }

    fn key_changed(&mut self, action: KeyAction, _env: &mut Env<'_>) {
        if action == KeyAction::Changed {
            self.dirty.password = true;
        }
    }

    fn tick(&mut self, env: &mut Env<'_>) {
        self.poll_connect(env);
        self.poll_scan(env);
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.draw_all(surface, env);
    }

    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool {
        if self.dirty.full {
            self.draw_all(surface, env);
            return true;
        }
        let dirty = core::mem::take(&mut self.dirty);
        if dirty.list && self.mode == Mode::List {
            self.draw_list(surface);
        }
        if dirty.password && self.mode == Mode::Connect {
            self.draw_password(surface);
        }
        if dirty.status {
            self.draw_status_line(surface);
        }
        let keys = self.keyboard.render_damage(surface);
        dirty.list || dirty.password || dirty.status || keys
    }

    fn keyboard(&self) -> Option<&OnScreenKeyboard> {
        Some(&self.keyboard)
    }

    fn keyboard_mut(&mut self) -> Option<&mut OnScreenKeyboard> {
        Some(&mut self.keyboard)
    }
}
