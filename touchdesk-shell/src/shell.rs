//! Polling loop and focus management
//!
//! [`Shell`] owns the desktop, every application and the collaborators.
//! One call to [`Shell::tick`] takes one touch sample, routes the derived
//! edge event to exactly one consumer, advances the background work and
//! paints whatever became dirty.

#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};

use touchdesk_core::config::{ShellConfig, KB_TEXT_MAX};
use touchdesk_core::damage::Compositor;
use touchdesk_core::desktop::{Desktop, DesktopAction, StatusInfo, TrashMask};
use touchdesk_core::input::{GestureRouter, Layer, Response, RouteTargets, Routed, TouchEvent};
use touchdesk_core::keyboard::KeyAction;
use touchdesk_core::state::{AppId, Focus, FocusEvent};
use touchdesk_core::traits::net::MAX_SSID_LEN;
use touchdesk_core::traits::{ChatBackend, LinkStatus, TouchSample, TouchSource, WifiDriver};
use touchdesk_display::{DrawSurface, Point, Rect};
use touchdesk_hal::{Clock, KeyValueStore, KeyValueStoreExt};

use crate::apps::{
    wifi, App, ChatApp, Env, InternetApp, NotesApp, PaintApp, PropertiesApp, SettingsApp, TrashApp,
    WifiApp,
};
use crate::config::load_from_store;
use crate::settings::Settings;
use crate::ui;

/// Store namespace of the trash mask
pub const TRASH_NAMESPACE: &str = "trash";

/// Store key of the trash mask
pub const TRASH_KEY: &str = "mask";

/// One instance of every application
pub struct Apps {
    pub chat: ChatApp,
    pub paint: PaintApp,
    pub notes: NotesApp,
    pub internet: InternetApp,
    pub settings: SettingsApp,
    pub trash: TrashApp,
    pub wifi: WifiApp,
    pub properties: PropertiesApp,
}

impl Apps {
    fn new(config: &ShellConfig, screen: Rect) -> Self {
        Self {
            chat: ChatApp::new(config, screen),
            paint: PaintApp::new(config.paint, screen),
            notes: NotesApp::new(config, screen),
            internet: InternetApp::new(screen),
            settings: SettingsApp::new(screen),
            trash: TrashApp::new(screen),
            wifi: WifiApp::new(config, screen),
            properties: PropertiesApp::new(screen),
        }
    }

    fn get(&self, id: AppId) -> &dyn App {
        match id {
            AppId::Chat => &self.chat,
            AppId::Paint => &self.paint,
            AppId::Notes => &self.notes,
            AppId::Internet => &self.internet,
            AppId::Settings => &self.settings,
            AppId::Trash => &self.trash,
            AppId::Wifi => &self.wifi,
            AppId::Properties(_) => &self.properties,
        }
    }

    fn get_mut(&mut self, id: AppId) -> &mut dyn App {
        match id {
            AppId::Chat => &mut self.chat,
            AppId::Paint => &mut self.paint,
            AppId::Notes => &mut self.notes,
            AppId::Internet => &mut self.internet,
            AppId::Settings => &mut self.settings,
            AppId::Trash => &mut self.trash,
            AppId::Wifi => &mut self.wifi,
            AppId::Properties(_) => &mut self.properties,
        }
    }
}

/// Everything the router delivers into
struct Session<S, W, C> {
    config: ShellConfig,
    screen: Rect,
    focus: Focus,
    desktop: Desktop,
    apps: Apps,
    settings: Settings,
    store: S,
    wifi: W,
    chat: C,
    /// Timestamp of the tick in progress
    now_ms: u32,
    /// Status computed at the start of the tick
    status: StatusInfo,
    /// Next render repaints the whole focused screen
    full_redraw: bool,
    /// Status last painted into the focused app's header, and when
    app_status: Option<(StatusInfo, u32)>,
}

impl<S, W, C> Session<S, W, C>
where
    S: KeyValueStore,
    W: WifiDriver,
    C: ChatBackend,
{
    /// Lend the collaborators out next to the applications
    fn split(&mut self) -> (&mut Apps, Env<'_>) {
        let env = Env {
            now_ms: self.now_ms,
            status: self.status,
            store: &mut self.store,
            wifi: &mut self.wifi,
            chat: &mut self.chat,
            desktop: &mut self.desktop,
            settings: &mut self.settings,
        };
        (&mut self.apps, env)
    }

    fn current_status(&self, now_ms: u32) -> StatusInfo {
        let (hour, minute) = self.settings.now(now_ms);
        StatusInfo {
            hour,
            minute,
            wifi_connected: self.wifi.status() == LinkStatus::Connected,
        }
    }

    fn apply(&mut self, action: DesktopAction) -> Response {
        match action {
            DesktopAction::None => Response::NoOp,
            DesktopAction::Redraw => Response::Changed,
            DesktopAction::Open(app) => {
                self.open_app(app);
                Response::Changed
            }
        }
    }

    fn open_app(&mut self, id: AppId) {
        if !self.focus.is_desktop() {
            return;
        }
        if let AppId::Properties(icon) = id {
            self.apps.properties.show(icon);
        }
        let opened = {
            let (apps, mut env) = self.split();
            apps.get_mut(id).open(&mut env)
        };
        match opened {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                info!("Opened {}", id);
                self.focus = self.focus.transition(FocusEvent::Open(id));
                self.full_redraw = true;
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                warn!("{} failed to open: {}", id, _e);
            }
        }
    }

    fn close_app(&mut self) {
        let Some(id) = self.focus.app() else {
            return;
        };
        {
            let (apps, mut env) = self.split();
            apps.get_mut(id).close(&mut env);
        }
        #[cfg(feature = "defmt")]
        info!("Closed {}", id);
        self.focus = self.focus.transition(FocusEvent::Close);
        self.full_redraw = true;
    }

    /// Everything after routing: key release, app ticks, background
    /// scans, status and persistence
    fn advance(&mut self, sample: TouchSample) {
        let now_ms = self.now_ms;
        let focused = self.focus.app();

        if let Some(id) = focused {
            let (apps, mut env) = self.split();
            let app = apps.get_mut(id);
            if !sample.pressed {
                if let Some(keyboard) = app.keyboard_mut() {
                    keyboard.update(false, sample.point(), now_ms);
                }
            }
            app.tick(&mut env);
        }
        if focused != Some(AppId::Wifi) {
            let (apps, mut env) = self.split();
            apps.wifi.background(&mut env);
        }

        // Kept current while an app is up so the desktop comes back right
        self.desktop.update_status(self.status, now_ms);

        if let Some(mask) = self.desktop.take_trash_changed() {
            self.persist_trash(mask);
        }
    }

    fn persist_trash(&mut self, mask: TrashMask) {
        if self.store.set(TRASH_NAMESPACE, TRASH_KEY, &mask.bits()) {
            #[cfg(feature = "defmt")]
            info!("Trash saved: {=u8:#x}", mask.bits());
        } else {
            #[cfg(feature = "defmt")]
            warn!("Trash mask not saved");
        }
    }

    fn app_status_due(&self) -> bool {
        match self.app_status {
            None => true,
            Some((shown, at)) => {
                shown != self.status
                    && self.now_ms.wrapping_sub(at) >= self.config.display.status_refresh_ms
            }
        }
    }

    /// Paint what this tick left dirty; true if anything was drawn
    fn render(&mut self, surface: &mut dyn DrawSurface) -> bool {
        let full = core::mem::take(&mut self.full_redraw);
        let Some(id) = self.focus.app() else {
            if full {
                self.desktop.draw_full(surface);
                return true;
            }
            return self.desktop.flush(surface);
        };

        let status = self.status;
        let now_ms = self.now_ms;
        let screen = self.screen;
        let status_due = full || self.app_status_due();
        let (apps, env) = self.split();
        let app = apps.get_mut(id);

        let mut drawn = if full {
            app.draw(surface, &env);
            true
        } else {
            app.flush(surface, &env)
        };
        let slot = if status_due { app.status_slot(screen) } else { None };
        if let Some(slot) = slot {
            if !full {
                ui::draw_status(surface, slot, status);
                drawn = true;
            }
            self.app_status = Some((status, now_ms));
        }
        drawn
    }
}

impl<S, W, C> RouteTargets for Session<S, W, C>
where
    S: KeyValueStore,
    W: WifiDriver,
    C: ChatBackend,
{
    fn modal_visible(&self) -> bool {
        self.focus.is_desktop() && self.desktop.modal_visible()
    }

    fn keyboard_claims(&self, event: &TouchEvent) -> bool {
        self.focus
            .app()
            .and_then(|id| self.apps.get(id).keyboard())
            .is_some_and(|keyboard| keyboard.claims(event.pos))
    }

    fn has_foreground_app(&self) -> bool {
        self.focus.app().is_some()
    }

    fn deliver(&mut self, layer: Layer, event: TouchEvent, now_ms: u32) -> Response {
        match layer {
            Layer::Modal => {
                let action = self.desktop.handle_modal(event);
                self.apply(action)
            }
            Layer::Desktop => {
                let action = self.desktop.handle(event, now_ms);
                self.apply(action)
            }
            Layer::Keyboard => {
                let Some(id) = self.focus.app() else {
                    return Response::NoOp;
                };
                let (apps, mut env) = self.split();
                let app = apps.get_mut(id);
                let action = match app.keyboard_mut() {
                    Some(keyboard) => keyboard.update(event.is_down(), event.pos, now_ms),
                    None => KeyAction::None,
                };
                if action == KeyAction::None {
                    return Response::NoOp;
                }
                app.key_changed(action, &mut env);
                Response::Changed
            }
            Layer::App => {
                let Some(id) = self.focus.app() else {
                    return Response::NoOp;
                };
                let response = {
                    let (apps, mut env) = self.split();
                    apps.get_mut(id).handle(event, &mut env)
                };
                if response == Response::CloseSelf {
                    self.close_app();
                }
                response
            }
        }
    }
}

/// The desktop shell
pub struct Shell<S, W, C> {
    router: GestureRouter,
    session: Session<S, W, C>,
}

impl<S, W, C> Shell<S, W, C>
where
    S: KeyValueStore,
    W: WifiDriver,
    C: ChatBackend,
{
    /// Boot with the configuration provisioned in `store`, or the
    /// embedded one
    pub fn boot(mut store: S, wifi: W, chat: C, now_ms: u32) -> Self {
        let config = load_from_store(&mut store);
        Self::new(config, store, wifi, chat, now_ms)
    }

    /// Boot with an explicit configuration
    ///
    /// Restores the trash mask and the user settings from `store`, and
    /// rejoins the saved network if auto-connect is on.
    pub fn new(config: ShellConfig, mut store: S, mut wifi: W, chat: C, now_ms: u32) -> Self {
        let screen = Rect::new(0, 0, config.display.width, config.display.height);

        let mut desktop = Desktop::new(&config.gesture, &config.display);
        let bits: u8 = store.get_or(TRASH_NAMESPACE, TRASH_KEY, 0);
        desktop.set_trash(TrashMask::from_bits(bits));

        let settings = Settings::load(&mut store, now_ms);
        if settings.autoconnect {
            let ssid = store.get_str::<MAX_SSID_LEN>(wifi::NAMESPACE, wifi::KEY_SSID);
            if !ssid.is_empty() {
                let pass = store.get_str::<KB_TEXT_MAX>(wifi::NAMESPACE, wifi::KEY_PASS);
                #[cfg(feature = "defmt")]
                info!("Auto-connecting to {}", ssid.as_str());
                wifi.connect(&ssid, &pass);
            }
        }

        #[cfg(feature = "defmt")]
        info!("Shell up: {}x{}, trash {=u8:#x}", screen.w, screen.h, bits);

        let mut session = Session {
            config,
            screen,
            focus: Focus::default(),
            desktop,
            apps: Apps::new(&config, screen),
            settings,
            store,
            wifi,
            chat,
            now_ms,
            status: StatusInfo::default(),
            full_redraw: true,
            app_status: None,
        };
        session.status = session.current_status(now_ms);
        session.desktop.update_status(session.status, now_ms);

        Self {
            router: GestureRouter::new(),
            session,
        }
    }

    /// Run one tick with `sample` taken at `now_ms`
    ///
    /// Returns the routed event, if the sample produced one.
    pub fn tick(&mut self, sample: TouchSample, now_ms: u32, surface: &mut dyn DrawSurface) -> Option<Routed> {
        let session = &mut self.session;
        session.now_ms = now_ms;
        session.status = session.current_status(now_ms);

        let routed = self.router.route(sample, now_ms, session);
        #[cfg(feature = "defmt")]
        if let Some(r) = &routed {
            debug!("{} -> {}: {}", r.event.phase, r.layer, r.response);
        }

        session.advance(sample);
        session.render(surface);
        routed
    }

    /// Poll `touch` and run one tick at the time `clock` reports
    pub fn step<T, K>(&mut self, touch: &mut T, clock: &K, surface: &mut dyn DrawSurface) -> Option<Routed>
    where
        T: TouchSource + ?Sized,
        K: Clock + ?Sized,
    {
        let sample = touch.poll();
        self.tick(sample, clock.now_ms(), surface)
    }

    /// Move the debug pointer, or hide it with `None`
    pub fn set_cursor(&mut self, pos: Option<Point>) {
        self.session.desktop.set_cursor(pos);
    }

    /// Repaint everything on the next tick
    pub fn invalidate(&mut self) {
        self.session.full_redraw = true;
    }

    pub fn focus(&self) -> Focus {
        self.session.focus
    }

    pub fn config(&self) -> &ShellConfig {
        &self.session.config
    }

    pub fn desktop(&self) -> &Desktop {
        &self.session.desktop
    }

    pub fn apps(&self) -> &Apps {
        &self.session.apps
    }

    pub fn settings(&self) -> &Settings {
        &self.session.settings
    }

    pub fn store(&self) -> &S {
        &self.session.store
    }

    pub fn wifi(&self) -> &W {
        &self.session.wifi
    }

    pub fn wifi_mut(&mut self) -> &mut W {
        &mut self.session.wifi
    }

    pub fn chat(&self) -> &C {
        &self.session.chat
    }

    /// Tear down and give the collaborators back
    pub fn into_parts(self) -> (S, W, C) {
        (self.session.store, self.session.wifi, self.session.chat)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::apps::testing::{surface, MockChat, MockWifi};
    use proptest::prelude::*;
    use crate::apps::wifi::ScanState;
    use std::collections::VecDeque;
    use touchdesk_core::desktop::{start_button, IconId};
    use touchdesk_core::keyboard::KeyKind;
    use touchdesk_core::traits::ScanStart;
    use touchdesk_display::{EgSurface, Framebuffer};
    use touchdesk_drivers::touch::{Ft6x36, FT6X36_ADDR};
    use touchdesk_hal::{I2cBus, ManualClock, MemoryStore};

    type TestShell = Shell<MemoryStore, MockWifi, MockChat>;

    /// Chat icon body centre at its default placement
    const CHAT_ICON: Point = Point::new(44, 60);

    struct Rig {
        shell: TestShell,
        surface: EgSurface<Framebuffer>,
        now: u32,
    }

    impl Rig {
        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn with_store(store: MemoryStore) -> Self {
            let shell = Shell::new(
                ShellConfig::default(),
                store,
                MockWifi::new(),
                MockChat::replying("Hello!"),
                0,
            );
            let mut rig = Self {
                shell,
                surface: surface(),
                now: 0,
            };
            rig.idle(10);
            rig
        }

        fn sample(&mut self, sample: TouchSample, dt: u32) -> Option<Routed> {
            self.now += dt;
            self.shell.tick(sample, self.now, &mut self.surface)
        }

        fn idle(&mut self, dt: u32) -> Option<Routed> {
            self.sample(TouchSample::RELEASED, dt)
        }

        fn tap(&mut self, p: Point) -> Option<Routed> {
            let routed = self.sample(TouchSample::down(p.x, p.y), 20);
            self.idle(30);
            routed
        }

        /// Press a key and lift long enough for the release to settle
        fn key(&mut self, kind: KeyKind) {
            let keyboard = self.shell.apps().chat.keyboard().unwrap();
            let key = keyboard.layout().iter().find(|k| k.kind == kind).unwrap().rect;
            let c = key.center();
            self.sample(TouchSample::down(c.x, c.y), 20);
            self.idle(10);
            self.idle(100);
        }
    }

    #[test]
    fn test_boot_paints_desktop() {
        let rig = Rig::new();
        assert_eq!(rig.shell.focus(), Focus::Desktop);
        let fresh = {
            let mut s = surface();
            let mut d = Desktop::new(&Default::default(), &Default::default());
            d.update_status(rig.shell.desktop().status(), 0);
            d.draw_full(&mut s);
            s
        };
        assert_eq!(rig.surface.target().first_difference(fresh.target()), None);
    }

    #[test]
    fn test_chat_end_to_end() {
        let mut rig = Rig::new();
        let routed = rig.tap(CHAT_ICON).unwrap();
        assert_eq!(routed.layer, Layer::Desktop);
        assert_eq!(rig.shell.focus(), Focus::App(AppId::Chat));

        rig.key(KeyKind::Char('H'));
        rig.key(KeyKind::Char('I'));
        assert_eq!(rig.shell.apps().chat.input(), "hi");
        rig.key(KeyKind::Delete);
        assert_eq!(rig.shell.apps().chat.input(), "h");

        let send = rig.shell.apps().chat.send_button().center();
        let routed = rig.tap(send).unwrap();
        assert_eq!(routed.layer, Layer::App);
        assert_eq!(rig.shell.chat().prompts, ["h"]);
        let message = rig.shell.apps().chat.messages().next().unwrap();
        assert_eq!(message.user.as_str(), "You: h");
        assert_eq!(message.ai.as_str(), "AI:  Hello!");
        assert_eq!(rig.shell.apps().chat.scroll(), 0);
        assert_eq!(rig.shell.apps().chat.input(), "");

        rig.tap(ui::back_button(Rect::new(0, 0, 320, 240)).center());
        assert_eq!(rig.shell.focus(), Focus::Desktop);
    }

    #[test]
    fn test_glitch_inside_debounce_does_not_retype() {
        let mut rig = Rig::new();
        rig.tap(CHAT_ICON);
        let keyboard = rig.shell.apps().chat.keyboard().unwrap();
        let key = keyboard
            .layout()
            .iter()
            .find(|k| k.kind == KeyKind::Char('A'))
            .unwrap()
            .rect
            .center();

        rig.sample(TouchSample::down(key.x, key.y), 20);
        // One noisy released sample in the middle of a held press
        rig.idle(20);
        rig.sample(TouchSample::down(key.x, key.y), 20);
        rig.idle(10);
        rig.idle(100);
        assert_eq!(rig.shell.apps().chat.input(), "a");
    }

    #[test]
    fn test_open_menu_takes_priority() {
        let mut rig = Rig::new();
        let start = start_button(Rect::new(0, 0, 320, 240)).center();
        rig.tap(start);
        assert!(rig.shell.desktop().modal_visible());

        // A press outside the menu closes it and never reaches the icon
        let routed = rig.tap(CHAT_ICON).unwrap();
        assert_eq!(routed.layer, Layer::Modal);
        assert!(!rig.shell.desktop().modal_visible());
        assert_eq!(rig.shell.focus(), Focus::Desktop);
        assert_eq!(rig.shell.desktop().selected(), None);
    }

    #[test]
    fn test_trash_survives_reboot() {
        let mut rig = Rig::new();
        rig.sample(TouchSample::down(CHAT_ICON.x, CHAT_ICON.y), 20);
        rig.sample(TouchSample::down(44, 90), 20);
        rig.sample(TouchSample::down(44, 180), 20);
        rig.idle(20);
        assert!(!rig.shell.desktop().is_visible(IconId::Chat));

        let (mut store, _, _) = rig.shell.into_parts();
        let bits: u8 = store.get_or(TRASH_NAMESPACE, TRASH_KEY, 0);
        assert_eq!(TrashMask::from_bits(bits), {
            let mut mask = TrashMask::default();
            mask.delete(IconId::Chat);
            mask
        });

        let rig = Rig::with_store(store);
        assert!(!rig.shell.desktop().is_visible(IconId::Chat));
        assert!(rig.shell.desktop().is_visible(IconId::Paint));
    }

    #[test]
    fn test_properties_from_context_menu() {
        let mut rig = Rig::new();
        // Hold on the icon until the context menu opens, then lift
        rig.sample(TouchSample::down(CHAT_ICON.x, CHAT_ICON.y), 20);
        rig.sample(TouchSample::down(CHAT_ICON.x, CHAT_ICON.y), 400);
        rig.idle(20);
        assert!(rig.shell.desktop().modal_visible());

        let (_, menu) = rig.shell.desktop().context_menu().unwrap();
        let properties = menu.item_rect(2).center();
        rig.tap(properties);
        assert_eq!(rig.shell.focus(), Focus::App(AppId::Properties(IconId::Chat)));
        assert_eq!(rig.shell.apps().properties.icon(), IconId::Chat);

        rig.tap(Point::new(5, 5));
        assert_eq!(rig.shell.focus(), Focus::Desktop);
    }

    #[test]
    fn test_scan_drains_after_close() {
        let mut rig = Rig::new();
        rig.shell.session.open_app(AppId::Wifi);
        rig.idle(10);
        assert_eq!(rig.shell.focus(), Focus::App(AppId::Wifi));
        assert!(matches!(rig.shell.apps().wifi.scan_state(), ScanState::Running { .. }));

        rig.tap(ui::back_button(Rect::new(0, 0, 320, 240)).center());
        assert_eq!(rig.shell.focus(), Focus::Desktop);
        assert!(rig.shell.apps().wifi.is_draining());

        let polls = rig.shell.wifi().poll_calls;
        rig.idle(10);
        rig.idle(10);
        assert!(rig.shell.wifi().poll_calls >= polls + 2);

        rig.shell.wifi_mut().polls = VecDeque::from([MockWifi::done(&[("Cafe", -40, true)])]);
        rig.idle(10);
        assert_eq!(rig.shell.apps().wifi.scan_state(), ScanState::Idle);
        assert!(rig.shell.apps().wifi.networks().is_empty());

        let polls = rig.shell.wifi().poll_calls;
        rig.idle(10);
        assert_eq!(rig.shell.wifi().poll_calls, polls);
    }

    #[test]
    fn test_failed_scan_start_does_not_fault() {
        let mut wifi = MockWifi::new();
        wifi.starts = VecDeque::from([ScanStart::Error; 8]);
        let mut shell = Shell::new(ShellConfig::default(), MemoryStore::new(), wifi, MockChat::replying(""), 0);
        let mut s = surface();
        shell.session.open_app(AppId::Wifi);
        for t in 1..40 {
            shell.tick(TouchSample::RELEASED, t * 100, &mut s);
        }
        assert_eq!(shell.wifi().scan_calls, 4);
        assert_eq!(shell.apps().wifi.scan_state(), ScanState::Idle);
        assert_eq!(shell.apps().wifi.status_text(), "Scan failed");
    }

    #[test]
    fn test_autoconnect_on_boot() {
        let mut store = MemoryStore::new();
        store.set_str(wifi::NAMESPACE, wifi::KEY_SSID, "Home");
        store.set_str(wifi::NAMESPACE, wifi::KEY_PASS, "secret");
        let shell = Shell::new(ShellConfig::default(), store, MockWifi::new(), MockChat::replying(""), 0);
        let connects = &shell.wifi().connects;
        assert_eq!(connects.len(), 1);
        assert_eq!(connects[0].0, "Home");
        assert_eq!(connects[0].1, "secret");

        let mut store = MemoryStore::new();
        store.set_str(wifi::NAMESPACE, wifi::KEY_SSID, "Home");
        let mut settings = Settings::default();
        settings.autoconnect = false;
        settings.save(&mut store, 0);
        let shell = Shell::new(ShellConfig::default(), store, MockWifi::new(), MockChat::replying(""), 0);
        assert!(shell.wifi().connects.is_empty());
    }

    #[test]
    fn test_app_status_follows_link() {
        let mut rig = Rig::new();
        rig.shell.session.open_app(AppId::Notes);
        rig.idle(10);
        let slot = ui::status_rect(Rect::new(0, 0, 320, 240));
        let before = rig.surface.target().clone();

        rig.shell.wifi_mut().link = LinkStatus::Connected;
        rig.idle(10);
        // Throttled: the strip is not repainted yet
        assert!(rig.shell.session.app_status.is_some_and(|(s, _)| !s.wifi_connected));
        rig.idle(1_000);
        assert!(rig.shell.session.app_status.is_some_and(|(s, _)| s.wifi_connected));
        let (x, y) = rig.surface.target().first_difference(&before).unwrap();
        assert!(slot.contains(Point::new(x as i32, y as i32)));
    }

    /// Panel behind an FT6x36 register file
    struct PanelBus {
        regs: [u8; 256],
    }

    impl PanelBus {
        fn new() -> Self {
            Self { regs: [0; 256] }
        }

        /// Put a finger at screen `p` in the default landscape mounting
        fn touch(&mut self, p: Point) {
            let raw_x = (239 - p.y) as u16;
            let raw_y = p.x as u16;
            self.regs[2..7].copy_from_slice(&[
                1,
                0x80 | (raw_x >> 8) as u8,
                raw_x as u8,
                0x10 | (raw_y >> 8) as u8,
                raw_y as u8,
            ]);
        }

        fn lift(&mut self) {
            self.regs[2] = 0;
        }
    }

    impl I2cBus for PanelBus {
        type Error = ();

        fn write(&mut self, _address: u8, _data: &[u8]) -> Result<(), ()> {
            Ok(())
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), ()> {
            Err(())
        }

        fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), ()> {
            if address != FT6X36_ADDR {
                return Err(());
            }
            let start = write.first().copied().ok_or(())? as usize;
            for (i, b) in read.iter_mut().enumerate() {
                *b = self.regs[(start + i) % 256];
            }
            Ok(())
        }
    }

    #[test]
    fn test_step_with_touch_panel() {
        let mut shell = Shell::new(
            ShellConfig::default(),
            MemoryStore::new(),
            MockWifi::new(),
            MockChat::replying(""),
            0,
        );
        let mut s = surface();
        let clock = ManualClock::new(0);

        let mut bus = PanelBus::new();
        bus.touch(CHAT_ICON);
        let mut touch = Ft6x36::new(bus, 320, 240);
        clock.advance(20);
        let routed = shell.step(&mut touch, &clock, &mut s).unwrap();
        assert_eq!(routed.event.pos, CHAT_ICON);

        let mut bus = touch.release();
        bus.lift();
        let mut touch = Ft6x36::new(bus, 320, 240);
        clock.advance(30);
        shell.step(&mut touch, &clock, &mut s);
        assert_eq!(shell.focus(), Focus::App(AppId::Chat));
    }

    #[test]
    fn test_closing_app_restores_desktop_pixels() {
        let mut rig = Rig::new();
        let desktop = rig.surface.target().clone();
        rig.tap(CHAT_ICON);
        assert!(rig.surface.target().first_difference(&desktop).is_some());

        rig.tap(ui::back_button(Rect::new(0, 0, 320, 240)).center());
        // Tapping the icon selected it; deselect to match the first frame
        rig.tap(Point::new(200, 120));
        assert_eq!(rig.surface.target().first_difference(&desktop), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_random_touches_keep_shell_consistent(
            samples in prop::collection::vec((any::<bool>(), 0i32..320, 0i32..240, 1u32..400), 1..80),
        ) {
            let mut rig = Rig::new();
            for (pressed, x, y, dt) in samples {
                let sample = TouchSample { pressed, x, y };
                rig.sample(sample, dt);

                prop_assert_eq!(rig.shell.focus().is_desktop(), rig.shell.focus().app().is_none());
                if !rig.shell.focus().is_desktop() {
                    prop_assert!(!rig.shell.session.modal_visible());
                }

                // Whatever is on disk always matches the desktop
                let mut store = rig.shell.store().clone();
                if store.contains(TRASH_NAMESPACE, TRASH_KEY) {
                    let bits: u8 = store.get_or(TRASH_NAMESPACE, TRASH_KEY, 0);
                    prop_assert_eq!(TrashMask::from_bits(bits), rig.shell.desktop().trash());
                } else {
                    prop_assert!(rig.shell.desktop().trash().is_empty());
                }
            }

            rig.idle(10);
            prop_assert_eq!(rig.shell.router.owner(), None);
            prop_assert!(!rig.shell.desktop().is_hovering_trash());
        }
    }
}
