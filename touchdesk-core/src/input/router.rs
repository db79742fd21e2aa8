//! Z-ordered gesture routing
//!
//! Each tick's edge event goes to exactly one consumer, chosen by
//! priority:
//!
//! 1. an open modal menu (context or start menu), unconditionally
//! 2. the on-screen keyboard, if visible and the point is in its region
//! 3. the foreground application
//! 4. the desktop
//!
//! A press-start picks the owner; held samples and the release go to the
//! same owner so a gesture never changes hands halfway, except that a
//! modal opened during the gesture (a long-hold menu) takes it over.

use crate::traits::TouchSample;

use super::edge::{EdgeDetector, TouchEvent, TouchPhase};

/// Routing layers, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    Modal,
    Keyboard,
    App,
    Desktop,
}

/// What a consumer did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Consumed, nothing visible changed
    NoOp,
    /// Consumed, state changed and a redraw was requested
    Changed,
    /// Consumed, the consumer closed itself and focus returns to the desktop
    CloseSelf,
}

/// The consumers the router chooses between
pub trait RouteTargets {
    /// A context or start menu is open
    fn modal_visible(&self) -> bool;

    /// The keyboard is visible and `event` falls in its region
    fn keyboard_claims(&self, event: &TouchEvent) -> bool;

    /// An application currently has focus
    fn has_foreground_app(&self) -> bool;

    /// Hand the event to one layer
    fn deliver(&mut self, layer: Layer, event: TouchEvent, now_ms: u32) -> Response;
}

/// Outcome of one routed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Routed {
    pub layer: Layer,
    pub event: TouchEvent,
    pub response: Response,
}

/// Routes edge events to a single consumer per tick
#[derive(Debug, Clone, Default)]
pub struct GestureRouter {
    edges: EdgeDetector,
    /// Layer that received the current gesture's press-start
    owner: Option<Layer>,
}

impl GestureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer owning the gesture in progress
    pub fn owner(&self) -> Option<Layer> {
        self.owner
    }

    /// Whether the previous sample was pressed
    pub fn last_pressed(&self) -> bool {
        self.edges.last_pressed()
    }

    /// Process one tick
    ///
    /// Returns `None` when there was no edge event or when the event
    /// belonged to a gesture whose owner has gone away.
    pub fn route<T: RouteTargets>(
        &mut self,
        sample: TouchSample,
        now_ms: u32,
        targets: &mut T,
    ) -> Option<Routed> {
        let event = self.edges.feed(sample)?;
        let layer = self.select(&event, targets);

        if event.phase == TouchPhase::Release {
            self.owner = None;
        }

        let layer = layer?;
        let response = targets.deliver(layer, event, now_ms);
        if response == Response::CloseSelf {
            self.owner = None;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("route {:?} -> {:?}: {:?}", event.phase, layer, response);

        Some(Routed {
            layer,
            event,
            response,
        })
    }

    fn select<T: RouteTargets>(&mut self, event: &TouchEvent, targets: &T) -> Option<Layer> {
        if targets.modal_visible() {
            if event.phase == TouchPhase::Press {
                self.owner = Some(Layer::Modal);
            }
            return Some(Layer::Modal);
        }

        match event.phase {
            TouchPhase::Press => {
                let layer = if targets.keyboard_claims(event) {
                    Layer::Keyboard
                } else if targets.has_foreground_app() {
                    Layer::App
                } else {
                    Layer::Desktop
                };
                self.owner = Some(layer);
                Some(layer)
            }
            TouchPhase::Held | TouchPhase::Release => match self.owner {
                // The menu that owned this gesture has closed; swallow the rest
                Some(Layer::Modal) => None,
                Some(Layer::App) if !targets.has_foreground_app() => None,
                owner => owner,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    /// Instrumented consumers: records every delivery
    struct MockTargets {
        modal: bool,
        keyboard_top: Option<i32>,
        app: bool,
        delivered: Vec<(Layer, TouchPhase)>,
        /// Layer that closes itself (or the modal) when it gets a press
        close_on_press: Option<Layer>,
        /// Desktop opens a modal when it sees a held sample
        desktop_opens_modal: bool,
    }

    impl MockTargets {
        fn new() -> Self {
            Self {
                modal: false,
                keyboard_top: None,
                app: false,
                delivered: Vec::new(),
                close_on_press: None,
                desktop_opens_modal: false,
            }
        }
    }

    impl RouteTargets for MockTargets {
        fn modal_visible(&self) -> bool {
            self.modal
        }

        fn keyboard_claims(&self, event: &TouchEvent) -> bool {
            self.keyboard_top.is_some_and(|top| event.pos.y >= top)
        }

        fn has_foreground_app(&self) -> bool {
            self.app
        }

        fn deliver(&mut self, layer: Layer, event: TouchEvent, _now_ms: u32) -> Response {
            self.delivered.push((layer, event.phase));
            if event.phase == TouchPhase::Press && self.close_on_press == Some(layer) {
                match layer {
                    Layer::Modal => self.modal = false,
                    Layer::App => self.app = false,
                    _ => {}
                }
                return Response::CloseSelf;
            }
            if layer == Layer::Desktop
                && event.phase == TouchPhase::Held
                && self.desktop_opens_modal
            {
                self.modal = true;
                return Response::Changed;
            }
            Response::NoOp
        }
    }

    fn tap(router: &mut GestureRouter, t: &mut MockTargets, x: i32, y: i32) {
        router.route(TouchSample::down(x, y), 0, t);
        router.route(TouchSample::up(x, y), 10, t);
    }

    #[test]
    fn test_priority_order() {
        let mut router = GestureRouter::new();
        let mut t = MockTargets::new();

        tap(&mut router, &mut t, 10, 10);
        assert_eq!(t.delivered[0].0, Layer::Desktop);

        t.app = true;
        t.delivered.clear();
        tap(&mut router, &mut t, 10, 10);
        assert_eq!(t.delivered[0].0, Layer::App);

        t.keyboard_top = Some(140);
        t.delivered.clear();
        tap(&mut router, &mut t, 10, 150);
        assert_eq!(t.delivered[0].0, Layer::Keyboard);
        // Above the keyboard region still reaches the app
        t.delivered.clear();
        tap(&mut router, &mut t, 10, 100);
        assert_eq!(t.delivered[0].0, Layer::App);

        t.modal = true;
        t.delivered.clear();
        tap(&mut router, &mut t, 10, 150);
        assert_eq!(t.delivered, [(Layer::Modal, TouchPhase::Press), (Layer::Modal, TouchPhase::Release)]);
    }

    #[test]
    fn test_gesture_keeps_owner() {
        let mut router = GestureRouter::new();
        let mut t = MockTargets::new();
        t.app = true;
        t.keyboard_top = Some(140);

        // Press on the keyboard, slide up into the app area
        router.route(TouchSample::down(50, 200), 0, &mut t);
        router.route(TouchSample::down(50, 100), 10, &mut t);
        router.route(TouchSample::up(0, 0), 20, &mut t);
        assert!(t.delivered.iter().all(|(l, _)| *l == Layer::Keyboard));
        assert_eq!(router.owner(), None);
    }

    #[test]
    fn test_long_hold_menu_takes_over_gesture() {
        let mut router = GestureRouter::new();
        let mut t = MockTargets::new();
        t.desktop_opens_modal = true;

        router.route(TouchSample::down(30, 50), 0, &mut t);
        router.route(TouchSample::down(30, 50), 400, &mut t);
        router.route(TouchSample::down(40, 60), 410, &mut t);
        router.route(TouchSample::up(40, 60), 420, &mut t);

        assert_eq!(
            t.delivered,
            [
                (Layer::Desktop, TouchPhase::Press),
                (Layer::Desktop, TouchPhase::Held),
                (Layer::Modal, TouchPhase::Held),
                (Layer::Modal, TouchPhase::Release),
            ]
        );
    }

    #[test]
    fn test_tap_outside_menu_does_not_reach_desktop() {
        let mut router = GestureRouter::new();
        let mut t = MockTargets::new();
        t.modal = true;
        t.close_on_press = Some(Layer::Modal);

        router.route(TouchSample::down(300, 10), 0, &mut t);
        let held = router.route(TouchSample::down(300, 10), 10, &mut t);
        let release = router.route(TouchSample::up(300, 10), 20, &mut t);

        assert_eq!(held, None);
        assert_eq!(release, None);
        assert_eq!(t.delivered, [(Layer::Modal, TouchPhase::Press)]);
        assert!(!t.modal);
    }

    #[test]
    fn test_release_after_app_closed_is_swallowed() {
        let mut router = GestureRouter::new();
        let mut t = MockTargets::new();
        t.app = true;
        t.close_on_press = Some(Layer::App);

        let r = router.route(TouchSample::down(310, 5), 0, &mut t).unwrap();
        assert_eq!(r.response, Response::CloseSelf);
        assert_eq!(router.route(TouchSample::up(310, 5), 10, &mut t), None);
        assert_eq!(t.delivered.len(), 1);
    }

    #[test]
    fn test_idle_ticks_route_nothing() {
        let mut router = GestureRouter::new();
        let mut t = MockTargets::new();
        for now in 0..5 {
            assert_eq!(router.route(TouchSample::RELEASED, now, &mut t), None);
        }
        assert!(t.delivered.is_empty());
    }

    proptest! {
        #[test]
        fn prop_routing_is_exclusive(
            samples in prop::collection::vec((any::<bool>(), 0i32..320, 0i32..240), 1..60),
            modal in any::<bool>(),
            app in any::<bool>(),
            kb in any::<bool>(),
        ) {
            let mut router = GestureRouter::new();
            let mut t = MockTargets::new();
            t.modal = modal;
            t.app = app;
            t.keyboard_top = if kb { Some(140) } else { None };

            for (i, (pressed, x, y)) in samples.into_iter().enumerate() {
                let before = t.delivered.len();
                let routed = router.route(TouchSample { pressed, x, y }, i as u32 * 10, &mut t);
                let after = t.delivered.len();
                prop_assert!(after - before <= 1);
                prop_assert_eq!(routed.is_some(), after - before == 1);
                if modal {
                    if let Some(r) = routed {
                        prop_assert_eq!(r.layer, Layer::Modal);
                    }
                }
            }
        }
    }
}
