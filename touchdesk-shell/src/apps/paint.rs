//! Paint window
//!
//! Thin wrapper that maps screen touches onto the paint state machine:
//! tool and colour taps change settings, presses on the canvas start a
//! stroke that keeps receiving clamped cells until release.

use touchdesk_core::config::PaintConfig;
use touchdesk_core::input::{Response, TouchEvent, TouchPhase};
use touchdesk_core::paint::view::{cell_at, cell_clamped, close_hit, swatch_at, tool_at, GRID_H, GRID_W, PALETTE};
use touchdesk_core::paint::PaintToolStateMachine;
use touchdesk_display::{DrawSurface, Rect};

use super::{App, Env, OpenError};

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    tools: bool,
    palette: bool,
    status: bool,
}

pub struct PaintApp {
    config: PaintConfig,
    screen: Rect,
    /// Allocated on first open and kept, so the picture survives closing
    machine: Option<PaintToolStateMachine>,
    /// The current gesture started on the canvas
    stroking: bool,
    dirty: Dirty,
}

impl PaintApp {
    pub fn new(config: PaintConfig, screen: Rect) -> Self {
        Self {
            config,
            screen,
            machine: None,
            stroking: false,
            dirty: Dirty::default(),
        }
    }

    pub fn machine(&self) -> Option<&PaintToolStateMachine> {
        self.machine.as_ref()
    }

    fn on_press(&mut self, event: TouchEvent, now_ms: u32) -> Response {
        let p = event.pos;
        if close_hit(self.screen, p) {
            return Response::CloseSelf;
        }
        let Some(machine) = self.machine.as_mut() else {
            return Response::NoOp;
        };

        if let Some(tool) = tool_at(p) {
            machine.set_tool(tool);
            self.dirty.tools = true;
            return Response::Changed;
        }
        if let Some(i) = swatch_at(self.screen, p) {
            machine.set_color(PALETTE[i]);
            self.dirty.palette = true;
            return Response::Changed;
        }
        if let Some(cell) = cell_at(p) {
            machine.press(cell, now_ms);
            self.stroking = true;
            return Response::Changed;
        }
        Response::NoOp
    }
}

impl App for PaintApp {
    fn open(&mut self, _env: &mut Env<'_>) -> Result<(), OpenError> {
        if self.machine.is_none() {
            let machine = PaintToolStateMachine::new(&self.config, GRID_W, GRID_H).map_err(|_e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("paint: canvas allocation failed: {:?}", _e);
                OpenError::OutOfMemory
            })?;
            self.machine = Some(machine);
        }
        self.stroking = false;
        Ok(())
    }

    fn close(&mut self, env: &mut Env<'_>) {
        if let Some(machine) = self.machine.as_mut() {
            if self.stroking {
                machine.release(env.now_ms);
            }
            machine.commit_selection();
        }
        self.stroking = false;
    }

    fn handle(&mut self, event: TouchEvent, env: &mut Env<'_>) -> Response {
        let now = env.now_ms;
        match event.phase {
            TouchPhase::Press => self.on_press(event, now),
            TouchPhase::Held | TouchPhase::Release if self.stroking => {
                let Some(machine) = self.machine.as_mut() else {
                    return Response::NoOp;
                };
                if event.phase == TouchPhase::Held {
                    machine.held(cell_clamped(event.pos), now);
                } else {
                    machine.release(now);
                    self.stroking = false;
                }
                Response::Changed
            }
            _ => Response::NoOp,
        }
    }

    fn tick(&mut self, env: &mut Env<'_>) {
        if let Some(machine) = self.machine.as_mut() {
            if machine.take_status_dirty(env.now_ms) {
                self.dirty.status = true;
            }
        }
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) {
        self.dirty = Dirty::default();
        if let Some(machine) = self.machine.as_mut() {
            machine.draw(surface, env.now_ms);
        }
    }

    fn flush(&mut self, surface: &mut dyn DrawSurface, env: &Env<'_>) -> bool {
        let Some(machine) = self.machine.as_mut() else {
            return false;
        };
        let dirty = core::mem::take(&mut self.dirty);
        if dirty.tools {
            machine.draw_tools(surface);
        }
        if dirty.palette {
            machine.draw_palette(surface);
        }
        if dirty.status {
            machine.draw_status(surface, env.now_ms);
        }
        let cells = machine.flush(surface);
        dirty.tools || dirty.palette || dirty.status || cells
    }

    /// The paint window has its own title bar without a status strip
    fn status_slot(&self, _screen: Rect) -> Option<Rect> {
        None
    }
}
