//! Paint tool state machine
//!
//! Driven with grid cells, one call per edge event:
//!
//! - freehand tools stamp on press and join held samples with lines
//! - Fill floods on press only
//! - shape tools show a rubber-band preview while held and commit on release
//! - the selection tools either move the floating selection (press inside
//!   it) or commit it and drag out a new one (press outside)
//!
//! Nothing here draws. Every change is recorded as damaged cell rectangles
//! which the view repaints, so all of it runs headless.

use alloc::vec::Vec;

use touchdesk_display::{Point, Rect, Rgb565};

use crate::config::PaintConfig;
use crate::damage::DamageList;
use crate::input::{DragController, DragToken};

use super::canvas::{AllocError, Canvas, ScratchBudget, Selection, BACKGROUND};
use super::raster;
use super::tool::Tool;

pub const STATUS_NO_FILL_RAM: &str = "Not enough RAM for Fill";
pub const STATUS_DEFAULT: &str = "For Help, click Help Topics on the Help Menu.";

/// Outline shown while a shape or selection is being dragged out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PreviewShape {
    Line,
    Rect,
    Ellipse,
}

/// Uncommitted rubber-band outline, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Preview {
    pub shape: PreviewShape,
    pub from: Point,
    pub to: Point,
}

impl Preview {
    /// Cells the outline may touch, with a one-cell margin
    pub fn bounds(&self) -> Rect {
        raster::shape_bounds(self.from, self.to, 1)
    }

    /// Emit every cell of the outline
    pub fn rasterize(&self, plot: &mut impl FnMut(i32, i32)) {
        match self.shape {
            PreviewShape::Line => raster::line(self.from, self.to, 0, plot),
            PreviewShape::Rect => raster::rect_outline(self.from, self.to, 0, plot),
            PreviewShape::Ellipse => raster::ellipse_outline(self.from, self.to, 0, plot),
        }
    }
}

/// Press in progress
#[derive(Debug, Clone, Copy)]
enum Stroke {
    /// Stamps are joined from the previous cell
    Freehand { last: Point },
    /// Shape or new selection, anchored at press-start
    Anchored { anchor: Point, last: Point },
    /// Dragging the floating selection
    MoveSelection { token: DragToken, origin: Point },
    /// Press already did everything it will do
    Spent,
}

#[derive(Debug, Clone, Copy)]
struct Status {
    text: &'static str,
    until_ms: u32,
}

/// Canvas, floating selection and the active tool
#[derive(Debug)]
pub struct PaintToolStateMachine {
    canvas: Canvas,
    selection: Option<Selection>,
    tool: Tool,
    color: Rgb565,

    stroke: Option<Stroke>,
    preview: Option<Preview>,
    mover: DragController,

    budget: ScratchBudget,
    fill_disabled: bool,
    status: Option<Status>,
    status_ms: u32,
    status_dirty: bool,

    damage: DamageList,
}

impl PaintToolStateMachine {
    /// Blank `width` × `height` canvas
    pub fn new(config: &PaintConfig, width: i32, height: i32) -> Result<Self, AllocError> {
        Ok(Self {
            canvas: Canvas::new(width, height)?,
            selection: None,
            tool: Tool::default(),
            color: touchdesk_display::color::palette::BLACK,
            stroke: None,
            preview: None,
            // The selection follows the finger from the first sample
            mover: DragController::with_thresholds(0, u32::MAX),
            budget: ScratchBudget::new(config.scratch_budget_cells),
            fill_disabled: false,
            status: None,
            status_ms: config.status_ms,
            status_dirty: false,
            damage: DamageList::new(),
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn preview(&self) -> Option<Preview> {
        self.preview
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Rgb565 {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb565) {
        self.color = color;
    }

    pub fn is_fill_disabled(&self) -> bool {
        self.fill_disabled
    }

    /// Whether a press is in progress
    pub fn is_pressed(&self) -> bool {
        self.stroke.is_some()
    }

    /// Colour shown at a cell: the floating selection over the canvas
    pub fn pixel(&self, x: i32, y: i32) -> Rgb565 {
        self.selection
            .as_ref()
            .and_then(|s| s.get(x, y))
            .or_else(|| self.canvas.get(x, y))
            .unwrap_or(BACKGROUND)
    }

    /// Pending damaged cell rectangles
    pub fn damage_mut(&mut self) -> &mut DamageList {
        &mut self.damage
    }

    /// Switch tools from the palette
    ///
    /// Any press in progress is dropped and a floating selection is
    /// committed. Selecting Fill again re-arms it after an allocation
    /// failure.
    pub fn set_tool(&mut self, tool: Tool) {
        self.cancel_stroke();
        self.commit_selection();
        if tool == Tool::Fill {
            self.fill_disabled = false;
        }
        self.tool = tool;
    }

    /// Merge the floating selection back into the canvas
    pub fn commit_selection(&mut self) {
        if let Some(sel) = self.selection.take() {
            self.damage.add(sel.rect().inflate(1));
            sel.commit(&mut self.canvas, &mut self.budget);
            // Memory came back; Fill may try again
            self.fill_disabled = false;
        }
    }

    /// Wipe the canvas and drop the selection
    pub fn clear(&mut self) {
        self.cancel_stroke();
        if let Some(sel) = self.selection.take() {
            self.budget.free(sel.rect().area() as usize);
        }
        self.fill_disabled = false;
        self.canvas.clear();
        self.damage.add(self.canvas.bounds());
    }

    /// Press-start on cell `cell`
    pub fn press(&mut self, cell: Point, now_ms: u32) {
        let cell = self.canvas.clamp(cell);
        self.cancel_stroke();

        let stroke = match self.tool {
            Tool::Pencil | Tool::Brush | Tool::Erase => {
                let (color, r) = self.ink();
                self.paint_line(cell, cell, color, r);
                Stroke::Freehand { last: cell }
            }
            Tool::Fill => {
                self.fill(cell, now_ms);
                Stroke::Spent
            }
            Tool::Text => {
                let color = self.color;
                let canvas = &mut self.canvas;
                raster::text_marker(cell, &mut |x, y| canvas.set(x, y, color));
                self.damage.add(Rect::new(cell.x, cell.y, 3, 5));
                Stroke::Spent
            }
            Tool::Line | Tool::Rect | Tool::Ellipse => Stroke::Anchored {
                anchor: cell,
                last: cell,
            },
            Tool::Select | Tool::RectSelect => match self.grabbed_selection(cell) {
                Some(origin) => Stroke::MoveSelection {
                    token: self.mover.begin_latched(cell, now_ms),
                    origin,
                },
                None => {
                    self.commit_selection();
                    Stroke::Anchored {
                        anchor: cell,
                        last: cell,
                    }
                }
            },
        };
        self.stroke = Some(stroke);
    }

    /// Held sample at `cell`
    pub fn held(&mut self, cell: Point, now_ms: u32) {
        let cell = self.canvas.clamp(cell);
        let Some(stroke) = self.stroke else {
            return;
        };

        match stroke {
            Stroke::Freehand { last } => {
                let (color, r) = self.ink();
                self.paint_line(last, cell, color, r);
                self.stroke = Some(Stroke::Freehand { last: cell });
            }
            Stroke::Anchored { anchor, .. } => {
                let shape = match self.tool {
                    Tool::Line => PreviewShape::Line,
                    Tool::Ellipse => PreviewShape::Ellipse,
                    _ => PreviewShape::Rect,
                };
                let next = Preview {
                    shape,
                    from: anchor,
                    to: cell,
                };
                self.damage
                    .add_change(self.preview.map(|p| p.bounds()), Some(next.bounds()));
                self.preview = Some(next);
                self.stroke = Some(Stroke::Anchored { anchor, last: cell });
            }
            Stroke::MoveSelection { mut token, origin } => {
                self.mover.update(&mut token, cell, now_ms);
                let bounds = self.canvas.bounds();
                if let Some(sel) = self.selection.as_mut() {
                    let old = sel.rect().inflate(1);
                    sel.move_to(origin + token.offset(), bounds);
                    let new = sel.rect().inflate(1);
                    if old != new {
                        self.damage.add_change(Some(old), Some(new));
                    }
                }
                self.stroke = Some(Stroke::MoveSelection { token, origin });
            }
            Stroke::Spent => {}
        }
    }

    /// Release; without a matching press this does nothing
    pub fn release(&mut self, _now_ms: u32) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        let preview = self.preview.take();
        if let Some(p) = preview {
            self.damage.add(p.bounds());
        }

        if let Stroke::Anchored { anchor, last } = stroke {
            match self.tool {
                Tool::Line | Tool::Rect | Tool::Ellipse => self.commit_shape(anchor, last),
                // A plain tap only commits; a rubber band cuts a new selection
                Tool::Select | Tool::RectSelect if preview.is_some() => {
                    self.cut_selection(Rect::from_points(anchor, last))
                }
                _ => {}
            }
        }
    }

    /// Text for the status bar at `now_ms`
    pub fn status_text(&self, now_ms: u32) -> &'static str {
        match self.status {
            Some(s) if now_ms.wrapping_sub(s.until_ms) as i32 <= 0 => s.text,
            _ => STATUS_DEFAULT,
        }
    }

    /// Whether the status bar must be repainted; clears the flag
    ///
    /// Also reports a transient message that has just run out.
    pub fn take_status_dirty(&mut self, now_ms: u32) -> bool {
        if let Some(s) = self.status {
            if now_ms.wrapping_sub(s.until_ms) as i32 > 0 {
                self.status = None;
                self.status_dirty = true;
            }
        }
        core::mem::take(&mut self.status_dirty)
    }

    fn set_status(&mut self, text: &'static str, now_ms: u32) {
        self.status = Some(Status {
            text,
            until_ms: now_ms.wrapping_add(self.status_ms),
        });
        self.status_dirty = true;
    }

    /// Colour and radius of the freehand tool
    fn ink(&self) -> (Rgb565, i32) {
        let color = if self.tool == Tool::Erase {
            BACKGROUND
        } else {
            self.color
        };
        (color, self.tool.stamp_radius())
    }

    fn paint_line(&mut self, from: Point, to: Point, color: Rgb565, r: i32) {
        let canvas = &mut self.canvas;
        raster::line(from, to, r, &mut |x, y| canvas.set(x, y, color));
        self.damage.add(raster::shape_bounds(from, to, r));
    }

    fn commit_shape(&mut self, anchor: Point, last: Point) {
        let color = self.color;
        let canvas = &mut self.canvas;
        let mut plot = |x, y| canvas.set(x, y, color);
        match self.tool {
            Tool::Line => raster::line(anchor, last, 0, &mut plot),
            Tool::Rect => raster::rect_outline(anchor, last, 0, &mut plot),
            _ => raster::ellipse_outline(anchor, last, 0, &mut plot),
        }
        self.damage.add(raster::shape_bounds(anchor, last, 1));
    }

    fn cut_selection(&mut self, rect: Rect) {
        match Selection::cut(&mut self.canvas, rect, &mut self.budget) {
            Ok(sel) => {
                self.damage.add(sel.rect().inflate(1));
                self.selection = Some(sel);
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("selection dropped: {:?}", _e);
            }
        }
    }

    fn fill(&mut self, cell: Point, now_ms: u32) {
        if self.fill_disabled {
            return;
        }
        if self.canvas.get(cell.x, cell.y) == Some(self.color) {
            return;
        }

        let cells = self.canvas.len();
        let mut worklist: Vec<u32> = match self.budget.alloc(cells) {
            Ok(buf) => buf,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("flood fill disabled: {:?}", _e);
                self.fill_disabled = true;
                self.set_status(STATUS_NO_FILL_RAM, now_ms);
                return;
            }
        };
        if let Some(bbox) = raster::flood_fill(&mut self.canvas, cell, self.color, &mut worklist) {
            self.damage.add(bbox);
        }
        self.budget.free(cells);
    }

    /// Origin of the floating selection if `cell` is inside it
    fn grabbed_selection(&self, cell: Point) -> Option<Point> {
        self.selection
            .as_ref()
            .filter(|s| s.contains(cell))
            .map(|s| s.origin())
    }

    /// Drop a press in progress, erasing its preview
    fn cancel_stroke(&mut self) {
        self.stroke = None;
        if let Some(p) = self.preview.take() {
            self.damage.add(p.bounds());
        }
    }
}
