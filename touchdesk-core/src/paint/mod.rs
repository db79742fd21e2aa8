//! Paint canvas and tool state machine

pub mod canvas;
pub mod machine;
pub mod raster;
pub mod tool;
pub mod view;

pub use canvas::{AllocError, Canvas, ScratchBudget, Selection, BACKGROUND};
pub use machine::{PaintToolStateMachine, Preview, PreviewShape};
pub use tool::Tool;
