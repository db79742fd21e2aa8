//! Touch input interpretation
//!
//! Turns the level-triggered sample stream into edge events, routes each
//! event to exactly one consumer, and classifies presses as tap, long
//! hold or drag.

pub mod drag;
pub mod edge;
pub mod router;

pub use drag::{clamp_position, DragController, DragToken, DropZones, Gesture};
pub use edge::{EdgeDetector, TouchEvent, TouchPhase};
pub use router::{GestureRouter, Layer, Response, RouteTargets, Routed};
