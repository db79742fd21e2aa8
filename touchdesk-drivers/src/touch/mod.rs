//! Touch panel controllers

pub mod ft6x36;

pub use ft6x36::{Ft6x36, Orientation, TouchError, FT6X36_ADDR};
