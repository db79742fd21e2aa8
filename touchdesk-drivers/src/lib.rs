//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in touchdesk-core, built on the bus traits of touchdesk-hal:
//!
//! - Touch controllers (FT6x36 family over I2C)

#![no_std]
#![deny(unsafe_code)]

pub mod touch;
