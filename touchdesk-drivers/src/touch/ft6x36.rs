//! FT6x36 capacitive touch controller (I2C)
//!
//! FT6206 / FT6236 / FT6336 parts share one register map. The driver runs
//! the chip in polling mode and reads the first touch point only.
//!
//! # Register block
//!
//! A single burst read starting at `TD_STATUS` returns:
//! - `TD_STATUS`: number of touch points in bits 3:0 (0..=2 are valid)
//! - `P1_XH`: event flag in bits 7:6, X bits 11:8 in bits 3:0
//! - `P1_XL`: X bits 7:0
//! - `P1_YH`: touch id in bits 7:4, Y bits 11:8 in bits 3:0
//! - `P1_YL`: Y bits 7:0

use touchdesk_core::traits::{TouchSample, TouchSource};
use touchdesk_hal::I2cBus;

/// Fixed 7-bit bus address
pub const FT6X36_ADDR: u8 = 0x38;

/// FT6x36 register addresses
pub mod reg {
    /// Device mode (0 = working)
    pub const DEV_MODE: u8 = 0x00;
    /// Touch point count
    pub const TD_STATUS: u8 = 0x02;
    /// First point, X high nibble and event flag
    pub const P1_XH: u8 = 0x03;
    /// Touch detection threshold
    pub const TH_GROUP: u8 = 0x80;
    /// Chip id
    pub const CHIP_ID: u8 = 0xA3;
    /// Interrupt mode (0 = polling)
    pub const G_MODE: u8 = 0xA4;
}

/// Chip ids the register map is known to match
const KNOWN_CHIP_IDS: [u8; 4] = [0x06, 0x11, 0x36, 0x64];

/// Default touch threshold
const DEFAULT_THRESHOLD: u8 = 40;

/// Touch driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchError<E> {
    /// The I2C transfer failed
    Bus(E),
    /// The device answered with an unexpected chip id
    UnknownChip(u8),
}

/// Mapping from panel axes to screen axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Panel axes used as-is
    Native,
    /// Panel mounted a quarter turn: screen x is panel y, screen y is the
    /// mirrored panel x
    #[default]
    Landscape,
}

/// FT6x36 driver
pub struct Ft6x36<B> {
    bus: B,
    width: i32,
    height: i32,
    orientation: Orientation,
}

impl<B: I2cBus> Ft6x36<B> {
    /// Driver for a screen of `width` × `height` pixels
    pub fn new(bus: B, width: i32, height: i32) -> Self {
        Self {
            bus,
            width: width.max(1),
            height: height.max(1),
            orientation: Orientation::default(),
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, TouchError<B::Error>> {
        let mut buf = [0u8; 1];
        self.bus
            .write_read(FT6X36_ADDR, &[reg], &mut buf)
            .map_err(TouchError::Bus)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), TouchError<B::Error>> {
        self.bus
            .write(FT6X36_ADDR, &[reg, value])
            .map_err(TouchError::Bus)
    }

    pub fn chip_id(&mut self) -> Result<u8, TouchError<B::Error>> {
        self.read_reg(reg::CHIP_ID)
    }

    /// Check the chip id and switch to polling mode
    pub fn init(&mut self) -> Result<(), TouchError<B::Error>> {
        let id = self.chip_id()?;
        if !KNOWN_CHIP_IDS.contains(&id) {
            return Err(TouchError::UnknownChip(id));
        }
        self.write_reg(reg::DEV_MODE, 0)?;
        self.write_reg(reg::G_MODE, 0)?;
        self.write_reg(reg::TH_GROUP, DEFAULT_THRESHOLD)?;

        #[cfg(feature = "defmt")]
        defmt::info!("FT6x36 chip id {:#x} ready", id);

        Ok(())
    }

    /// Read the first touch point, oriented and clamped to the screen
    pub fn read(&mut self) -> Result<TouchSample, TouchError<B::Error>> {
        let mut buf = [0u8; 5];
        self.bus
            .write_read(FT6X36_ADDR, &[reg::TD_STATUS], &mut buf)
            .map_err(TouchError::Bus)?;

        let count = buf[0] & 0x0F;
        if count == 0 || count > 2 {
            return Ok(TouchSample::RELEASED);
        }

        let raw_x = (((buf[1] & 0x0F) as i32) << 8) | buf[2] as i32;
        let raw_y = (((buf[3] & 0x0F) as i32) << 8) | buf[4] as i32;
        let (x, y) = self.orient(raw_x, raw_y);
        Ok(TouchSample::down(x, y))
    }

    fn orient(&self, raw_x: i32, raw_y: i32) -> (i32, i32) {
        let (x, y) = match self.orientation {
            Orientation::Native => (raw_x, raw_y),
            Orientation::Landscape => (raw_y, self.height - 1 - raw_x),
        };
        (x.clamp(0, self.width - 1), y.clamp(0, self.height - 1))
    }
}

impl<B: I2cBus> TouchSource for Ft6x36<B> {
    /// Bus errors read as "not pressed" so the polling loop never faults
    fn poll(&mut self) -> TouchSample {
        match self.read() {
            Ok(sample) => sample,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("touch read failed");
                TouchSample::RELEASED
            }
        }
    }
}
