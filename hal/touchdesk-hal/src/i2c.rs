//! I2C bus abstractions
//!
//! Provides the small I2C master surface the touch controller driver needs,
//! plus an adapter so any `embedded-hal` 1.0 bus can be used directly.

use embedded_hal::i2c::{I2c, Operation};

/// Blocking I2C master with 7-bit addressing
pub trait I2cBus {
    type Error;

    /// Send `data` to `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buf` from `address`
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write a register pointer, then read from it after a repeated start
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Adapter from an `embedded-hal` 1.0 bus to [`I2cBus`]
pub struct EhI2c<T> {
    bus: T,
}

impl<T: I2c> EhI2c<T> {
    /// Wrap a bus
    pub fn new(bus: T) -> Self {
        Self { bus }
    }

    /// Give the bus back
    pub fn release(self) -> T {
        self.bus
    }
}

impl<T: I2c> I2cBus for EhI2c<T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus.transaction(
            address,
            &mut [Operation::Write(write_data), Operation::Read(read_buf)],
        )
    }
}
