//!Raspberry Pi I2C transport for the PCA9685 driver. It is a wrapper around
//!the rppal library.
//!
//! [`I2cTransport`] adapts an rppal I2C peripheral, addressed at the chip's
//! slave address, into the blocking `Read + Write` byte stream that
//! `pca9685_core` consumes. Bytes written land at the chip's currently
//! addressed register, with hardware auto-increment advancing the address
//! within one write call.

use std::io::{self, Read, Write};

use rppal::i2c::I2c;
use tracing::debug;

pub use rppal::i2c::Error as I2cError;

///Default slave address of the PCA9685.
pub const DEFAULT_ADDRESS: u16 = 0x40;

///An I2C bus handle bound to one slave address.
pub struct I2cTransport {
    bus: I2c,
}

impl I2cTransport {
    ///Open I2C bus `bus` (e.g. 1 for `/dev/i2c-1`) addressing `address`.
    pub fn new(bus: u8, address: u16) -> Result<Self, I2cError> {
        Self::with_bus(I2c::with_bus(bus)?, address)
    }

    ///Open the platform default I2C bus addressing the chip's default address.
    pub fn open_default() -> Result<Self, I2cError> {
        Self::with_bus(I2c::new()?, DEFAULT_ADDRESS)
    }

    ///Bind an already opened bus to `address`.
    pub fn with_bus(mut bus: I2c, address: u16) -> Result<Self, I2cError> {
        bus.set_slave_address(address)?;
        debug!("i2c bus {} addressing {:#04x}", bus.bus(), address);
        Ok(Self { bus })
    }
}

impl Read for I2cTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.bus
            .read(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }
}

impl Write for I2cTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bus
            .write(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
