//!Register-level driver for the PCA9685 16-channel PWM controller.
//!
//! The driver is generic over any blocking byte-stream bus handle implementing
//! `std::io::Read + std::io::Write`. On real hardware that handle is an I2C
//! peripheral addressing the chip (see the `pca9685_rpi_i2c` crate); in tests it
//! is an in-memory fake.
//!
//! Construct a [`Pca9685`] over a bus, set the output frequency, then acquire a
//! [`Channels`] group for one channel, a contiguous range, or the all-channels
//! broadcast block, and program duty cycles against it.

pub mod error;

mod channels;
mod device;

pub use channels::Channels;
pub use device::Pca9685;
pub use error::Error;

///Internal oscillator frequency, 25 MHz per the datasheet.
pub const CLOCK_HZ: u32 = 25_000_000;

///Number of discrete time fractions in one PWM period (12-bit resolution).
pub const FRACTIONS_PER_PERIOD: u16 = 4096;

///Largest valid on/off fraction value.
pub const FRACTION_MAX: u16 = 0x0FFF;

///Default I2C slave address of the chip.
pub const DEFAULT_ADDRESS: u8 = 0x40;

///Smallest value the PRE_SCALE register accepts.
pub const PRESCALE_MIN: u8 = 3;

///Largest value the PRE_SCALE register accepts.
pub const PRESCALE_MAX: u8 = 255;

//register map
pub const REG_MODE1: u8 = 0x00;
pub const REG_MODE2: u8 = 0x01;
pub const REG_SUBADR1: u8 = 0x02;
pub const REG_SUBADR2: u8 = 0x03;
pub const REG_SUBADR3: u8 = 0x04;
pub const REG_ALLCALLADR: u8 = 0x05;

///First channel's on-low register. Each channel occupies 4 consecutive
///registers (on-low, on-high, off-low, off-high), so channel n starts at
///`REG_LED0_ON_L + 4 * n`.
pub const REG_LED0_ON_L: u8 = 0x06;

///Broadcast block: writes here apply to every channel at once.
pub const REG_LED_ALL_ON_L: u8 = 0xFA;

pub const REG_PRESCALE: u8 = 0xFE;

//MODE1 bits
pub const MODE1_RESTART: u8 = 0b1000_0000;
pub const MODE1_EXTCLK: u8 = 0b0100_0000;
pub const MODE1_AUTO_INCREMENT: u8 = 0b0010_0000;
pub const MODE1_SLEEP: u8 = 0b0001_0000;
pub const MODE1_SUB1: u8 = 0b0000_1000;
pub const MODE1_SUB2: u8 = 0b0000_0100;
pub const MODE1_SUB3: u8 = 0b0000_0010;
pub const MODE1_ALLCALL: u8 = 0b0000_0001;

///Bit 12 of an on/off register pair forces the channel permanently high/low,
///overriding the fraction timing.
pub const FULL_ON_OFF: u16 = 0x1000;

pub(crate) const BYTES_PER_CHANNEL: usize = 4;
