//!Error type for the driver.

use std::fmt::{self, Display, Formatter};
use std::io;

use crate::{FRACTION_MAX, PRESCALE_MAX, PRESCALE_MIN};

///All the ways a driver call can fail.
///
///Validation failures (`UnsupportedFrequency`, `FractionOutOfRange`,
///`DurationTooLong`) are raised before any bus access, so a rejected request
///never changes hardware state. A `Transport` failure in the middle of the
///frequency sequence can leave the chip in an intermediate state (possibly
///still asleep); recover with a fresh [`reset`](crate::Pca9685::reset) and
///[`set_frequency`](crate::Pca9685::set_frequency).
#[derive(Debug)]
pub enum Error {
    ///An underlying bus read or write failed. `op` names the driver operation
    ///that was on the wire.
    Transport {
        op: &'static str,
        source: io::Error,
    },
    ///The requested frequency maps to a prescale value outside the range the
    ///chip accepts.
    UnsupportedFrequency { hz: u16 },
    ///An on/off fraction exceeds the 12-bit maximum.
    FractionOutOfRange { value: u16 },
    ///The requested pulse (plus shift) does not fit in one period at the
    ///configured frequency.
    DurationTooLong { requested_us: u32, period_us: u32 },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { op, source } => {
                write!(f, "bus transport failure during {}: {}", op, source)
            }
            Self::UnsupportedFrequency { hz } => {
                write!(
                    f,
                    "device cannot oscillate at {} Hz, prescale must be in {}..={}",
                    hz, PRESCALE_MIN, PRESCALE_MAX
                )
            }
            Self::FractionOutOfRange { value } => {
                write!(
                    f,
                    "on/off fraction {} is greater than {}",
                    value, FRACTION_MAX
                )
            }
            Self::DurationTooLong {
                requested_us,
                period_us,
            } => {
                write!(
                    f,
                    "on period of {} us does not fit in the {} us period",
                    requested_us, period_us
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}
