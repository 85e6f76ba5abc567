use std::io::{Read, Write};

use crate::error::Error;
use crate::{BYTES_PER_CHANNEL, FRACTION_MAX, FULL_ON_OFF};

///A view over a contiguous run of channel register blocks, or the broadcast
///block covering all channels at once.
///
///Acquired from [`Pca9685`](crate::Pca9685); it borrows the device's bus, so
///all bus access stays serialized through one handle. The frequency used by
///the duration setters is snapshotted at acquisition and does not follow later
///`set_frequency` calls.
pub struct Channels<'a, B> {
    bus: &'a mut B,
    base_address: u8,
    frequency: u16,
    count: u16,
}

impl<'a, B: Read + Write> Channels<'a, B> {
    pub(crate) fn new(bus: &'a mut B, base_address: u8, frequency: u16, count: u16) -> Self {
        Self {
            bus,
            base_address,
            frequency,
            count,
        }
    }

    ///Program the raw on/off fraction pair (0-4095 each) into every channel of
    ///the group. The output rises at fraction `on` and falls at fraction `off`
    ///within each period.
    pub fn set_period(&mut self, on: u16, off: u16) -> Result<(), Error> {
        if on > FRACTION_MAX {
            return Err(Error::FractionOutOfRange { value: on });
        }
        if off > FRACTION_MAX {
            return Err(Error::FractionOutOfRange { value: off });
        }
        self.write_on_off(on, off)
    }

    ///Force the group's outputs permanently high via the full-on sentinel bit.
    pub fn full_on(&mut self) -> Result<(), Error> {
        self.write_on_off(FULL_ON_OFF, 0)
    }

    ///Force the group's outputs permanently low via the full-off sentinel bit.
    pub fn full_off(&mut self) -> Result<(), Error> {
        self.write_on_off(0, FULL_ON_OFF)
    }

    ///Set a pulse of `microseconds` starting at the top of each period.
    ///
    ///Fails with [`Error::DurationTooLong`] if the pulse does not fit in one
    ///period at the snapshotted frequency. Only meaningful after a successful
    ///`set_frequency`; with the frequency still 0 the period check degenerates
    ///and the written fraction pair is (0, 0).
    pub fn set_on_duration(&mut self, microseconds: u16) -> Result<(), Error> {
        self.set_on_duration_with_shift(0, microseconds)
    }

    ///Set a pulse of `microseconds` starting `shift_microseconds` into each
    ///period. Shifting lets channels sharing a supply stagger their rising
    ///edges.
    pub fn set_on_duration_with_shift(
        &mut self,
        shift_microseconds: u16,
        microseconds: u16,
    ) -> Result<(), Error> {
        let period_us = 1_000_000.0 / f64::from(self.frequency);
        let end_us = u32::from(shift_microseconds) + u32::from(microseconds);
        if f64::from(end_us) > period_us {
            return Err(Error::DurationTooLong {
                requested_us: end_us,
                period_us: period_us as u32,
            });
        }

        //how long one of the 4095 fractions lasts
        let fraction_us = period_us / f64::from(FRACTION_MAX);

        let on = (f64::from(shift_microseconds) / fraction_us).round_ties_even() as u16;
        let off = (f64::from(end_us) / fraction_us).round_ties_even() as u16;
        self.set_period(on, off)
    }

    ///Assemble one buffer with identical little-endian on/off pairs for every
    ///channel and send it as a single write. The chip's auto-increment
    ///addressing walks the consecutive registers within that one call;
    ///splitting it into per-channel writes would restart addressing at the
    ///base each time.
    fn write_on_off(&mut self, on: u16, off: u16) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(1 + usize::from(self.count) * BYTES_PER_CHANNEL);
        buf.push(self.base_address);
        for _ in 0..self.count {
            buf.extend_from_slice(&on.to_le_bytes());
            buf.extend_from_slice(&off.to_le_bytes());
        }

        self.bus
            .write_all(&buf)
            .map_err(|source| Error::Transport {
                op: "duty-write",
                source,
            })
    }
}
