use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::channels::Channels;
use crate::error::Error;
use crate::{
    CLOCK_HZ, FRACTIONS_PER_PERIOD, MODE1_ALLCALL, MODE1_AUTO_INCREMENT, MODE1_RESTART,
    MODE1_SLEEP, PRESCALE_MAX, PRESCALE_MIN, REG_LED0_ON_L, REG_LED_ALL_ON_L, REG_MODE1,
    REG_PRESCALE,
};

//the oscillator needs up to 500us to stabilize after leaving sleep mode
const OSCILLATOR_STARTUP: Duration = Duration::from_micros(500);

///One PCA9685 chip on a bus.
///
///The bus handle is any blocking byte stream addressing the chip; the device
///never closes it. Construction performs the mandatory MODE1 reset.
pub struct Pca9685<B> {
    bus: B,
    frequency: u16,
}

impl<B: Read + Write> Pca9685<B> {
    ///Construct a device over `bus` and reset it.
    pub fn new(bus: B) -> Result<Self, Error> {
        let mut device = Self { bus, frequency: 0 };
        device.reset()?;
        Ok(device)
    }

    ///Write MODE1 back to its power-on value, clearing sleep and restart state.
    pub fn reset(&mut self) -> Result<(), Error> {
        debug!("resetting MODE1");
        self.write_bus("reset", &[REG_MODE1, 0x00])
    }

    ///The frequency last programmed with [`set_frequency`](Self::set_frequency),
    ///or 0 if it has not succeeded yet.
    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    ///Program the global output frequency in Hz.
    ///
    ///The prescale register only latches while the oscillator is asleep, so
    ///this runs the full sleep / reprogram / wake / restart sequence. The chip
    ///supports roughly 24 to 1526 Hz; anything outside that range is rejected
    ///with [`Error::UnsupportedFrequency`] before any bus traffic. A transport
    ///failure mid-sequence can leave the chip asleep; recover with
    ///[`reset`](Self::reset) and another `set_frequency` call.
    pub fn set_frequency(&mut self, hz: u16) -> Result<(), Error> {
        let prescale = prescale_for(hz).ok_or(Error::UnsupportedFrequency { hz })?;

        //point the register pointer at MODE1, then read the current value back
        self.write_bus("frequency-read", &[REG_MODE1])?;
        let mut buf = [0u8; 1];
        self.bus.read_exact(&mut buf).map_err(|source| Error::Transport {
            op: "frequency-read",
            source,
        })?;
        let mode1 = buf[0];
        trace!("MODE1 read back as {:#04x}", mode1);

        //clear restart and enter sleep so the prescale write takes
        let sleep_mode1 = (mode1 & !MODE1_RESTART) | MODE1_SLEEP;
        self.write_bus("frequency-write", &[REG_MODE1, sleep_mode1])?;
        self.write_bus("frequency-write", &[REG_PRESCALE, prescale])?;

        //restore the original MODE1, wait for the oscillator, then restart
        self.write_bus("frequency-write", &[REG_MODE1, mode1])?;
        thread::sleep(OSCILLATOR_STARTUP);
        let restart_mode1 = mode1 | MODE1_RESTART | MODE1_AUTO_INCREMENT | MODE1_ALLCALL;
        self.write_bus("frequency-write", &[REG_MODE1, restart_mode1])?;

        debug!("prescale {} programmed for {} Hz", prescale, hz);
        self.frequency = hz;
        Ok(())
    }

    ///Force every channel permanently off.
    pub fn turn_off(&mut self) -> Result<(), Error> {
        self.all_channels().full_off()
    }

    ///A group addressing the single channel `index` (0-15).
    pub fn channel(&mut self, index: u8) -> Channels<'_, B> {
        Channels::new(
            &mut self.bus,
            index * 4 + REG_LED0_ON_L,
            self.frequency,
            1,
        )
    }

    ///A group addressing `count` consecutive channels starting at `first`.
    pub fn channels(&mut self, first: u8, count: u16) -> Channels<'_, B> {
        Channels::new(
            &mut self.bus,
            first * 4 + REG_LED0_ON_L,
            self.frequency,
            count,
        )
    }

    ///A group addressing the broadcast block, applying to all 16 channels.
    pub fn all_channels(&mut self) -> Channels<'_, B> {
        Channels::new(&mut self.bus, REG_LED_ALL_ON_L, self.frequency, 1)
    }

    fn write_bus(&mut self, op: &'static str, bytes: &[u8]) -> Result<(), Error> {
        self.bus
            .write_all(bytes)
            .map_err(|source| Error::Transport { op, source })
    }
}

///Datasheet prescale equation: `round_half_even(clock / (4096 * hz)) - 1`,
///valid only in `PRESCALE_MIN..=PRESCALE_MAX`. Rounding is explicitly
///half-to-even to match the datasheet computation.
fn prescale_for(hz: u16) -> Option<u8> {
    let exact = f64::from(CLOCK_HZ) / (f64::from(FRACTIONS_PER_PERIOD) * f64::from(hz));
    let prescale = exact.round_ties_even() - 1.0;
    if prescale >= f64::from(PRESCALE_MIN) && prescale <= f64::from(PRESCALE_MAX) {
        Some(prescale as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;
    use crate::Error;

    #[test]
    fn new_resets_mode1() {
        let mut bus = FakeBus::new();
        Pca9685::new(&mut bus).unwrap();
        assert_eq!(bus.writes, vec![vec![REG_MODE1, 0x00]]);
    }

    #[test]
    fn new_surfaces_reset_failure() {
        let mut bus = FakeBus::failing();
        match Pca9685::new(&mut bus) {
            Err(Error::Transport { op: "reset", .. }) => {}
            other => panic!("expected reset transport error, got {:?}", other.err()),
        }
    }

    #[test]
    fn set_frequency_runs_full_sequence() {
        let mut bus = FakeBus::new();
        //MODE1 reads back with auto-increment already set
        bus.push_read(&[0x20]);
        {
            let mut device = Pca9685::new(&mut bus).unwrap();
            device.set_frequency(50).unwrap();
            assert_eq!(device.frequency(), 50);
        }
        assert_eq!(
            bus.writes,
            vec![
                vec![REG_MODE1, 0x00],  //reset from new
                vec![REG_MODE1],        //register pointer for the read
                vec![REG_MODE1, 0x30],  //restart cleared, sleep set
                vec![REG_PRESCALE, 121],
                vec![REG_MODE1, 0x20],  //original value restored
                vec![REG_MODE1, 0xA1],  //restart | auto-increment | allcall
            ]
        );
    }

    #[test]
    fn set_frequency_rejects_out_of_range_without_writes() {
        let mut bus = FakeBus::new();
        {
            let mut device = Pca9685::new(&mut bus).unwrap();
            for hz in [0u16, 23, 2000] {
                match device.set_frequency(hz) {
                    Err(Error::UnsupportedFrequency { hz: got }) => assert_eq!(got, hz),
                    other => panic!("expected UnsupportedFrequency, got {:?}", other),
                }
            }
            assert_eq!(device.frequency(), 0);
        }
        //only the reset from new touched the bus
        assert_eq!(bus.writes.len(), 1);
    }

    #[test]
    fn frequency_is_kept_on_failure() {
        let mut bus = FakeBus::new();
        //no scripted read reply: the MODE1 read-back fails
        let mut device = Pca9685::new(&mut bus).unwrap();
        match device.set_frequency(50) {
            Err(Error::Transport {
                op: "frequency-read",
                ..
            }) => {}
            other => panic!("expected frequency-read transport error, got {:?}", other),
        }
        assert_eq!(device.frequency(), 0);
    }

    #[test]
    fn prescale_bounds() {
        //datasheet example: 50 Hz -> round(122.07) - 1 = 121
        assert_eq!(prescale_for(50), Some(121));
        //extremes of the supported range
        assert_eq!(prescale_for(24), Some(253));
        assert_eq!(prescale_for(1526), Some(3));
        //just outside
        assert_eq!(prescale_for(23), None);
        assert_eq!(prescale_for(2000), None);
        assert_eq!(prescale_for(0), None);
    }

    #[test]
    fn turn_off_broadcasts_full_off() {
        let mut bus = FakeBus::new();
        {
            let mut device = Pca9685::new(&mut bus).unwrap();
            device.turn_off().unwrap();
        }
        assert_eq!(
            bus.writes[1],
            vec![REG_LED_ALL_ON_L, 0x00, 0x00, 0x00, 0x10]
        );
    }
}
