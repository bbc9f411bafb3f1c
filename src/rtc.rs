//! The RTC facade: clock reads and writes, time zone and DST correction, and
//! the per-chip extras (square wave, battery, power failure, leap year).
//!
//! Alarm and memory operations live in alarm.rs and memory.rs as further
//! `impl` blocks on the same type.

use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::{
    calendar::{self, date_to_epoch, epoch_to_date, SECONDS_PER_HOUR},
    chip::{ChipProfile, DeviceType, LeapYearSource, RegisterBlock, MAX_BLOCK},
    console::{debug, trace},
    dst::dst_window,
    shared::{CalendarTime, Epoch, Error, SquareWave},
    state::{Session, State},
    transport::Transport,
};

pub struct Rtc<I2C> {
    pub(crate) transport: Transport<I2C>,
    pub(crate) state: State,
}

impl<I2C> Rtc<I2C> {
    /// Wrap the bus. Nothing is sent until `init`.
    pub fn new(i2c: I2C) -> Self {
        Self {
            transport: Transport::new(i2c, 0x00),
            state: State::new(),
        }
    }

    pub fn release(self) -> I2C {
        self.transport.release()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn device(&self) -> Option<DeviceType> {
        self.state.session.map(|session| session.device)
    }

    pub fn time_zone(&self) -> Option<i8> {
        self.state.session.map(|session| session.time_zone)
    }

    pub fn is_dst_enabled(&self) -> bool {
        self.state.dst_enabled
    }

    pub fn enable_dst(&mut self) {
        self.state.dst_enabled = true;
    }

    pub fn disable_dst(&mut self) {
        self.state.dst_enabled = false;
    }
}

impl<I2C, E> Rtc<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    pub(crate) fn session(&self) -> Result<Session, Error<E>> {
        self.state.session.ok_or(Error::Uninitialized)
    }

    pub(crate) fn profile(&self) -> Result<&'static ChipProfile, Error<E>> {
        Ok(self.session()?.profile())
    }

    /// Bind to a chip family, remember the time zone and start its oscillator.
    /// A time zone outside -12..=14 is rejected before anything is sent.
    pub fn init(&mut self, device: DeviceType, time_zone: i8) -> Result<(), Error<E>> {
        let session = Session::new(device, time_zone)?;
        let profile = session.profile();

        debug!(
            "[DEBUG] [RTC] Init {:?} at {} (GMT{})",
            device, profile.address, time_zone
        );

        self.transport.select(profile.address);
        self.state.session = Some(session);

        if let Some(oscillator) = profile.oscillator {
            let value = self.transport.read_register(oscillator.register)?;
            if !oscillator.is_active(value) {
                trace!("[TRACE] [RTC] Starting oscillator");
                self.transport
                    .write_register(oscillator.register, oscillator.apply(value, true))?;
            }
        }
        Ok(())
    }

    pub(crate) fn read_block(&mut self, block: &RegisterBlock) -> Result<CalendarTime, Error<E>> {
        let mut raw = [0_u8; MAX_BLOCK];
        self.transport.read(block.base, &mut raw[..block.len])?;
        Ok(block.decode(&raw[..block.len]))
    }

    /// Read the block, merge `time` in and write it back, so control bits
    /// sharing the registers survive
    pub(crate) fn write_block(
        &mut self,
        block: &RegisterBlock,
        time: &CalendarTime,
    ) -> Result<(), Error<E>> {
        let mut raw = [0_u8; MAX_BLOCK];
        let raw = &mut raw[..block.len];
        self.transport.read(block.base, raw)?;
        block.encode(raw, time);
        self.transport.write(block.base, raw)
    }

    pub fn get_gmt_time(&mut self) -> Result<CalendarTime, Error<E>> {
        let profile = self.profile()?;
        let time = self.read_block(&profile.timedate)?;
        trace!("[TRACE] [RTC] GMT {}", time);
        Ok(time)
    }

    /// Write the clock registers. Out-of-range fields are rejected before any
    /// bus traffic.
    pub fn set_gmt_time(&mut self, time: &CalendarTime) -> Result<(), Error<E>> {
        time.validate()?;
        let profile = self.profile()?;

        debug!("[DEBUG] [RTC] Setting GMT {}", time);

        if let Some(hold) = profile.write_hold {
            self.transport
                .modify_register(hold.register, |value| hold.apply(value, true))?;
        }
        self.write_block(&profile.timedate, time)?;
        if let Some(hold) = profile.write_hold {
            self.transport
                .modify_register(hold.register, |value| hold.apply(value, false))?;
        }
        Ok(())
    }

    /// Shift applied on top of the time zone, for a local time `local`
    fn dst_shift(&self, local: &CalendarTime) -> Epoch {
        if !self.state.dst_enabled {
            return 0;
        }
        if dst_window(local.year as u16).contains(local) {
            SECONDS_PER_HOUR
        } else {
            -SECONDS_PER_HOUR
        }
    }

    /// GMT moved by the time zone and, when enabled, by DST. The result is
    /// also cached for `is_leap_year`.
    pub fn get_local_time(&mut self) -> Result<CalendarTime, Error<E>> {
        let time_zone = self.session()?.time_zone;
        let mut gmt = self.get_gmt_time()?;

        let mut epoch = date_to_epoch(&mut gmt) + time_zone as Epoch * SECONDS_PER_HOUR;
        let standard = epoch_to_date(epoch);
        epoch += self.dst_shift(&standard);

        let local = epoch_to_date(epoch);
        self.state.last_local_time = local;
        Ok(local)
    }

    /// Standard time that `get_local_time` shifts onto `local`. The DST
    /// reading wins when both shifts land on the same local time.
    fn standard_epoch(&self, local: Epoch) -> Epoch {
        if !self.state.dst_enabled {
            return local;
        }
        let summer = local - SECONDS_PER_HOUR;
        if self.dst_shift(&epoch_to_date(summer)) == SECONDS_PER_HOUR {
            summer
        } else {
            local + SECONDS_PER_HOUR
        }
    }

    /// Inverse of `get_local_time`: undo DST and the time zone, then write GMT
    pub fn set_local_time(&mut self, time: &CalendarTime) -> Result<(), Error<E>> {
        time.validate()?;
        let time_zone = self.session()?.time_zone;

        let mut local = *time;
        let standard = self.standard_epoch(date_to_epoch(&mut local));
        let epoch = standard - time_zone as Epoch * SECONDS_PER_HOUR;

        self.set_gmt_time(&epoch_to_date(epoch))
    }

    pub fn get_gmt_unix_time(&mut self) -> Result<Epoch, Error<E>> {
        let mut time = self.get_gmt_time()?;
        Ok(date_to_epoch(&mut time))
    }

    pub fn get_local_unix_time(&mut self) -> Result<Epoch, Error<E>> {
        let mut time = self.get_local_time()?;
        Ok(date_to_epoch(&mut time))
    }

    /// Hardware flag where the chip keeps one, otherwise worked out from the
    /// last local time read (2000 before any). PCF8583 always answers `false`.
    pub fn is_leap_year(&mut self) -> Result<bool, Error<E>> {
        match self.profile()?.leap_year {
            LeapYearSource::Unsupported => Ok(false),
            LeapYearSource::Flag(flag) => {
                let value = self.transport.read_register(flag.register)?;
                Ok(flag.is_active(value))
            }
            LeapYearSource::Computed => Ok(calendar::is_leap_year(calendar::full_year(
                self.state.last_local_time.year,
            ))),
        }
    }

    /// Start the square wave output. A no-op on chips without one.
    pub fn enable_swo(&mut self, frequency: SquareWave) -> Result<(), Error<E>> {
        let Some(swo) = self.profile()?.square_wave else {
            return Ok(());
        };
        let rate = swo.rates[frequency.index()];
        debug!("[DEBUG] [RTC] Square wave on, rate {}", rate);
        self.transport.modify_register(swo.register, |value| {
            (value | swo.enable) & !swo.rate_mask | (rate & swo.rate_mask)
        })?;
        Ok(())
    }

    pub fn disable_swo(&mut self) -> Result<(), Error<E>> {
        let Some(swo) = self.profile()?.square_wave else {
            return Ok(());
        };
        self.transport
            .modify_register(swo.register, |value| value & !swo.enable)?;
        Ok(())
    }

    /// Switch to the backup supply when main power fails. MCP7941x only.
    pub fn enable_battery(&mut self) -> Result<(), Error<E>> {
        self.set_battery(true)
    }

    pub fn disable_battery(&mut self) -> Result<(), Error<E>> {
        self.set_battery(false)
    }

    fn set_battery(&mut self, enabled: bool) -> Result<(), Error<E>> {
        let Some(battery) = self.profile()?.battery else {
            return Ok(());
        };
        self.transport
            .modify_register(battery.register, |value| battery.apply(value, enabled))?;
        Ok(())
    }

    /// Whether the chip flagged a loss of main power (or, on BQ32000, a stopped
    /// oscillator). `false` on chips that keep no such flag.
    pub fn is_power_failure(&mut self) -> Result<bool, Error<E>> {
        let Some(power_fail) = self.profile()?.power_fail else {
            return Ok(false);
        };
        let value = self.transport.read_register(power_fail.flag.register)?;
        Ok(power_fail.flag.is_active(value))
    }

    /// Power-down time stamp. Only minutes through month are recorded; chips
    /// without a stamp return a zeroed time.
    pub fn get_last_power_failure(&mut self) -> Result<CalendarTime, Error<E>> {
        let stamp = self
            .profile()?
            .power_fail
            .and_then(|power_fail| power_fail.stamp);
        match stamp {
            Some(block) => self.read_block(&block),
            None => Ok(CalendarTime::default()),
        }
    }
}
