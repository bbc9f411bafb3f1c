//! Alarms: one on the PCF8583, two on the MCP7941x, none elsewhere

use embedded_hal::blocking::i2c::{Write, WriteRead};
use ufmt::derive::uDebug;

use crate::{
    chip::{AlarmMap, RegisterBlock, MAX_BLOCK},
    console::debug,
    rtc::Rtc,
    shared::{CalendarTime, Error},
};

/// PCF8583 alarm control: alarm interrupt enable
const PCF8583_ALARM_INTERRUPT: u8 = 1 << 7;
/// PCF8583 alarm control: clock alarm function bits
const PCF8583_FUNCTION_MASK: u8 = 0b0011_0000;
/// MCP7941x ALMxWKDAY: match mask bits
const MCP7941X_MASK_BITS: u8 = 0b0111_0000;
/// MCP7941x ALMxWKDAY: interrupt flag, cleared when the alarm is rearmed
const MCP7941X_ALARM_FLAG: u8 = 1 << 3;
/// MCP7941x ALM0WKDAY only: output asserted high on match
const MCP7941X_POLARITY: u8 = 1 << 7;
/// PCF8583 weekday alarms store one bit per day in the month slot
const PCF8583_WEEKDAY_SLOT: usize = 4;
/// Days of the week in the PCF8583 weekday slot
const PCF8583_WEEKDAY_BITS: u8 = 0b0111_1111;

/// One-hot PCF8583 weekday byte, Monday in bit 0
const fn pcf8583_weekday_bit(weekday: u8) -> u8 {
    1 << (weekday.saturating_sub(1) % 7)
}

/// Lowest day set in a PCF8583 weekday byte, zero when none is
const fn pcf8583_weekday(bits: u8) -> u8 {
    let days = bits & PCF8583_WEEKDAY_BITS;
    if days == 0 {
        0
    } else {
        days.trailing_zeros() as u8 + 1
    }
}

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alarm {
    Alarm0,
    Alarm1,
}

impl Alarm {
    pub const fn index(self) -> usize {
        match self {
            Alarm::Alarm0 => 0,
            Alarm::Alarm1 => 1,
        }
    }
}

/// Which fields have to match for the alarm to fire
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmTrigger {
    Seconds,
    Minutes,
    Hours,
    /// Once a day at the given time
    Day,
    /// On the given day of the month
    Date,
    /// Every field at once
    All,
    /// On the given day of the week
    Weekday,
}

impl AlarmTrigger {
    /// Clock alarm function, bits 5:4 of the PCF8583 alarm control register.
    /// Triggers the chip has no function for leave the alarm without one.
    pub const fn pcf8583_function(self) -> u8 {
        match self {
            AlarmTrigger::Day => 0b01 << 4,
            AlarmTrigger::Weekday => 0b10 << 4,
            AlarmTrigger::Date => 0b11 << 4,
            _ => 0,
        }
    }

    /// ALMxMSK, bits 6:4 of the MCP7941x alarm weekday register
    pub const fn mcp7941x_mask(self) -> u8 {
        let mask = match self {
            AlarmTrigger::Seconds => 0b000,
            AlarmTrigger::Minutes => 0b001,
            AlarmTrigger::Hours => 0b010,
            AlarmTrigger::Day | AlarmTrigger::Weekday => 0b011,
            AlarmTrigger::Date => 0b100,
            AlarmTrigger::All => 0b111,
        };
        mask << 4
    }
}

/// Everything `set_alarm` needs in one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmSpec {
    pub alarm: Alarm,
    pub trigger: AlarmTrigger,
    pub time: CalendarTime,
}

impl<I2C, E> Rtc<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    /// Program and arm an alarm. Alarms the chip lacks are ignored; an out of
    /// range time is rejected before any bus traffic.
    pub fn set_alarm(&mut self, spec: &AlarmSpec) -> Result<(), Error<E>> {
        spec.time.validate()?;
        let profile = self.profile()?;
        let Some(map) = profile.alarm else {
            return Ok(());
        };
        if spec.alarm.index() >= map.count() {
            return Ok(());
        }

        debug!(
            "[DEBUG] [RTC] Alarm {:?} on {:?} at {}",
            spec.alarm, spec.trigger, spec.time
        );

        match map {
            AlarmMap::Single {
                enable,
                control,
                block,
            } => {
                self.transport
                    .modify_register(enable.register, |value| enable.apply(value, true))?;
                self.write_alarm_block(&block, &spec.time, |raw| {
                    if spec.trigger == AlarmTrigger::Weekday {
                        raw[PCF8583_WEEKDAY_SLOT] = pcf8583_weekday_bit(spec.time.weekday);
                    }
                })?;
                self.transport.modify_register(control, |value| {
                    value & !PCF8583_FUNCTION_MASK
                        | PCF8583_ALARM_INTERRUPT
                        | spec.trigger.pcf8583_function()
                })?;
            }
            AlarmMap::Dual {
                blocks,
                enables,
                square_wave,
            } => {
                let block = blocks[spec.alarm.index()];
                // The match mask shares the weekday register
                let Some(weekday) = block.weekday else {
                    return Ok(());
                };
                let polarity = match spec.alarm {
                    Alarm::Alarm0 => MCP7941X_POLARITY,
                    Alarm::Alarm1 => 0,
                };
                self.write_alarm_block(&block, &spec.time, |raw| {
                    raw[weekday.offset] = raw[weekday.offset]
                        & !(MCP7941X_MASK_BITS | MCP7941X_ALARM_FLAG)
                        | polarity
                        | spec.trigger.mcp7941x_mask();
                })?;
                // Alarms keep firing on backup power
                self.enable_battery()?;

                let enable = enables[spec.alarm.index()];
                self.transport.modify_register(enable.register, |value| {
                    enable.apply(square_wave.apply(value, false), true)
                })?;
            }
        }
        Ok(())
    }

    fn write_alarm_block<F>(
        &mut self,
        block: &RegisterBlock,
        time: &CalendarTime,
        finish: F,
    ) -> Result<(), Error<E>>
    where
        F: FnOnce(&mut [u8]),
    {
        let mut raw = [0_u8; MAX_BLOCK];
        let raw = &mut raw[..block.len];
        self.transport.read(block.base, raw)?;
        block.encode(raw, time);
        finish(raw);
        self.transport.write(block.base, raw)
    }

    /// Disarm an alarm, leaving its registers as they are
    pub fn disable_alarm(&mut self, alarm: Alarm) -> Result<(), Error<E>> {
        let Some(map) = self.profile()?.alarm else {
            return Ok(());
        };
        let enable = match map {
            AlarmMap::Single { enable, .. } if alarm == Alarm::Alarm0 => enable,
            AlarmMap::Dual { enables, .. } => enables[alarm.index()],
            _ => return Ok(()),
        };
        self.transport
            .modify_register(enable.register, |value| enable.apply(value, false))?;
        Ok(())
    }

    /// Programmed alarm time; zeroed when the chip lacks the alarm.
    ///
    /// A PCF8583 weekday alarm has no month, so it reads back as zero.
    pub fn read_alarm(&mut self, alarm: Alarm) -> Result<CalendarTime, Error<E>> {
        match self.profile()?.alarm {
            Some(AlarmMap::Single { control, block, .. }) if alarm == Alarm::Alarm0 => {
                let function = self.transport.read_register(control)? & PCF8583_FUNCTION_MASK;

                let mut raw = [0_u8; MAX_BLOCK];
                let raw = &mut raw[..block.len];
                self.transport.read(block.base, raw)?;
                let mut time = block.decode(raw);

                if function == AlarmTrigger::Weekday.pcf8583_function() {
                    time.weekday = pcf8583_weekday(raw[PCF8583_WEEKDAY_SLOT]);
                    time.month = 0;
                }
                Ok(time)
            }
            Some(AlarmMap::Dual { blocks, .. }) => self.read_block(&blocks[alarm.index()]),
            _ => Ok(CalendarTime::default()),
        }
    }
}
