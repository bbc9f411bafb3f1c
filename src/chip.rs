//! Register maps of the supported chip families.
//!
//! Each family is described once, as a static `ChipProfile`, and the facade
//! consults that table instead of branching on the device per operation. A
//! capability the chip lacks is simply an absent entry.

use ufmt::derive::uDebug;

use crate::{
    bcd::{to_bcd, to_binary},
    shared::{CalendarTime, ValidationError},
};

/// Longest date/time register block of any family
pub const MAX_BLOCK: usize = 7;

#[repr(u8)]
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// NXP PCF8583 (RTC click)
    Pcf8583 = 0,
    /// Maxim DS1307 (RTC 2 click)
    Ds1307 = 1,
    /// TI BQ32000 (RTC 3 click)
    Bq32000 = 2,
    /// Microchip MCP7941x (RTC 6 click)
    Mcp7941x = 3,
}

impl TryFrom<u8> for DeviceType {
    type Error = ValidationError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(DeviceType::Pcf8583),
            1 => Ok(DeviceType::Ds1307),
            2 => Ok(DeviceType::Bq32000),
            3 => Ok(DeviceType::Mcp7941x),
            _ => Err(ValidationError::DeviceType(id)),
        }
    }
}

impl DeviceType {
    pub fn profile(self) -> &'static ChipProfile {
        match self {
            DeviceType::Pcf8583 => &PCF8583,
            DeviceType::Ds1307 => &DS1307,
            DeviceType::Bq32000 => &BQ32000,
            DeviceType::Mcp7941x => &MCP7941X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    Bcd,
    /// Plain binary in the masked bits, stored as `value - bias`
    Shifted { shift: u8, bias: u8 },
}

/// One calendar field inside a register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Byte offset from the block base
    pub offset: usize,
    /// Bits holding the value
    pub mask: u8,
    /// Bits to keep when the value is rewritten
    pub clear: u8,
    pub encoding: FieldEncoding,
}

impl FieldSpec {
    pub const fn bcd(offset: usize, mask: u8) -> Self {
        Self {
            offset,
            mask,
            clear: !mask,
            encoding: FieldEncoding::Bcd,
        }
    }

    pub const fn shifted(offset: usize, mask: u8, shift: u8, bias: u8) -> Self {
        Self {
            offset,
            mask,
            clear: !mask,
            encoding: FieldEncoding::Shifted { shift, bias },
        }
    }

    pub fn decode(&self, raw: &[u8]) -> u8 {
        let bits = raw[self.offset] & self.mask;
        match self.encoding {
            FieldEncoding::Bcd => to_binary(bits),
            FieldEncoding::Shifted { shift, bias } => (bits >> shift) + bias,
        }
    }

    /// Replace the field inside `raw`, keeping the sibling bits
    pub fn encode(&self, raw: &mut [u8], value: u8) {
        let bits = match self.encoding {
            FieldEncoding::Bcd => to_bcd(value),
            FieldEncoding::Shifted { shift, bias } => value.saturating_sub(bias) << shift,
        };
        raw[self.offset] = (raw[self.offset] & self.clear) | (bits & self.mask);
    }
}

/// A run of consecutive registers holding (part of) a calendar time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBlock {
    pub base: u8,
    pub len: usize,
    pub seconds: Option<FieldSpec>,
    pub minutes: Option<FieldSpec>,
    pub hours: Option<FieldSpec>,
    pub weekday: Option<FieldSpec>,
    pub monthday: Option<FieldSpec>,
    pub month: Option<FieldSpec>,
    pub year: Option<FieldSpec>,
}

impl RegisterBlock {
    /// Missing fields read back as zero
    pub fn decode(&self, raw: &[u8]) -> CalendarTime {
        let field = |spec: Option<FieldSpec>| spec.map_or(0, |spec| spec.decode(raw));
        CalendarTime {
            seconds: field(self.seconds),
            minutes: field(self.minutes),
            hours: field(self.hours),
            weekday: field(self.weekday),
            monthday: field(self.monthday),
            month: field(self.month),
            year: field(self.year),
        }
    }

    /// Merge `time` into `raw`, which holds the current register contents
    pub fn encode(&self, raw: &mut [u8], time: &CalendarTime) {
        let fields = [
            (self.seconds, time.seconds),
            (self.minutes, time.minutes),
            (self.hours, time.hours),
            (self.monthday, time.monthday),
            (self.month, time.month),
            (self.year, time.year),
            // Last, as it may share a register with the month
            (self.weekday, time.weekday),
        ];
        for (spec, value) in fields {
            if let Some(spec) = spec {
                spec.encode(raw, value);
            }
        }
    }
}

/// A single control or status bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBit {
    pub register: u8,
    pub mask: u8,
    /// Whether the bit reads 1 when the function is on
    pub active_high: bool,
}

impl ControlBit {
    pub const fn high(register: u8, bit: u8) -> Self {
        Self {
            register,
            mask: 1 << bit,
            active_high: true,
        }
    }

    pub const fn low(register: u8, bit: u8) -> Self {
        Self {
            register,
            mask: 1 << bit,
            active_high: false,
        }
    }

    pub const fn is_active(&self, value: u8) -> bool {
        (value & self.mask != 0) == self.active_high
    }

    pub const fn apply(&self, value: u8, active: bool) -> u8 {
        if active == self.active_high {
            value | self.mask
        } else {
            value & !self.mask
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareWaveMap {
    pub register: u8,
    pub enable: u8,
    /// Bits cleared before the rate is written
    pub rate_mask: u8,
    /// Rate-select values for 1 Hz, 4.096 kHz, 8.192 kHz and 32.768 kHz
    pub rates: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerFailMap {
    pub flag: ControlBit,
    /// Power-down time stamp, when the chip records one
    pub stamp: Option<RegisterBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeapYearSource {
    Unsupported,
    /// Hardware flag maintained by the chip
    Flag(ControlBit),
    /// Worked out from the last local time the session saw
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmMap {
    /// One alarm gated by an enable bit, with the match function in its own
    /// alarm control register
    Single {
        enable: ControlBit,
        control: u8,
        block: RegisterBlock,
    },
    /// Two alarms; the match mask sits in each block's weekday register
    Dual {
        blocks: [RegisterBlock; 2],
        enables: [ControlBit; 2],
        square_wave: ControlBit,
    },
}

impl AlarmMap {
    pub const fn count(&self) -> usize {
        match self {
            AlarmMap::Single { .. } => 1,
            AlarmMap::Dual { .. } => 2,
        }
    }
}

/// Battery-backed SRAM, as a half-open register window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryWindow {
    /// Slave holding the window
    pub address: u8,
    pub start: u8,
    pub end: u8,
}

impl MemoryWindow {
    pub const fn size(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Register of `offset`, if `len` bytes from there stay inside the window
    pub fn locate(&self, offset: u8, len: usize) -> Option<u8> {
        if len == 0 || offset as usize + len > self.size() {
            return None;
        }
        Some(self.start + offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromMap {
    pub address: u8,
    pub size: usize,
    pub page_size: usize,
    pub status: u8,
    /// Block-protect bits of the status register
    pub protect_mask: u8,
    pub unique_id: u8,
    pub unlock: u8,
    pub unlock_sequence: [u8; 2],
}

impl EepromMap {
    pub fn contains(&self, address: u8, len: usize) -> bool {
        len > 0 && address as usize + len <= self.size
    }
}

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SquareWave,
    Battery,
    PowerFailure,
    LeapYearFlag,
    Alarms,
    Sram,
    Eeprom,
}

/// Everything the facade needs to know about one chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipProfile {
    pub device: DeviceType,
    pub address: u8,
    pub timedate: RegisterBlock,
    /// Run bit that `init` must switch on
    pub oscillator: Option<ControlBit>,
    /// Counter hold asserted while the time registers are rewritten
    pub write_hold: Option<ControlBit>,
    pub square_wave: Option<SquareWaveMap>,
    pub battery: Option<ControlBit>,
    pub power_fail: Option<PowerFailMap>,
    pub leap_year: LeapYearSource,
    pub alarm: Option<AlarmMap>,
    pub sram: Option<MemoryWindow>,
    pub eeprom: Option<EepromMap>,
}

impl ChipProfile {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::SquareWave => self.square_wave.is_some(),
            Capability::Battery => self.battery.is_some(),
            Capability::PowerFailure => self.power_fail.is_some(),
            Capability::LeapYearFlag => matches!(self.leap_year, LeapYearSource::Flag(_)),
            Capability::Alarms => self.alarm.is_some(),
            Capability::Sram => self.sram.is_some(),
            Capability::Eeprom => self.eeprom.is_some(),
        }
    }
}

/// Seconds through year at 0x00, the layout DS1307, BQ32000 and MCP7941x share
const SEQUENTIAL_TIMEDATE: RegisterBlock = RegisterBlock {
    base: 0x00,
    len: 7,
    seconds: Some(FieldSpec::bcd(0, 0x7F)),
    minutes: Some(FieldSpec::bcd(1, 0x7F)),
    hours: Some(FieldSpec::bcd(2, 0x3F)),
    weekday: Some(FieldSpec::bcd(3, 0x07)),
    monthday: Some(FieldSpec::bcd(4, 0x3F)),
    month: Some(FieldSpec::bcd(5, 0x1F)),
    year: Some(FieldSpec::bcd(6, 0xFF)),
};

/// PCF8583 time and alarm blocks: the year bits share the date register and
/// the weekday (Monday stored as 0) shares the month register
const fn pcf8583_block(base: u8) -> RegisterBlock {
    RegisterBlock {
        base,
        len: 5,
        seconds: Some(FieldSpec::bcd(0, 0xFF)),
        minutes: Some(FieldSpec::bcd(1, 0xFF)),
        hours: Some(FieldSpec::bcd(2, 0x3F)),
        weekday: Some(FieldSpec::shifted(4, 0xE0, 5, 1)),
        monthday: Some(FieldSpec::bcd(3, 0x3F)),
        month: Some(FieldSpec::bcd(4, 0x1F)),
        year: None,
    }
}

/// MCP7941x alarm block: seconds through month, no year
const fn mcp7941x_alarm_block(base: u8) -> RegisterBlock {
    RegisterBlock {
        base,
        len: 6,
        year: None,
        ..SEQUENTIAL_TIMEDATE
    }
}

pub static PCF8583: ChipProfile = ChipProfile {
    device: DeviceType::Pcf8583,
    address: 0x50,
    timedate: pcf8583_block(0x02),
    oscillator: None,
    write_hold: Some(ControlBit::high(0x00, 7)),
    square_wave: None,
    battery: None,
    power_fail: None,
    leap_year: LeapYearSource::Unsupported,
    alarm: Some(AlarmMap::Single {
        enable: ControlBit::high(0x00, 2),
        control: 0x08,
        block: pcf8583_block(0x0A),
    }),
    sram: None,
    eeprom: None,
};

pub static DS1307: ChipProfile = ChipProfile {
    device: DeviceType::Ds1307,
    address: 0x68,
    timedate: SEQUENTIAL_TIMEDATE,
    // Clock halt
    oscillator: Some(ControlBit::low(0x00, 7)),
    write_hold: None,
    square_wave: Some(SquareWaveMap {
        register: 0x07,
        enable: 1 << 4,
        rate_mask: 0b0000_0011,
        rates: [0b00, 0b01, 0b10, 0b11],
    }),
    battery: None,
    power_fail: None,
    leap_year: LeapYearSource::Computed,
    alarm: None,
    sram: Some(MemoryWindow {
        address: 0x68,
        start: 0x08,
        end: 0x40,
    }),
    eeprom: None,
};

pub static BQ32000: ChipProfile = ChipProfile {
    device: DeviceType::Bq32000,
    address: 0x68,
    timedate: SEQUENTIAL_TIMEDATE,
    // STOP
    oscillator: Some(ControlBit::low(0x00, 7)),
    write_hold: None,
    square_wave: None,
    battery: None,
    power_fail: Some(PowerFailMap {
        // Oscillator fail flag
        flag: ControlBit::high(0x01, 7),
        stamp: None,
    }),
    leap_year: LeapYearSource::Computed,
    alarm: None,
    sram: None,
    eeprom: None,
};

pub static MCP7941X: ChipProfile = ChipProfile {
    device: DeviceType::Mcp7941x,
    address: 0x6F,
    timedate: SEQUENTIAL_TIMEDATE,
    // ST
    oscillator: Some(ControlBit::high(0x00, 7)),
    write_hold: None,
    square_wave: Some(SquareWaveMap {
        register: 0x07,
        enable: 1 << 6,
        rate_mask: 0b0000_0111,
        rates: [0b000, 0b001, 0b010, 0b011],
    }),
    battery: Some(ControlBit::high(0x03, 3)),
    power_fail: Some(PowerFailMap {
        flag: ControlBit::high(0x03, 4),
        stamp: Some(RegisterBlock {
            base: 0x18,
            len: 4,
            seconds: None,
            minutes: Some(FieldSpec::bcd(0, 0x7F)),
            hours: Some(FieldSpec::bcd(1, 0x3F)),
            weekday: Some(FieldSpec::shifted(3, 0xE0, 5, 0)),
            monthday: Some(FieldSpec::bcd(2, 0x3F)),
            month: Some(FieldSpec::bcd(3, 0x1F)),
            year: None,
        }),
    }),
    leap_year: LeapYearSource::Flag(ControlBit::high(0x05, 5)),
    alarm: Some(AlarmMap::Dual {
        blocks: [mcp7941x_alarm_block(0x0A), mcp7941x_alarm_block(0x11)],
        enables: [ControlBit::high(0x07, 4), ControlBit::high(0x07, 5)],
        square_wave: ControlBit::high(0x07, 6),
    }),
    sram: Some(MemoryWindow {
        address: 0x6F,
        start: 0x20,
        end: 0x60,
    }),
    eeprom: Some(EepromMap {
        address: 0x57,
        size: 128,
        page_size: 8,
        status: 0xFF,
        protect_mask: 0b0000_1100,
        unique_id: 0xF0,
        unlock: 0x09,
        unlock_sequence: [0x55, 0xAA],
    }),
};
