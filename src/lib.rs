//! Driver for the I2C real-time clocks on the RTC click boards: NXP PCF8583,
//! Maxim DS1307, TI BQ32000 and Microchip MCP7941x.
//!
//! Pick the chip family at run time with [`Rtc::init`]; every other call is
//! routed through that family's register map. Features a chip does not have
//! are quiet no-ops returning a neutral value.
//!
//! ```ignore
//! let mut rtc = Rtc::new(i2c);
//! rtc.init(DeviceType::Mcp7941x, -5)?;
//! rtc.enable_dst();
//! let now = rtc.get_local_time()?;
//! ```
//!
//! A `Rtc` keeps its session in the value itself and does no locking, so
//! sharing one between threads or interrupt handlers needs the caller to
//! serialise access.

#![cfg_attr(not(test), no_std)]

pub mod alarm;
pub mod bcd;
pub mod calendar;
pub mod chip;
pub mod console;
pub mod dst;
pub mod memory;
pub mod rtc;
pub mod shared;
pub mod state;
pub mod transport;

pub use alarm::{Alarm, AlarmSpec, AlarmTrigger};
pub use chip::{Capability, DeviceType};
pub use console::{clear_console, set_console};
pub use rtc::Rtc;
pub use shared::{CalendarTime, Epoch, Error, Month, SquareWave, ValidationError, Weekday};
