//! Value types shared by every chip family

use ufmt::{derive::uDebug, uDisplay, uWrite, Formatter};

/// Seconds relative to 1970-01-01T00:00:00Z. Negative before 1970.
pub type Epoch = i64;

/// Seven-field calendar time as the chips store it.
///
/// `year` is the two-digit year the registers hold. `weekday` runs Monday = 1
/// through Sunday = 7.
#[derive(uDebug, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub weekday: u8,
    pub monthday: u8,
    pub month: u8,
    pub year: u8,
}

impl CalendarTime {
    pub const fn new(
        seconds: u8,
        minutes: u8,
        hours: u8,
        weekday: u8,
        monthday: u8,
        month: u8,
        year: u8,
    ) -> Self {
        Self {
            seconds,
            minutes,
            hours,
            weekday,
            monthday,
            month,
            year,
        }
    }

    /// Range check applied before anything is written to a device.
    ///
    /// Only upper bounds are enforced: a zero weekday, monthday or month is
    /// passed through as-is, the same way the chips accept it. Hours stop at
    /// 23; 24 is rejected on purpose, as no chip can hold it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.seconds > 59 {
            return Err(ValidationError::Seconds(self.seconds));
        }
        if self.minutes > 59 {
            return Err(ValidationError::Minutes(self.minutes));
        }
        if self.hours > 23 {
            return Err(ValidationError::Hours(self.hours));
        }
        if self.weekday > 7 {
            return Err(ValidationError::Weekday(self.weekday));
        }
        if self.monthday > 31 {
            return Err(ValidationError::Monthday(self.monthday));
        }
        if self.month > 12 {
            return Err(ValidationError::Month(self.month));
        }
        if self.year > 99 {
            return Err(ValidationError::Year(self.year));
        }
        Ok(())
    }
}

fn write_two_digits<W>(f: &mut Formatter<'_, W>, value: u8) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    f.write_char(char::from(b'0' + (value / 10) % 10))?;
    f.write_char(char::from(b'0' + value % 10))
}

impl uDisplay for CalendarTime {
    /// `CCYY-MM-DD HH:MM:SS`, the century taken from the year pivot
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let century = if self.year >= crate::calendar::YEAR_PIVOT {
            19
        } else {
            20
        };
        write_two_digits(f, century)?;
        write_two_digits(f, self.year)?;
        f.write_char('-')?;
        write_two_digits(f, self.month)?;
        f.write_char('-')?;
        write_two_digits(f, self.monthday)?;
        f.write_char(' ')?;
        write_two_digits(f, self.hours)?;
        f.write_char(':')?;
        write_two_digits(f, self.minutes)?;
        f.write_char(':')?;
        write_two_digits(f, self.seconds)
    }
}

#[repr(u8)]
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Monday = 1,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[repr(u8)]
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Month {
    January = 1,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

/// Square-wave output frequencies
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareWave {
    Hz1,
    KHz4_096,
    KHz8_192,
    KHz32_768,
}

impl SquareWave {
    /// Index into a chip's rate-select table
    pub const fn index(self) -> usize {
        match self {
            SquareWave::Hz1 => 0,
            SquareWave::KHz4_096 => 1,
            SquareWave::KHz8_192 => 2,
            SquareWave::KHz32_768 => 3,
        }
    }
}

/// Input rejected before any bus traffic
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    Seconds(u8),
    Minutes(u8),
    Hours(u8),
    Weekday(u8),
    Monthday(u8),
    Month(u8),
    Year(u8),
    TimeZone(i8),
    DeviceType(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The I2C bus reported a failure
    Transport(E),
    Validation(ValidationError),
    /// `init` has not succeeded yet
    Uninitialized,
}

impl<E> From<ValidationError> for Error<E> {
    fn from(error: ValidationError) -> Self {
        Error::Validation(error)
    }
}
