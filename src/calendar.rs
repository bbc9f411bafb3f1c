//! Conversions between `CalendarTime` and Unix epoch seconds, by way of the
//! Julian Day Number.
//!
//! All arithmetic is done in `i64` so `365 * year` style products never
//! overflow for any two-digit year or any epoch a chip can produce.

use crate::shared::{CalendarTime, Epoch};

/// Julian Day Number of 1970-01-01
pub const JULIAN_DAY_1970: i64 = 2_440_588;
/// Last Julian day of the Julian calendar before the Gregorian correction applies
const GREGORIAN_REFORM: i64 = 2_299_171;

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Two-digit years at or above this belong to the 1900s
pub const YEAR_PIVOT: u8 = 70;

/// Expand a stored two-digit year to the full year
pub const fn full_year(year: u8) -> i64 {
    if year >= YEAR_PIVOT {
        1900 + year as i64
    } else {
        2000 + year as i64
    }
}

/// Fold a full year back to the two digits the registers hold
pub const fn two_digit_year(full_year: i64) -> u8 {
    full_year.rem_euclid(100) as u8
}

/// Gregorian rule on a full year
pub const fn is_leap_year(full_year: i64) -> bool {
    (full_year % 4 == 0 && full_year % 100 != 0) || full_year % 400 == 0
}

/// Julian Day Number of a civil date
pub fn julian_day(full_year: i64, month: u8, monthday: u8) -> i64 {
    // Months counted from March 4801 BC so February lands at the end of the year
    let ji = (full_year + 4800) * 12 + month as i64 - 3;

    let mut julian_day = (2 * (ji % 12) + 7 + 365 * ji) / 12;
    julian_day += monthday as i64 + ji / 48 - 32083;
    if julian_day > GREGORIAN_REFORM {
        julian_day += ji / 4800 - ji / 1200 + 38;
    }
    julian_day
}

/// Monday = 1 through Sunday = 7
pub const fn weekday_of(julian_day: i64) -> u8 {
    (julian_day.rem_euclid(7) + 1) as u8
}

/// Seconds since 1970 of `time`.
///
/// The weekday is recomputed from the date and written back into `time`.
pub fn date_to_epoch(time: &mut CalendarTime) -> Epoch {
    let julian_day = julian_day(full_year(time.year), time.month, time.monthday);
    time.weekday = weekday_of(julian_day);

    let seconds = time.hours as i64 * SECONDS_PER_HOUR
        + time.minutes as i64 * SECONDS_PER_MINUTE
        + time.seconds as i64;

    (julian_day - JULIAN_DAY_1970) * SECONDS_PER_DAY + seconds
}

/// Calendar time of an epoch, weekday included
pub fn epoch_to_date(epoch: Epoch) -> CalendarTime {
    // Floor division keeps negative epochs on the right day
    let julian_day = epoch.div_euclid(SECONDS_PER_DAY) + JULIAN_DAY_1970;
    let second_of_day = epoch.rem_euclid(SECONDS_PER_DAY);

    let mut l = julian_day + 68569;
    let n = 4 * l / 146_097;
    l -= (146_097 * n + 3) / 4;
    let mut i = 4000 * (l + 1) / 1_461_001;
    l -= 1461 * i / 4 - 31;
    let mut j = 80 * l / 2447;
    let k = l - 2447 * j / 80;
    l = j / 11;
    j = j + 2 - 12 * l;
    i = 100 * (n - 49) + i + l;

    CalendarTime {
        seconds: (second_of_day % SECONDS_PER_MINUTE) as u8,
        minutes: (second_of_day % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8,
        hours: (second_of_day / SECONDS_PER_HOUR) as u8,
        weekday: weekday_of(julian_day),
        monthday: k as u8,
        month: j as u8,
        year: two_digit_year(i),
    }
}
