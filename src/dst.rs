//! US daylight saving time, as extended in 2007: from the second Sunday in
//! March to the first Sunday in November, switching at 02:00 local time.

use crate::{
    calendar::full_year,
    shared::{CalendarTime, Month, Weekday},
};

const SWITCH_HOUR: u8 = 2;

/// Local-time boundaries of daylight saving time for one year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstWindow {
    pub start: CalendarTime,
    pub end: CalendarTime,
}

/// `(1 + 5y/4) mod 7`, the shared term of both boundary formulas
fn sunday_offset(year: u16) -> u8 {
    // Two-digit years are the stored form; anything wider is already a full year
    let full = if year < 100 {
        full_year(year as u8)
    } else {
        year as i64
    };
    ((1 + full * 5 / 4) % 7) as u8
}

fn boundary(year: u16, month: Month, monthday: u8) -> CalendarTime {
    CalendarTime {
        seconds: 0,
        minutes: 0,
        hours: SWITCH_HOUR,
        weekday: Weekday::Sunday as u8,
        monthday,
        month: month as u8,
        year: (year % 100) as u8,
    }
}

/// DST start and end for `year`, either the stored two-digit year or a full one
pub fn dst_window(year: u16) -> DstWindow {
    let offset = sunday_offset(year);
    DstWindow {
        start: boundary(year, Month::March, 14 - offset),
        end: boundary(year, Month::November, 7 - offset),
    }
}

/// Whether `time` falls inside the window.
///
/// Months strictly between the boundaries are always inside. On the start
/// month everything after the boundary day is inside, as is the boundary day
/// from the switch hour on. On the end month everything before the boundary
/// day is inside, as is the boundary day before the switch hour.
pub fn is_dst_active(time: &CalendarTime, start: &CalendarTime, end: &CalendarTime) -> bool {
    if time.month > start.month && time.month < end.month {
        return true;
    }

    if time.month == end.month {
        return time.monthday < end.monthday
            || (time.monthday == end.monthday && time.hours < end.hours);
    }

    if time.month == start.month {
        return time.monthday > start.monthday
            || (time.monthday == start.monthday && time.hours >= start.hours);
    }

    false
}

impl DstWindow {
    pub fn contains(&self, time: &CalendarTime) -> bool {
        is_dst_active(time, &self.start, &self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_for_2024() {
        let window = dst_window(24);
        assert_eq!(window.start.monthday, 10);
        assert_eq!(window.start.month, 3);
        assert_eq!(window.start.hours, 2);
        assert_eq!(window.end.monthday, 3);
        assert_eq!(window.end.month, 11);
        assert_eq!(window.end.hours, 2);

        assert_eq!(dst_window(2024), window);
    }

    #[test]
    fn boundaries_for_other_years() {
        // 2015: March 8 and November 1
        let window = dst_window(15);
        assert_eq!((window.start.monthday, window.end.monthday), (8, 1));
        // 2023: March 12 and November 5
        let window = dst_window(23);
        assert_eq!((window.start.monthday, window.end.monthday), (12, 5));
        // 2025: March 9 and November 2
        let window = dst_window(25);
        assert_eq!((window.start.monthday, window.end.monthday), (9, 2));
    }

    #[test]
    fn summer_and_winter() {
        let window = dst_window(24);
        assert!(window.contains(&CalendarTime::new(0, 0, 12, 1, 1, 7, 24)));
        assert!(!window.contains(&CalendarTime::new(0, 0, 12, 1, 1, 1, 24)));
        assert!(!window.contains(&CalendarTime::new(0, 0, 12, 1, 25, 12, 24)));
    }

    #[test]
    fn start_day_switches_at_two() {
        let window = dst_window(24);
        assert!(!window.contains(&CalendarTime::new(59, 59, 1, 7, 10, 3, 24)));
        assert!(window.contains(&CalendarTime::new(0, 0, 2, 7, 10, 3, 24)));
        assert!(!window.contains(&CalendarTime::new(0, 0, 23, 6, 9, 3, 24)));
        assert!(window.contains(&CalendarTime::new(0, 0, 0, 1, 11, 3, 24)));
    }

    #[test]
    fn end_day_switches_at_two() {
        let window = dst_window(24);
        assert!(window.contains(&CalendarTime::new(59, 59, 1, 7, 3, 11, 24)));
        assert!(!window.contains(&CalendarTime::new(0, 0, 2, 7, 3, 11, 24)));
        assert!(window.contains(&CalendarTime::new(0, 0, 23, 6, 2, 11, 24)));
        // Early hours later in November stay outside
        assert!(!window.contains(&CalendarTime::new(0, 0, 1, 3, 20, 11, 24)));
    }
}
