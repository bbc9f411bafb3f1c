//! Session state of one RTC connection, but not the logic behind it.
//! See rtc.rs for the logic!
//!
//! A `Rtc` owns exactly one `State`. Nothing here is global, and nothing here
//! is synchronised: callers sharing a `Rtc` between threads or interrupt
//! handlers must serialise every call themselves (a single mutex around the
//! whole `Rtc` is enough).

use core::ops::RangeInclusive;

use crate::{
    chip::{ChipProfile, DeviceType},
    shared::{CalendarTime, ValidationError},
};

/// Hours from GMT that `init` accepts
pub const TIME_ZONE_RANGE: RangeInclusive<i8> = -12..=14;

/// What `init` configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub device: DeviceType,
    pub time_zone: i8,
}

impl Session {
    pub fn new(device: DeviceType, time_zone: i8) -> Result<Self, ValidationError> {
        if !TIME_ZONE_RANGE.contains(&time_zone) {
            return Err(ValidationError::TimeZone(time_zone));
        }
        Ok(Self { device, time_zone })
    }

    pub fn profile(&self) -> &'static ChipProfile {
        self.device.profile()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct State {
    /// `None` until `init` succeeds
    pub session: Option<Session>,
    /// Toggled on its own, independent of `init`
    pub dst_enabled: bool,
    /// Refreshed by every local time query. Families without a hardware leap
    /// year flag answer `is_leap_year` from this, so it can be stale.
    pub last_local_time: CalendarTime,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }
}
