mod common;

use common::RegisterBus;
use multi_rtc::{CalendarTime, DeviceType, Error, Rtc, SquareWave, ValidationError};

const MCP7941X: u8 = 0x6F;
const DS1307: u8 = 0x68;
const PCF8583: u8 = 0x50;

fn rtc_on(bus: &RegisterBus, device: DeviceType, time_zone: i8) -> Rtc<RegisterBus> {
    let mut rtc = Rtc::new(bus.clone());
    rtc.init(device, time_zone).unwrap();
    rtc
}

#[test]
fn seconds_write_keeps_the_oscillator_running() {
    let bus = RegisterBus::new();
    // ST set, VBATEN set next to the weekday
    bus.set(MCP7941X, 0x00, 0x80);
    bus.set(MCP7941X, 0x03, 0x08);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, 0);

    let time = CalendarTime::new(42, 15, 10, 3, 14, 8, 24);
    rtc.set_gmt_time(&time).unwrap();

    assert_eq!(bus.get(MCP7941X, 0x00), 0x80 | 0x42);
    assert_eq!(bus.get(MCP7941X, 0x03), 0x08 | 0x03);
    assert_eq!(rtc.get_gmt_time(), Ok(time));
}

#[test]
fn out_of_range_times_never_reach_the_bus() {
    let bus = RegisterBus::new();
    let mut rtc = rtc_on(&bus, DeviceType::Ds1307, 0);
    let writes = bus.writes();

    assert_eq!(
        rtc.set_gmt_time(&CalendarTime::new(60, 0, 0, 1, 1, 1, 24)),
        Err(Error::Validation(ValidationError::Seconds(60)))
    );
    assert_eq!(
        rtc.set_gmt_time(&CalendarTime::new(0, 0, 24, 1, 1, 1, 24)),
        Err(Error::Validation(ValidationError::Hours(24)))
    );
    assert_eq!(
        rtc.set_local_time(&CalendarTime::new(0, 0, 0, 1, 1, 13, 24)),
        Err(Error::Validation(ValidationError::Month(13)))
    );
    assert_eq!(bus.writes(), writes);
}

#[test]
fn init_starts_a_halted_clock() {
    let bus = RegisterBus::new();
    bus.set(DS1307, 0x00, 0x80 | 0x30);
    let _rtc = rtc_on(&bus, DeviceType::Ds1307, 0);
    assert_eq!(bus.get(DS1307, 0x00), 0x30);
}

#[test]
fn init_rejects_bad_time_zones() {
    let bus = RegisterBus::new();
    let mut rtc = Rtc::new(bus.clone());
    assert_eq!(
        rtc.init(DeviceType::Mcp7941x, -13),
        Err(Error::Validation(ValidationError::TimeZone(-13)))
    );
    assert_eq!(rtc.get_gmt_time(), Err(Error::Uninitialized));
    assert_eq!(bus.reads() + bus.writes(), 0);
}

#[test]
fn pcf8583_packs_weekday_and_drops_the_year() {
    let bus = RegisterBus::new();
    // Alarm enable on, year bits 0b01 in the date register
    bus.set(PCF8583, 0x00, 0x04);
    bus.set(PCF8583, 0x05, 0x40);
    let mut rtc = rtc_on(&bus, DeviceType::Pcf8583, 0);

    let gmt = CalendarTime::new(5, 4, 3, 5, 15, 3, 24);
    rtc.set_gmt_time(&gmt).unwrap();

    assert_eq!(bus.get(PCF8583, 0x05), 0x40 | 0x15);
    assert_eq!(bus.get(PCF8583, 0x06), (4 << 5) | 0x03);
    // Counter hold released, alarm enable untouched
    assert_eq!(bus.get(PCF8583, 0x00), 0x04);
    assert_eq!(
        rtc.get_gmt_time(),
        Ok(CalendarTime::new(5, 4, 3, 5, 15, 3, 0))
    );
}

#[test]
fn local_time_applies_the_time_zone() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, -5);
    let gmt = CalendarTime::new(0, 0, 2, 1, 1, 7, 24);
    rtc.set_gmt_time(&gmt).unwrap();

    // Back across midnight into Sunday
    assert_eq!(
        rtc.get_local_time(),
        Ok(CalendarTime::new(0, 0, 21, 7, 30, 6, 24))
    );
}

#[test]
fn daylight_saving_moves_local_time_both_ways() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, -5);
    rtc.enable_dst();
    assert!(rtc.is_dst_enabled());

    let gmt = CalendarTime::new(0, 0, 12, 1, 1, 7, 24);
    rtc.set_gmt_time(&gmt).unwrap();
    assert_eq!(rtc.get_local_time().map(|time| time.hours), Ok(8));

    let gmt = CalendarTime::new(0, 0, 12, 1, 15, 1, 24);
    rtc.set_gmt_time(&gmt).unwrap();
    assert_eq!(rtc.get_local_time().map(|time| time.hours), Ok(6));

    rtc.disable_dst();
    assert_eq!(rtc.get_local_time().map(|time| time.hours), Ok(7));
}

#[test]
fn set_local_time_round_trips() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, -5);
    rtc.enable_dst();

    let local = CalendarTime::new(0, 0, 8, 1, 1, 7, 24);
    rtc.set_local_time(&local).unwrap();

    assert_eq!(
        rtc.get_gmt_time(),
        Ok(CalendarTime::new(0, 0, 12, 1, 1, 7, 24))
    );
    assert_eq!(rtc.get_local_time(), Ok(local));
}

#[test]
fn set_local_time_inverts_the_dst_end() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, 0);
    rtc.enable_dst();

    // Half an hour before the switch on 2024-11-03, a Sunday
    let gmt = CalendarTime::new(0, 30, 1, 7, 3, 11, 24);
    rtc.set_gmt_time(&gmt).unwrap();
    let local = rtc.get_local_time().unwrap();
    assert_eq!((local.hours, local.minutes), (2, 30));

    let other = CalendarTime::new(0, 0, 0, 1, 1, 1, 24);
    rtc.set_gmt_time(&other).unwrap();
    rtc.set_local_time(&local).unwrap();
    assert_eq!(rtc.get_gmt_time(), Ok(gmt));
}

#[test]
fn set_local_time_outside_dst() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, -5);
    rtc.enable_dst();

    let gmt = CalendarTime::new(0, 0, 12, 1, 15, 1, 24);
    rtc.set_gmt_time(&gmt).unwrap();
    let local = rtc.get_local_time().unwrap();
    assert_eq!(local.hours, 6);

    rtc.set_local_time(&local).unwrap();
    assert_eq!(rtc.get_gmt_time(), Ok(gmt));
}

#[test]
fn unix_times() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, 2);
    let gmt = CalendarTime::new(0, 0, 0, 5, 1, 3, 24);
    rtc.set_gmt_time(&gmt).unwrap();

    assert_eq!(rtc.get_gmt_unix_time(), Ok(1_709_251_200));
    assert_eq!(rtc.get_local_unix_time(), Ok(1_709_251_200 + 2 * 3600));
}

#[test]
fn computed_leap_year_follows_the_last_local_read() {
    let bus = RegisterBus::new();
    let mut rtc = rtc_on(&bus, DeviceType::Ds1307, 0);
    let gmt = CalendarTime::new(0, 0, 12, 3, 1, 6, 23);
    rtc.set_gmt_time(&gmt).unwrap();

    // Nothing read yet, so the cache still says 2000
    assert_eq!(rtc.is_leap_year(), Ok(true));
    rtc.get_local_time().unwrap();
    assert_eq!(rtc.is_leap_year(), Ok(false));
}

#[test]
fn mcp7941x_leap_year_comes_from_the_chip() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    bus.set(MCP7941X, 0x05, 0x20 | 0x02);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, 0);
    assert_eq!(rtc.is_leap_year(), Ok(true));

    bus.set(MCP7941X, 0x05, 0x02);
    assert_eq!(rtc.is_leap_year(), Ok(false));
}

#[test]
fn pcf8583_never_reports_a_leap_year() {
    let bus = RegisterBus::new();
    let mut rtc = rtc_on(&bus, DeviceType::Pcf8583, 0);
    assert_eq!(rtc.is_leap_year(), Ok(false));
    assert_eq!(bus.reads(), 0);
}

#[test]
fn power_failure_stamp() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    bus.set(MCP7941X, 0x03, 0x10 | 0x08 | 0x02);
    bus.load(MCP7941X, 0x18, &[0x30, 0x14, 0x25, (3 << 5) | 0x12]);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, 0);

    assert_eq!(rtc.is_power_failure(), Ok(true));
    assert_eq!(
        rtc.get_last_power_failure(),
        Ok(CalendarTime::new(0, 30, 14, 3, 25, 12, 0))
    );
}

#[test]
fn bq32000_reports_oscillator_failure() {
    let bus = RegisterBus::new();
    let mut rtc = rtc_on(&bus, DeviceType::Bq32000, 0);
    assert_eq!(rtc.is_power_failure(), Ok(false));
    bus.set(DS1307, 0x01, 0x80);
    assert_eq!(rtc.is_power_failure(), Ok(true));
}

#[test]
fn battery_and_square_wave() {
    let bus = RegisterBus::new();
    bus.set(MCP7941X, 0x00, 0x80);
    bus.set(MCP7941X, 0x03, 0x04);
    bus.set(MCP7941X, 0x07, 0x80 | 0x03);
    let mut rtc = rtc_on(&bus, DeviceType::Mcp7941x, 0);

    rtc.enable_battery().unwrap();
    assert_eq!(bus.get(MCP7941X, 0x03), 0x0C);
    rtc.disable_battery().unwrap();
    assert_eq!(bus.get(MCP7941X, 0x03), 0x04);

    rtc.enable_swo(SquareWave::KHz8_192).unwrap();
    assert_eq!(bus.get(MCP7941X, 0x07), 0x80 | 0x40 | 0x02);
    rtc.disable_swo().unwrap();
    assert_eq!(bus.get(MCP7941X, 0x07), 0x80 | 0x02);
}

#[test]
fn unsupported_extras_stay_off_the_bus() {
    let bus = RegisterBus::new();
    let mut rtc = rtc_on(&bus, DeviceType::Pcf8583, 0);

    rtc.enable_swo(SquareWave::Hz1).unwrap();
    rtc.disable_swo().unwrap();
    rtc.enable_battery().unwrap();
    assert_eq!(rtc.is_power_failure(), Ok(false));
    assert_eq!(rtc.get_last_power_failure(), Ok(CalendarTime::default()));
    assert_eq!(bus.reads() + bus.writes(), 0);
}
