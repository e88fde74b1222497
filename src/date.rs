//! Serial-date arithmetic. The 1900 date system reproduces the Lotus
//! leap-year bug: serial 60 is the nonexistent 1900-02-29, and every real
//! date from 1900-03-01 on is shifted by one day. Serial 0 is the "January
//! 0, 1900" placeholder used by time-only values.

use chrono::{Datelike, NaiveDate};

use crate::value::ErrorKind;

/// Days-from-CE anchors (chrono's `num_days_from_ce` epoch).
const CE_1899_12_31: i32 = 693_595;
const CE_1904_01_01: i32 = 695_056;
/// First real serial after the phantom leap day.
const FIRST_POST_BUG_SERIAL: i64 = 61;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    #[default]
    V1900,
    V1904,
}

impl DateSystem {
    /// Largest representable serial (9999-12-31).
    pub fn max_serial(self) -> i64 {
        match self {
            DateSystem::V1900 => 2_958_465,
            DateSystem::V1904 => 2_957_003,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ymd {
    pub year: i32,
    pub month: u32,
    /// 0 only for the serial-0 placeholder in the 1900 system.
    pub day: u32,
}

impl Ymd {
    pub fn new(year: i32, month: u32, day: u32) -> Ymd {
        Ymd { year, month, day }
    }
}

/// Serial for a calendar date. `(1900, 2, 29)` is accepted in the 1900
/// system (the phantom day); all other inputs must be real Gregorian dates.
pub fn serial_from_ymd(year: i32, month: u32, day: u32, system: DateSystem) -> Option<i64> {
    if system == DateSystem::V1900 && (year, month, day) == (1900, 2, 29) {
        return Some(60);
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let serial = serial_from_date(date, system);
    (serial >= 0 && serial <= system.max_serial()).then_some(serial)
}

/// Serial for a chrono date (used by `TODAY`/`NOW`); no range check.
pub fn serial_from_date(date: NaiveDate, system: DateSystem) -> i64 {
    let days = i64::from(date.num_days_from_ce());
    match system {
        DateSystem::V1900 => {
            let serial = days - i64::from(CE_1899_12_31);
            if serial >= FIRST_POST_BUG_SERIAL - 1 {
                serial + 1
            } else {
                serial
            }
        }
        DateSystem::V1904 => days - i64::from(CE_1904_01_01),
    }
}

pub fn serial_to_ymd(serial: i64, system: DateSystem) -> Result<Ymd, ErrorKind> {
    if serial < 0 || serial > system.max_serial() {
        return Err(ErrorKind::Num);
    }
    let days = match system {
        DateSystem::V1900 => {
            if serial == 0 {
                return Ok(Ymd::new(1900, 1, 0));
            }
            if serial == 60 {
                return Ok(Ymd::new(1900, 2, 29));
            }
            let adjust = if serial >= FIRST_POST_BUG_SERIAL { 1 } else { 0 };
            CE_1899_12_31 as i64 + serial - adjust
        }
        DateSystem::V1904 => CE_1904_01_01 as i64 + serial,
    };
    let date = NaiveDate::from_num_days_from_ce_opt(days as i32).ok_or(ErrorKind::Num)?;
    Ok(Ymd::new(date.year(), date.month(), date.day()))
}

/// Validates and truncates a numeric date argument. Negative serials and
/// serials past 9999-12-31 are `#NUM!`.
pub fn serial_arg(value: f64, system: DateSystem) -> Result<i64, ErrorKind> {
    if !value.is_finite() {
        return Err(ErrorKind::Num);
    }
    let serial = value.trunc() as i64;
    if value < 0.0 || serial > system.max_serial() {
        return Err(ErrorKind::Num);
    }
    Ok(serial)
}

/// Month length as the date system believes it; February 1900 has 29 days
/// in the 1900 system.
pub fn days_in_month(year: i32, month: u32, system: DateSystem) -> u32 {
    if system == DateSystem::V1900 && (year, month) == (1900, 2) {
        return 29;
    }
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// `(year, month + delta)` renormalized to month 1-12.
pub fn add_months(year: i32, month: u32, delta: i64) -> (i32, u32) {
    let total = i64::from(year) * 12 + i64::from(month) - 1 + delta;
    let year = total.div_euclid(12) as i32;
    let month = (total.rem_euclid(12) + 1) as u32;
    (year, month)
}

/// Fraction of a day for an hour/minute/second triple; components roll over
/// (`TIME(25, 0, 0)` is 1 AM) and a negative total is `#NUM!`.
pub fn time_fraction(hour: f64, minute: f64, second: f64) -> Result<f64, ErrorKind> {
    if !hour.is_finite() || !minute.is_finite() || !second.is_finite() {
        return Err(ErrorKind::Num);
    }
    let total = hour.trunc() * 3600.0 + minute.trunc() * 60.0 + second.trunc();
    if total < 0.0 {
        return Err(ErrorKind::Num);
    }
    Ok((total % SECONDS_PER_DAY) / SECONDS_PER_DAY)
}

/// Splits the fractional part of a serial into (hour, minute, second),
/// rounded to the nearest second.
pub fn split_time(serial: f64) -> (u32, u32, u32) {
    let frac = serial.fract().abs();
    let total = (frac * SECONDS_PER_DAY).round() as u64 % 86_400;
    (
        (total / 3600) as u32,
        (total % 3600 / 60) as u32,
        (total % 60) as u32,
    )
}
