//! Date and time builtins over the serial-date helpers. The phantom
//! 1900-02-29 flows through these unchanged: DATE can produce serial 60,
//! EOMONTH of January 1900 lands on it, and WEEKDAY stays aligned with the
//! weekdays Lotus reported on either side of it.

use chrono::{Datelike, Timelike};

use crate::date::{
    add_months, days_in_month, serial_arg, serial_from_date, serial_from_ymd, serial_to_ymd,
    split_time, time_fraction, DateSystem, Ymd, SECONDS_PER_DAY,
};
use crate::locale::{Culture, DateOrder};
use crate::value::{ErrorKind, Value};

use super::{
    number_value, Call, FunctionImpl, FunctionSpec, ParamKind, ReturnShape, SideEffect, Signature,
    Volatility,
};

static THREE_NUMBERS: Signature =
    Signature::fixed(&[ParamKind::Number, ParamKind::Number, ParamKind::Number]);
static TWO_NUMBERS: Signature = Signature::fixed(&[ParamKind::Number, ParamKind::Number]);
static ONE_NUMBER: Signature = Signature::fixed(&[ParamKind::Number]);
static WEEKDAY_ARGS: Signature =
    Signature::fixed(&[ParamKind::Number, ParamKind::OptionalNumber(1.0)]);
static ONE_TEXT: Signature = Signature::fixed(&[ParamKind::Text]);
static NO_ARGS: Signature = Signature::fixed(&[]);

inventory::submit! {
    FunctionSpec {
        name: "DATE",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&THREE_NUMBERS, date),
    }
}

fn date(call: &Call<'_>) -> Value {
    let system = call.cells().date_system();
    let year = call.number(0).trunc();
    // Two-digit-era years shift forward a century; 10000+ is out of range.
    if !(0.0..=9999.0).contains(&year) {
        return Value::from(ErrorKind::Num);
    }
    let mut year = year as i32;
    if year < 1900 {
        year += 1900;
    }
    let (month, day) = match (int_arg(call.number(1)), int_arg(call.number(2))) {
        (Ok(month), Ok(day)) => (month, day),
        _ => return Value::from(ErrorKind::Num),
    };
    // Out-of-range months and days roll rather than fail: DATE(2008, -3, 2)
    // is September 2, 2007.
    let (year, month) = add_months(year, 1, month - 1);
    let first = match serial_from_ymd(year, month, 1, system) {
        Some(serial) => serial,
        None => return Value::from(ErrorKind::Num),
    };
    let serial = first + day - 1;
    if serial < 0 || serial > system.max_serial() {
        return Value::from(ErrorKind::Num);
    }
    Value::from(serial as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "TIME",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&THREE_NUMBERS, time),
    }
}

fn time(call: &Call<'_>) -> Value {
    number_value(time_fraction(
        call.number(0),
        call.number(1),
        call.number(2),
    ))
}

inventory::submit! {
    FunctionSpec {
        name: "YEAR",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, year),
    }
}

fn year(call: &Call<'_>) -> Value {
    match date_part(call) {
        Ok(ymd) => Value::from(f64::from(ymd.year)),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "MONTH",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, month),
    }
}

fn month(call: &Call<'_>) -> Value {
    match date_part(call) {
        Ok(ymd) => Value::from(f64::from(ymd.month)),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "DAY",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, day),
    }
}

fn day(call: &Call<'_>) -> Value {
    // DAY(0) is 0: the serial-0 placeholder reads as "January 0, 1900".
    match date_part(call) {
        Ok(ymd) => Value::from(f64::from(ymd.day)),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "HOUR",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, hour),
    }
}

fn hour(call: &Call<'_>) -> Value {
    clock_part(call, |t| t.0)
}

inventory::submit! {
    FunctionSpec {
        name: "MINUTE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, minute),
    }
}

fn minute(call: &Call<'_>) -> Value {
    clock_part(call, |t| t.1)
}

inventory::submit! {
    FunctionSpec {
        name: "SECOND",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, second),
    }
}

fn second(call: &Call<'_>) -> Value {
    clock_part(call, |t| t.2)
}

inventory::submit! {
    FunctionSpec {
        name: "WEEKDAY",
        min_args: 1,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&WEEKDAY_ARGS, weekday),
    }
}

fn weekday(call: &Call<'_>) -> Value {
    let system = call.cells().date_system();
    let serial = match serial_arg(call.number(0), system) {
        Ok(serial) => serial,
        Err(e) => return Value::from(e),
    };
    let anchor = match system {
        // Serial 1 reports as Sunday. January 1, 1900 was really a Monday,
        // but the phantom day means everything before March 1900 sits one
        // weekday early, exactly as Lotus printed it.
        DateSystem::V1900 => 6,
        // Serial 0 is Friday, January 1, 1904; no phantom, true weekdays.
        DateSystem::V1904 => 5,
    };
    let sunday_based = (serial + anchor) % 7;
    let return_type = call.number(1).trunc() as i64;
    let week_start = match return_type {
        1 => return Value::from((sunday_based + 1) as f64),
        3 => return Value::from(((sunday_based + 6) % 7) as f64),
        2 => 1,
        11..=16 => return_type - 10,
        17 => 0,
        _ => return Value::from(ErrorKind::Num),
    };
    Value::from(((sunday_based + 7 - week_start) % 7 + 1) as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "DAYS",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, days),
    }
}

fn days(call: &Call<'_>) -> Value {
    let system = call.cells().date_system();
    match (
        serial_arg(call.number(0), system),
        serial_arg(call.number(1), system),
    ) {
        (Ok(end), Ok(start)) => Value::from((end - start) as f64),
        (Err(e), _) | (_, Err(e)) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "EDATE",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, edate),
    }
}

fn edate(call: &Call<'_>) -> Value {
    let system = call.cells().date_system();
    match shifted_month(call, system) {
        Ok((year, month, 0)) => {
            // A day-0 start keeps its placeholder meaning: one month after
            // "January 0" is the day before February 1.
            match serial_from_ymd(year, month, 1, system) {
                Some(serial) if serial > 0 => Value::from((serial - 1) as f64),
                _ => Value::from(ErrorKind::Num),
            }
        }
        Ok((year, month, day)) => {
            let day = day.min(days_in_month(year, month, system));
            match serial_from_ymd(year, month, day, system) {
                Some(serial) => Value::from(serial as f64),
                None => Value::from(ErrorKind::Num),
            }
        }
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "EOMONTH",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, eomonth),
    }
}

fn eomonth(call: &Call<'_>) -> Value {
    let system = call.cells().date_system();
    match shifted_month(call, system) {
        Ok((year, month, _)) => {
            let last = days_in_month(year, month, system);
            match serial_from_ymd(year, month, last, system) {
                Some(serial) => Value::from(serial as f64),
                None => Value::from(ErrorKind::Num),
            }
        }
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "DATEVALUE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, datevalue),
    }
}

fn datevalue(call: &Call<'_>) -> Value {
    let culture = call.culture();
    let system = call.cells().date_system();
    let year = call.cells().now_utc().year();
    match parse_temporal_text(call.text(0), &culture, system, year) {
        // Any time-of-day part is discarded; DATEVALUE is whole days only.
        Some(TemporalText {
            date: Some(serial), ..
        }) => Value::from(serial as f64),
        _ => Value::from(ErrorKind::Value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "TIMEVALUE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, timevalue),
    }
}

fn timevalue(call: &Call<'_>) -> Value {
    let culture = call.culture();
    let system = call.cells().date_system();
    let year = call.cells().now_utc().year();
    match parse_temporal_text(call.text(0), &culture, system, year) {
        Some(TemporalText {
            time: Some(fraction),
            ..
        }) => Value::from(fraction),
        _ => Value::from(ErrorKind::Value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "TODAY",
        min_args: 0,
        max_args: 0,
        volatility: Volatility::Volatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NO_ARGS, today),
    }
}

fn today(call: &Call<'_>) -> Value {
    let system = call.cells().date_system();
    let serial = serial_from_date(call.cells().now_utc().date_naive(), system);
    Value::from(serial as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "NOW",
        min_args: 0,
        max_args: 0,
        volatility: Volatility::Volatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NO_ARGS, now),
    }
}

fn now(call: &Call<'_>) -> Value {
    let system = call.cells().date_system();
    let now = call.cells().now_utc();
    let serial = serial_from_date(now.date_naive(), system);
    let seconds = f64::from(now.time().num_seconds_from_midnight());
    Value::from(serial as f64 + seconds / SECONDS_PER_DAY)
}

/// Truncates an argument that must land within i32, as DATE's month and
/// day offsets do.
fn int_arg(n: f64) -> Result<i64, ErrorKind> {
    if !n.is_finite() || n.abs() >= f64::from(i32::MAX) {
        return Err(ErrorKind::Num);
    }
    Ok(n.trunc() as i64)
}

fn date_part(call: &Call<'_>) -> Result<Ymd, ErrorKind> {
    let system = call.cells().date_system();
    let serial = serial_arg(call.number(0), system)?;
    serial_to_ymd(serial, system)
}

fn clock_part(call: &Call<'_>, pick: fn(&(u32, u32, u32)) -> u32) -> Value {
    let system = call.cells().date_system();
    let value = call.number(0);
    if let Err(e) = serial_arg(value, system) {
        return Value::from(e);
    }
    Value::from(f64::from(pick(&split_time(value))))
}

/// Start date shifted by a month count; shared by EDATE and EOMONTH.
fn shifted_month(call: &Call<'_>, system: DateSystem) -> Result<(i32, u32, u32), ErrorKind> {
    let serial = serial_arg(call.number(0), system)?;
    let ymd = serial_to_ymd(serial, system)?;
    let months = int_arg(call.number(1))?;
    let (year, month) = add_months(ymd.year, ymd.month, months);
    Ok((year, month, ymd.day))
}

/// Date and/or time parsed from one piece of text.
pub(super) struct TemporalText {
    pub date: Option<i64>,
    pub time: Option<f64>,
}

impl TemporalText {
    /// Combined serial; a missing part contributes zero.
    pub fn serial(&self) -> f64 {
        self.date.unwrap_or(0) as f64 + self.time.unwrap_or(0.0)
    }
}

/// Parses `date`, `time`, or `date time` text. Dates are numeric-only
/// (`3/15/2024`, `2024-03-15`); month names are a formatting concern this
/// layer does not know about. Two-field dates take the current year.
pub(super) fn parse_temporal_text(
    text: &str,
    culture: &Culture,
    system: DateSystem,
    current_year: i32,
) -> Option<TemporalText> {
    let mut parts: Vec<&str> = text.split_whitespace().collect();
    let meridian = parts.last().and_then(|part| parse_meridian(part));
    if meridian.is_some() {
        parts.pop();
    }
    let (date, time) = match parts.as_slice() {
        [one] if one.contains(':') || meridian.is_some() => {
            (None, Some(parse_clock(one, meridian)?))
        }
        [one] => (
            Some(parse_date_fields(one, culture, system, current_year)?),
            None,
        ),
        [date, clock] if clock.contains(':') || meridian.is_some() => (
            Some(parse_date_fields(date, culture, system, current_year)?),
            Some(parse_clock(clock, meridian)?),
        ),
        _ => return None,
    };
    Some(TemporalText { date, time })
}

fn parse_meridian(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("AM") {
        Some(false)
    } else if token.eq_ignore_ascii_case("PM") {
        Some(true)
    } else {
        None
    }
}

/// `h:mm`, `h:mm:ss`, or a bare hour when a meridian marker is present.
/// Hours roll over midnight; minutes and seconds must be under 60.
fn parse_clock(token: &str, meridian: Option<bool>) -> Option<f64> {
    let upper = token.trim().to_ascii_uppercase();
    let mut clock = upper.as_str();
    let mut meridian = meridian;
    if meridian.is_none() {
        if let Some(rest) = clock.strip_suffix("AM") {
            meridian = Some(false);
            clock = rest.trim_end();
        } else if let Some(rest) = clock.strip_suffix("PM") {
            meridian = Some(true);
            clock = rest.trim_end();
        }
    }
    let mut fields = clock.split(':');
    let hour: u32 = fields.next()?.trim().parse().ok()?;
    let minute: u32 = match fields.next() {
        Some(field) => field.trim().parse().ok()?,
        None if meridian.is_some() => 0,
        None => return None,
    };
    let second: f64 = match fields.next() {
        Some(field) => field.trim().parse().ok()?,
        None => 0.0,
    };
    if fields.next().is_some() || minute >= 60 || !(0.0..60.0).contains(&second) {
        return None;
    }
    let hour = match meridian {
        Some(pm) => {
            if hour == 0 || hour > 12 {
                return None;
            }
            hour % 12 + if pm { 12 } else { 0 }
        }
        None => hour,
    };
    time_fraction(f64::from(hour), f64::from(minute), second).ok()
}

/// Numeric date fields under the culture's component order. A leading
/// field of three or more digits (or a value over 31) forces year-first.
/// The dot separator is only live where it is not the decimal separator.
fn parse_date_fields(
    token: &str,
    culture: &Culture,
    system: DateSystem,
    current_year: i32,
) -> Option<i64> {
    let dotted = culture.decimal_sep != '.';
    let fields: Vec<&str> = token
        .split(|c: char| c == '/' || c == '-' || (dotted && c == '.'))
        .collect();
    let mut nums = Vec::with_capacity(fields.len());
    for field in &fields {
        nums.push(field.trim().parse::<u32>().ok()?);
    }
    let (year, month, day) = match nums.as_slice() {
        [a, b] => {
            // No year given; the evaluation date supplies it.
            let (month, day) = match culture.date_order {
                DateOrder::DMY => (*b, *a),
                DateOrder::MDY | DateOrder::YMD => (*a, *b),
            };
            (current_year, month, day)
        }
        [a, b, c] => {
            if fields[0].trim().len() > 2 || *a > 31 {
                (normalize_year(*a), *b, *c)
            } else {
                match culture.date_order {
                    DateOrder::MDY => (normalize_year(*c), *a, *b),
                    DateOrder::DMY => (normalize_year(*c), *b, *a),
                    DateOrder::YMD => (normalize_year(*a), *b, *c),
                }
            }
        }
        _ => return None,
    };
    if !(1..=12).contains(&month) {
        return None;
    }
    serial_from_ymd(year, month, day, system)
}

/// Two-digit years: 00-29 are 2000s, 30-99 are 1900s.
fn normalize_year(year: u32) -> i32 {
    match year {
        0..=29 => year as i32 + 2000,
        30..=99 => year as i32 + 1900,
        _ => year as i32,
    }
}
