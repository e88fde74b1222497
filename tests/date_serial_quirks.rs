//! Serial-date behavior, including the parts that are only explainable by
//! history: the phantom 1900 leap day, the January 0 placeholder, and the
//! weekday cycle Lotus printed.

mod common;

use common::*;
use sheetcalc::date::{serial_from_ymd, DateSystem};
use sheetcalc::ErrorKind;

fn date(y: f64, m: f64, d: f64) -> sheetcalc::Expr {
    call("DATE", vec![num(y), num(m), num(d)])
}

fn serial(y: i32, m: u32, d: u32) -> f64 {
    serial_from_ymd(y, m, d, DateSystem::V1900).unwrap() as f64
}

#[test]
fn date_builds_serials_and_rolls_spilled_parts() {
    let sheet = Sheet::new();
    assert_eq!(eval(&sheet, date(2008.0, 1.0, 1.0)), n(39_448.0));
    // Month 14 spills into the next year, month -3 walks backwards.
    assert_eq!(eval(&sheet, date(2008.0, 14.0, 2.0)), n(39_846.0));
    assert_eq!(eval(&sheet, date(2008.0, -3.0, 2.0)), n(39_327.0));
    // Days spill the same way, in both directions.
    assert_eq!(eval(&sheet, date(2008.0, 1.0, 35.0)), n(39_482.0));
    assert_eq!(eval(&sheet, date(2008.0, 1.0, -5.0)), n(39_442.0));
}

#[test]
fn date_years_under_1900_shift_forward_a_century() {
    let sheet = Sheet::new();
    assert_eq!(eval(&sheet, date(108.0, 1.0, 2.0)), n(39_449.0));
    assert_eq!(eval(&sheet, date(98.0, 1.0, 2.0)), n(serial(1998, 1, 2)));
    // Even 1899 gets the shift, landing in the fourth millennium.
    assert_eq!(
        eval(&sheet, call("YEAR", vec![date(1899.0, 1.0, 1.0)])),
        n(3799.0)
    );
    assert_eq!(eval(&sheet, date(10_000.0, 1.0, 1.0)), err(ErrorKind::Num));
    assert_eq!(eval(&sheet, date(-1.0, 1.0, 1.0)), err(ErrorKind::Num));
}

#[test]
fn the_phantom_leap_day_owns_serial_60() {
    let sheet = Sheet::new();
    assert_eq!(eval(&sheet, date(1900.0, 2.0, 28.0)), n(59.0));
    assert_eq!(eval(&sheet, date(1900.0, 2.0, 29.0)), n(60.0));
    assert_eq!(eval(&sheet, date(1900.0, 3.0, 1.0)), n(61.0));
    assert_eq!(eval(&sheet, call("DAY", vec![num(60.0)])), n(29.0));
    assert_eq!(eval(&sheet, call("MONTH", vec![num(60.0)])), n(2.0));
}

#[test]
fn serial_zero_reads_as_january_zero() {
    let sheet = Sheet::new();
    assert_eq!(eval(&sheet, call("DAY", vec![num(0.0)])), n(0.0));
    assert_eq!(eval(&sheet, call("MONTH", vec![num(0.0)])), n(1.0));
    assert_eq!(eval(&sheet, call("YEAR", vec![num(0.0)])), n(1900.0));
    // Fractions truncate before the placeholder check.
    assert_eq!(eval(&sheet, call("DAY", vec![num(0.99)])), n(0.0));
    assert_eq!(eval(&sheet, call("DAY", vec![num(-1.0)])), err(ErrorKind::Num));
}

#[test]
fn serials_stop_at_year_9999() {
    let sheet = Sheet::new();
    assert_eq!(eval(&sheet, date(9999.0, 12.0, 31.0)), n(2_958_465.0));
    assert_eq!(eval(&sheet, call("YEAR", vec![num(2_958_465.0)])), n(9999.0));
    assert_eq!(
        eval(&sheet, call("YEAR", vec![num(2_958_466.0)])),
        err(ErrorKind::Num)
    );
    // Day 32 of December 9999 would roll past the cap.
    assert_eq!(eval(&sheet, date(9999.0, 12.0, 32.0)), err(ErrorKind::Num));
}

#[test]
fn weekday_keeps_the_lotus_cycle() {
    let sheet = Sheet::new();
    // January 1, 1900 was a Monday; the phantom day makes it report Sunday.
    assert_eq!(eval(&sheet, call("WEEKDAY", vec![num(1.0)])), n(1.0));
    assert_eq!(eval(&sheet, call("WEEKDAY", vec![num(60.0)])), n(4.0));
    // From March 1900 on, weekdays are true: serial 61 really was a Thursday.
    assert_eq!(eval(&sheet, call("WEEKDAY", vec![num(61.0)])), n(5.0));
    // January 1, 2024: a Monday, reported as one.
    assert_eq!(
        eval(&sheet, call("WEEKDAY", vec![date(2024.0, 1.0, 1.0)])),
        n(2.0)
    );
}

#[test]
fn weekday_return_types() {
    let sheet = Sheet::new();
    // Serial 45292 is Monday, January 1, 2024.
    let modes = [
        (1.0, 2.0),
        (2.0, 1.0),
        (3.0, 0.0),
        (11.0, 1.0),
        (12.0, 7.0),
        (13.0, 6.0),
        (14.0, 5.0),
        (15.0, 4.0),
        (16.0, 3.0),
        (17.0, 2.0),
    ];
    for (mode, expected) in modes {
        assert_eq!(
            eval(&sheet, call("WEEKDAY", vec![num(45_292.0), num(mode)])),
            n(expected),
            "return type {mode}"
        );
    }
    for bad in [0.0, 4.0, 18.0] {
        assert_eq!(
            eval(&sheet, call("WEEKDAY", vec![num(45_292.0), num(bad)])),
            err(ErrorKind::Num),
            "return type {bad}"
        );
    }
}

#[test]
fn edate_clamps_to_shorter_months() {
    let sheet = Sheet::new();
    let jan_31 = date(2008.0, 1.0, 31.0);
    assert_eq!(
        eval(&sheet, call("EDATE", vec![jan_31.clone(), num(1.0)])),
        n(39_507.0) // February 29, 2008
    );
    assert_eq!(
        eval(&sheet, call("EDATE", vec![jan_31, num(-1.0)])),
        n(39_447.0) // December 31, 2007
    );
    // The phantom day clamps like any month end once it leaves 1900.
    assert_eq!(
        eval(&sheet, call("EDATE", vec![num(60.0), num(12.0)])),
        n(serial(1901, 2, 28))
    );
}

#[test]
fn edate_carries_the_day_zero_placeholder() {
    let sheet = Sheet::new();
    // One month after "January 0" is the day before February 1.
    assert_eq!(eval(&sheet, call("EDATE", vec![num(0.0), num(1.0)])), n(31.0));
    // Backwards from serial 0 would leave the calendar.
    assert_eq!(
        eval(&sheet, call("EDATE", vec![num(0.0), num(-1.0)])),
        err(ErrorKind::Num)
    );
}

#[test]
fn eomonth_lands_on_month_ends() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, call("EOMONTH", vec![date(2008.0, 1.0, 1.0), num(1.0)])),
        n(39_507.0)
    );
    // January 1900's end of next month is the phantom day itself.
    assert_eq!(
        eval(&sheet, call("EOMONTH", vec![date(1900.0, 1.0, 15.0), num(1.0)])),
        n(60.0)
    );
    assert_eq!(eval(&sheet, call("EOMONTH", vec![num(0.0), num(0.0)])), n(31.0));
    assert_eq!(
        eval(
            &sheet,
            call("EOMONTH", vec![date(9999.0, 12.0, 1.0), num(1.0)]),
        ),
        err(ErrorKind::Num)
    );
}

#[test]
fn time_components_roll_over_midnight() {
    let sheet = Sheet::new();
    let time = |h: f64, m: f64, s: f64| call("TIME", vec![num(h), num(m), num(s)]);
    assert_eq!(eval(&sheet, time(12.0, 0.0, 0.0)), n(0.5));
    assert_eq!(eval(&sheet, time(25.0, 0.0, 0.0)), n(1.0 / 24.0));
    assert_eq!(eval(&sheet, time(0.0, 90.0, 0.0)), n(0.0625));
    assert_eq!(eval(&sheet, time(31.0, 0.0, 0.0)), n(7.0 / 24.0));
    // A negative total is an error, not a wrap backwards.
    assert_eq!(eval(&sheet, time(0.0, -10.0, 0.0)), err(ErrorKind::Num));
}

#[test]
fn clock_parts_split_the_fraction() {
    let sheet = Sheet::new();
    // 0.51 of a day is 12:14:24.
    assert_eq!(eval(&sheet, call("HOUR", vec![num(0.51)])), n(12.0));
    assert_eq!(eval(&sheet, call("MINUTE", vec![num(0.51)])), n(14.0));
    assert_eq!(eval(&sheet, call("SECOND", vec![num(0.51)])), n(24.0));
    assert_eq!(eval(&sheet, call("HOUR", vec![num(45_366.75)])), n(18.0));
    // Just under midnight rounds up to it.
    assert_eq!(eval(&sheet, call("HOUR", vec![num(0.999_999_9)])), n(0.0));
    assert_eq!(eval(&sheet, call("HOUR", vec![num(-0.5)])), err(ErrorKind::Num));
}

#[test]
fn days_subtracts_end_minus_start() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(
            &sheet,
            call("DAYS", vec![date(2024.0, 3.0, 15.0), date(2024.0, 1.0, 1.0)]),
        ),
        n(74.0)
    );
    assert_eq!(
        eval(&sheet, call("DAYS", vec![num(0.0), num(60.0)])),
        n(-60.0)
    );
    assert_eq!(
        eval(&sheet, call("DAYS", vec![num(-1.0), num(0.0)])),
        err(ErrorKind::Num)
    );
}

#[test]
fn datevalue_reads_culture_ordered_text() {
    let sheet = Sheet::new();
    assert_eq!(eval(&sheet, call("DATEVALUE", vec![text("3/15/2024")])), n(45_366.0));
    // A four-digit lead field forces year-first regardless of culture.
    assert_eq!(eval(&sheet, call("DATEVALUE", vec![text("2024-03-15")])), n(45_366.0));
    // Two-digit years: 00-29 are the 2000s.
    assert_eq!(eval(&sheet, call("DATEVALUE", vec![text("3/15/24")])), n(45_366.0));
    assert_eq!(
        eval(&sheet, call("DATEVALUE", vec![text("3/15/99")])),
        n(serial(1999, 3, 15))
    );
    // Any clock part is discarded.
    assert_eq!(
        eval(&sheet, call("DATEVALUE", vec![text("3/15/2024 6:00 PM")])),
        n(45_366.0)
    );
    for bad in ["banana", "12:30", "45366"] {
        assert_eq!(
            eval(&sheet, call("DATEVALUE", vec![text(bad)])),
            err(ErrorKind::Value),
            "{bad}"
        );
    }
}

#[test]
fn datevalue_under_a_day_first_culture() {
    let mut sheet = Sheet::new();
    sheet.culture = sheetcalc::locale::Culture::en_gb();
    assert_eq!(eval(&sheet, call("DATEVALUE", vec![text("15/3/2024")])), n(45_366.0));
    // Month 15 does not exist; field order is not guessed.
    assert_eq!(
        eval(&sheet, call("DATEVALUE", vec![text("3/15/2024")])),
        err(ErrorKind::Value)
    );
}

#[test]
fn datevalue_takes_the_missing_year_from_the_clock() {
    let mut sheet = Sheet::new();
    sheet.set_now(2031, 6, 1, 0, 0, 0);
    assert_eq!(
        eval(&sheet, call("DATEVALUE", vec![text("1/2")])),
        n(serial_from_ymd(2031, 1, 2, DateSystem::V1900).unwrap() as f64)
    );
}

#[test]
fn timevalue_extracts_the_clock_part() {
    let sheet = Sheet::new();
    let cases = [
        ("6:00 PM", 0.75),
        ("18:00", 0.75),
        ("6:00AM", 0.25),
        ("6 AM", 0.25),
        ("12:30 AM", 1_800.0 / 86_400.0),
        ("12:30 PM", 45_000.0 / 86_400.0),
        ("7:30:15", 27_015.0 / 86_400.0),
        ("25:00", 1.0 / 24.0),
        ("3/15/2024 6:00", 0.25),
    ];
    for (input, expected) in cases {
        assert_eq!(
            eval(&sheet, call("TIMEVALUE", vec![text(input)])),
            n(expected),
            "{input}"
        );
    }
    for bad in ["3/15/2024", "13:00 PM", "7:61", "noon"] {
        assert_eq!(
            eval(&sheet, call("TIMEVALUE", vec![text(bad)])),
            err(ErrorKind::Value),
            "{bad}"
        );
    }
}

#[test]
fn the_1904_system_shifts_the_epoch_and_drops_the_phantom() {
    let mut sheet = Sheet::new();
    sheet.date_system = DateSystem::V1904;
    assert_eq!(eval(&sheet, date(1904.0, 1.0, 1.0)), n(0.0));
    assert_eq!(eval(&sheet, date(2024.0, 1.0, 1.0)), n(43_830.0));
    assert_eq!(eval(&sheet, date(1900.0, 2.0, 29.0)), err(ErrorKind::Num));
    assert_eq!(eval(&sheet, date(9999.0, 12.0, 31.0)), n(2_957_003.0));
    // Serial 0 is Friday, January 1, 1904, and weekdays stay true.
    assert_eq!(eval(&sheet, call("WEEKDAY", vec![num(0.0)])), n(6.0));
    assert_eq!(eval(&sheet, call("DAY", vec![num(0.0)])), n(1.0));
}
