//! Coercion as seen from formulas: signature-driven argument conversion,
//! culture flowing in from the context, and `VALUE`'s two-stage parse
//! (number text first, then date/time text).

mod common;

use common::*;
use sheetcalc::date::{serial_from_ymd, DateSystem};
use sheetcalc::eval::{BinaryOp, Expr};
use sheetcalc::locale::Culture;
use sheetcalc::{ErrorKind, Value};

#[test]
fn number_parameters_run_the_coercion_table() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "-3");
    sheet.set("A2", true);
    sheet.set("A4", "pear");

    assert_eq!(eval(&sheet, call("ABS", vec![range("A1")])), n(3.0));
    assert_eq!(eval(&sheet, call("ABS", vec![range("A2")])), n(1.0));
    // A3 is blank and reads as zero.
    assert_eq!(eval(&sheet, call("ABS", vec![range("A3")])), n(0.0));
    assert_eq!(
        eval(&sheet, call("ABS", vec![range("A4")])),
        err(ErrorKind::Value)
    );
}

#[test]
fn logical_text_must_spell_true_or_false() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, call("NOT", vec![text(" false ")])),
        Value::from(true)
    );
    assert_eq!(
        eval(&sheet, call("NOT", vec![text("1")])),
        err(ErrorKind::Value)
    );
}

#[test]
fn value_accepts_the_number_text_grammar() {
    let sheet = Sheet::new();
    assert_eq!(eval(&sheet, call("VALUE", vec![text(" $1,000 ")])), n(1000.0));
    assert_eq!(eval(&sheet, call("VALUE", vec![text("5%")])), n(0.05));
    assert_eq!(eval(&sheet, call("VALUE", vec![text("2 1/2")])), n(2.5));
    assert_eq!(eval(&sheet, call("VALUE", vec![text("(8)")])), n(-8.0));
    assert_eq!(
        eval(&sheet, call("VALUE", vec![text("pear")])),
        err(ErrorKind::Value)
    );
}

#[test]
fn value_falls_back_to_date_and_time_text() {
    let sheet = Sheet::new();
    let jan_2 = serial_from_ymd(2024, 1, 2, DateSystem::V1900).unwrap() as f64;

    assert_eq!(eval(&sheet, call("VALUE", vec![text("1/2/2024")])), n(jan_2));
    assert_eq!(eval(&sheet, call("VALUE", vec![text("3:00 PM")])), n(0.625));
    assert_eq!(
        eval(&sheet, call("VALUE", vec![text("1/2/2024 12:00")])),
        n(jan_2 + 0.5)
    );
}

#[test]
fn month_first_is_a_culture_choice_not_a_constant() {
    let mut sheet = Sheet::new();
    sheet.culture = Culture::en_gb();
    // Day-first: 1/2/2024 is February 1.
    let feb_1 = serial_from_ymd(2024, 2, 1, DateSystem::V1900).unwrap() as f64;
    assert_eq!(eval(&sheet, call("VALUE", vec![text("1/2/2024")])), n(feb_1));
}

#[test]
fn short_dates_take_the_year_from_the_clock() {
    let mut sheet = Sheet::new();
    sheet.set_now(2031, 6, 15, 0, 0, 0);
    let expected = serial_from_ymd(2031, 1, 2, DateSystem::V1900).unwrap() as f64;
    assert_eq!(eval(&sheet, call("VALUE", vec![text("1/2")])), n(expected));
}

#[test]
fn decimal_comma_culture_reads_and_writes_commas() {
    let mut sheet = Sheet::new();
    sheet.culture = Culture::de_de();

    assert_eq!(eval(&sheet, call("VALUE", vec![text("1.234,5")])), n(1234.5));
    // "1,5" is a number here, never a January 5 date.
    assert_eq!(eval(&sheet, call("VALUE", vec![text("1,5")])), n(1.5));
    assert_eq!(
        eval(&sheet, Expr::binary(BinaryOp::Concat, num(2.5), text(" kg"))),
        t("2,5 kg")
    );
}

#[test]
fn dotted_dates_only_exist_where_dot_is_not_the_decimal_point() {
    let mut sheet = Sheet::new();
    // en-US: "1.5" must stay the number one and a half.
    assert_eq!(eval(&sheet, call("VALUE", vec![text("1.5")])), n(1.5));

    sheet.culture = Culture::de_de();
    sheet.set_now(2024, 6, 15, 0, 0, 0);
    // de-DE: "1.5" is not validly grouped thousands, so it reads as the
    // dotted date 1.5. (May 1, day-first).
    let may_1 = serial_from_ymd(2024, 5, 1, DateSystem::V1900).unwrap() as f64;
    assert_eq!(eval(&sheet, call("VALUE", vec![text("1.5")])), n(may_1));
}

#[test]
fn t_keeps_text_and_drops_everything_else() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "label");
    sheet.set("A2", 3.0);
    sheet.set("A3", ErrorKind::Name);

    assert_eq!(eval(&sheet, call("T", vec![range("A1")])), t("label"));
    assert_eq!(eval(&sheet, call("T", vec![range("A2")])), t(""));
    assert_eq!(eval(&sheet, call("T", vec![range("A3")])), err(ErrorKind::Name));
}
