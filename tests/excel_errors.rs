//! Error values as data: eager calls poison left to right, lazy forms
//! shield untaken branches, folds differ between direct arguments and
//! range elements, and every code renders its canonical display text.

mod common;

use common::*;
use sheetcalc::eval::Expr;
use sheetcalc::{ErrorKind, Value};

#[test]
fn eager_arguments_poison_left_to_right() {
    let mut sheet = Sheet::new();
    sheet.set("A1", ErrorKind::NA);
    assert_eq!(
        eval(&sheet, call("POWER", vec![range("A1"), num(2.0)])),
        err(ErrorKind::NA)
    );
    // The leftmost failure decides which error comes out.
    assert_eq!(
        eval(&sheet, call("POWER", vec![text("pear"), range("A1")])),
        err(ErrorKind::Value)
    );
}

#[test]
fn lazy_forms_only_touch_the_taken_branch() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(
            &sheet,
            call(
                "IF",
                vec![logical(true), num(1.0), Expr::Error(ErrorKind::Div0)],
            )
        ),
        n(1.0)
    );
    assert_eq!(
        eval(
            &sheet,
            call(
                "IF",
                vec![Expr::Error(ErrorKind::Ref), num(1.0), num(2.0)],
            )
        ),
        err(ErrorKind::Ref)
    );
    assert_eq!(
        eval(
            &sheet,
            call(
                "IFS",
                vec![
                    logical(true),
                    text("hit"),
                    Expr::Error(ErrorKind::Num),
                    text("never"),
                ],
            )
        ),
        t("hit")
    );
}

#[test]
fn iferror_and_ifna_split_the_catch() {
    let mut sheet = Sheet::new();
    sheet.set("A1", ErrorKind::Div0);
    sheet.set("A2", ErrorKind::NA);

    assert_eq!(
        eval(&sheet, call("IFERROR", vec![range("A1"), num(0.0)])),
        n(0.0)
    );
    assert_eq!(
        eval(&sheet, call("IFERROR", vec![num(5.0), num(0.0)])),
        n(5.0)
    );
    assert_eq!(
        eval(&sheet, call("IFNA", vec![range("A2"), num(0.0)])),
        n(0.0)
    );
    // IFNA lets every other code through.
    assert_eq!(
        eval(&sheet, call("IFNA", vec![range("A1"), num(0.0)])),
        err(ErrorKind::Div0)
    );
}

#[test]
fn switch_compares_like_the_equals_operator() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(
            &sheet,
            call(
                "SWITCH",
                vec![num(2.0), num(1.0), text("one"), num(2.0), text("two")],
            )
        ),
        t("two")
    );
    // "2" is text; no case matches and the default wins.
    assert_eq!(
        eval(
            &sheet,
            call(
                "SWITCH",
                vec![text("2"), num(2.0), text("num"), text("fallback")],
            )
        ),
        t("fallback")
    );
    assert_eq!(
        eval(
            &sheet,
            call("SWITCH", vec![num(9.0), num(1.0), text("one")])
        ),
        err(ErrorKind::NA)
    );
}

#[test]
fn count_skips_element_errors_where_sum_propagates() {
    let mut sheet = Sheet::new();
    sheet.set("A1", true);
    sheet.set("A2", "1");
    sheet.set("A3", ErrorKind::Div0);
    sheet.set("A4", 5.0);

    assert_eq!(eval(&sheet, call("COUNT", vec![range("A1:A4")])), n(1.0));
    assert_eq!(eval(&sheet, call("COUNTA", vec![range("A1:A4")])), n(4.0));
    assert_eq!(
        eval(&sheet, call("SUM", vec![range("A1:A4")])),
        err(ErrorKind::Div0)
    );
    // Without the error cell the element rules still differ from direct
    // coercion: TRUE and "1" are invisible to SUM over a range.
    assert_eq!(eval(&sheet, call("SUM", vec![range("A1:A2")])), n(0.0));
}

#[test]
fn direct_arguments_coerce_where_elements_do_not() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, call("SUM", vec![logical(true), text("1"), num(5.0)])),
        n(7.0)
    );
    assert_eq!(
        eval(&sheet, call("COUNT", vec![logical(true), text("1"), text("x")])),
        n(2.0)
    );
    assert_eq!(
        eval(&sheet, call("SUM", vec![text("pear")])),
        err(ErrorKind::Value)
    );
}

#[test]
fn logical_folds_judge_only_what_they_can_read() {
    let mut sheet = Sheet::new();
    sheet.set("A1", 0.0);
    sheet.set("A2", "ignore me");
    sheet.set("A3", true);

    assert_eq!(
        eval(&sheet, call("AND", vec![range("A1:A3")])),
        Value::from(false)
    );
    assert_eq!(
        eval(&sheet, call("OR", vec![range("A1:A3")])),
        Value::from(true)
    );
    assert_eq!(
        eval(&sheet, call("XOR", vec![range("A1:A3")])),
        Value::from(true)
    );
    // A range of nothing judgeable is an error, not FALSE.
    assert_eq!(
        eval(&sheet, call("AND", vec![range("A2")])),
        err(ErrorKind::Value)
    );
}

#[test]
fn error_type_codes() {
    let mut sheet = Sheet::new();
    let codes = [
        (ErrorKind::Null, 1.0),
        (ErrorKind::Div0, 2.0),
        (ErrorKind::Value, 3.0),
        (ErrorKind::Ref, 4.0),
        (ErrorKind::Name, 5.0),
        (ErrorKind::Num, 6.0),
        (ErrorKind::NA, 7.0),
    ];
    for (i, (kind, _)) in codes.iter().enumerate() {
        sheet.set(&format!("A{}", i + 1), *kind);
    }
    for (i, (_, expected)) in codes.iter().enumerate() {
        let addr = format!("A{}", i + 1);
        assert_eq!(
            eval(&sheet, call("ERROR.TYPE", vec![range(&addr)])),
            n(*expected)
        );
    }
    assert_eq!(
        eval(&sheet, call("ERROR.TYPE", vec![num(1.0)])),
        err(ErrorKind::NA)
    );
}

#[test]
fn display_strings_are_the_canonical_codes() {
    let texts = [
        (ErrorKind::Null, "#NULL!"),
        (ErrorKind::Div0, "#DIV/0!"),
        (ErrorKind::Value, "#VALUE!"),
        (ErrorKind::Ref, "#REF!"),
        (ErrorKind::Name, "#NAME?"),
        (ErrorKind::Num, "#NUM!"),
        (ErrorKind::NA, "#N/A"),
    ];
    for (kind, expected) in texts {
        assert_eq!(kind.to_string(), expected);
        assert_eq!(ErrorKind::from_code(expected), Some(kind));
    }
}

#[test]
fn unknown_names_and_bad_arity() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, call("NO.SUCH.FUNCTION", vec![num(1.0)])),
        err(ErrorKind::Name)
    );
    assert_eq!(
        eval(&sheet, call("ABS", vec![num(1.0), num(2.0)])),
        err(ErrorKind::Value)
    );
    assert_eq!(eval(&sheet, call("ABS", vec![])), err(ErrorKind::Value));
    // The _XLFN. prefix on newer functions resolves to the same entry.
    assert_eq!(
        eval(&sheet, call("_XLFN.XOR", vec![logical(true)])),
        Value::from(true)
    );
}
