//! Operator semantics: coercion at the seams, blank identity, implicit
//! intersection, and the legacy top-left collapse of array results.

mod common;

use common::*;
use sheetcalc::eval::{BinaryOp, Expr, UnaryOp};
use sheetcalc::value::Array;
use sheetcalc::{ErrorKind, Scalar, Value};

fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, lhs, rhs)
}

#[test]
fn arithmetic_coerces_text_and_blank() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "3");
    sheet.set("A2", true);
    // A3 left blank.

    assert_eq!(eval(&sheet, bin(BinaryOp::Add, range("A1"), num(4.0))), n(7.0));
    assert_eq!(eval(&sheet, bin(BinaryOp::Mul, range("A2"), num(5.0))), n(5.0));
    assert_eq!(eval(&sheet, bin(BinaryOp::Sub, range("A3"), num(2.0))), n(-2.0));
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Add, text("pear"), num(1.0))),
        err(ErrorKind::Value)
    );
}

#[test]
fn division_and_power_edges() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Div, num(1.0), num(0.0))),
        err(ErrorKind::Div0)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Pow, num(0.0), num(0.0))),
        err(ErrorKind::Num)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Pow, num(0.0), num(-2.0))),
        err(ErrorKind::Div0)
    );
    assert_eq!(eval(&sheet, bin(BinaryOp::Pow, num(2.0), num(10.0))), n(1024.0));
    // Overflow is #NUM!, not infinity.
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Pow, num(10.0), num(400.0))),
        err(ErrorKind::Num)
    );
}

#[test]
fn concat_renders_operands_like_general_format() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Concat, num(1.0), logical(true))),
        t("1TRUE")
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Concat, text("v"), num(2.5))),
        t("v2.5")
    );
}

#[test]
fn comparisons_rank_number_text_logical() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Lt, num(1e9), text("a"))),
        Value::from(true)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Lt, text("zzz"), logical(false))),
        Value::from(true)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Eq, text("Apple"), text("APPLE"))),
        Value::from(true)
    );
    // The `=` operator never parses text into numbers.
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Eq, text("1"), num(1.0))),
        Value::from(false)
    );
}

#[test]
fn blank_adopts_the_other_sides_zero_identity() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Eq, range("B7"), num(0.0))),
        Value::from(true)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Eq, range("B7"), text(""))),
        Value::from(true)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Eq, range("B7"), logical(false))),
        Value::from(true)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Lt, range("B7"), num(1.0))),
        Value::from(true)
    );
}

#[test]
fn unary_operators() {
    let sheet = Sheet::new();
    assert_eq!(
        eval(&sheet, Expr::unary(UnaryOp::Percent, num(50.0))),
        n(0.5)
    );
    assert_eq!(eval(&sheet, Expr::unary(UnaryOp::Negate, text("3"))), n(-3.0));
    // Unary plus passes text through untouched.
    assert_eq!(eval(&sheet, Expr::unary(UnaryOp::Plus, text("3"))), t("3"));
}

#[test]
fn errors_poison_operators() {
    let mut sheet = Sheet::new();
    sheet.set("A1", ErrorKind::NA);
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Add, range("A1"), num(1.0))),
        err(ErrorKind::NA)
    );
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Eq, range("A1"), num(1.0))),
        err(ErrorKind::NA)
    );
}

#[test]
fn implicit_intersection_picks_the_current_row() {
    let mut sheet = Sheet::new();
    sheet.set_column("A1", scalars(&[10.0, 20.0, 30.0, 40.0]));

    let formula = bin(BinaryOp::Add, range("A1:A4"), num(1.0));
    assert_eq!(eval_at(&sheet, "C2", formula.clone()), n(21.0));
    assert_eq!(eval_at(&sheet, "C4", formula.clone()), n(41.0));
    // Outside the range's rows there is nothing to intersect with.
    assert_eq!(eval_at(&sheet, "C9", formula), err(ErrorKind::Value));
}

#[test]
fn implicit_intersection_picks_the_current_column() {
    let mut sheet = Sheet::new();
    sheet.set_block("A1", vec![scalars(&[1.0, 2.0, 3.0])]);

    let formula = bin(BinaryOp::Mul, range("A1:C1"), num(10.0));
    assert_eq!(eval_at(&sheet, "B5", formula), n(20.0));
}

#[test]
fn array_results_collapse_to_top_left_in_scalar_context() {
    let sheet = Sheet::new();
    let array = Expr::Array(Array::from_rows(vec![
        vec![Scalar::Number(7.0), Scalar::Number(2.0)],
        vec![Scalar::Number(3.0), Scalar::Number(4.0)],
    ]));
    assert_eq!(eval(&sheet, bin(BinaryOp::Add, array, num(1.0))), n(8.0));
}

#[test]
fn union_references_are_value_errors_in_scalar_context() {
    use sheetcalc::refs::Reference;
    let mut sheet = Sheet::new();
    sheet.set("A1", 1.0);
    sheet.set("B1", 2.0);
    let union = Reference::from_areas(vec![
        reference("A1").single_area().unwrap(),
        reference("B1").single_area().unwrap(),
    ]);
    assert_eq!(
        eval(&sheet, bin(BinaryOp::Add, Expr::Ref(union), num(0.0))),
        err(ErrorKind::Value)
    );
}

#[test]
fn empty_argument_slots_evaluate_to_blank() {
    let sheet = Sheet::new();
    // IF(TRUE,,5) takes the empty branch, which coerces like a blank cell.
    assert_eq!(
        eval(&sheet, call("IF", vec![logical(true), Expr::Blank, num(5.0)])),
        Value::BLANK
    );
}
