//! INDEX's zero-axis forms, OFFSET's displaced references, CHOOSE's lazy
//! branch pick, and the shape informants ROW/COLUMN/ROWS/COLUMNS/TRANSPOSE.

mod common;

use common::*;
use sheetcalc::eval::Expr;
use sheetcalc::{Array, ErrorKind, Scalar, Value};

fn grid() -> Sheet {
    let mut sheet = Sheet::new();
    sheet.set_block(
        "A1",
        vec![
            scalars(&[1.0, 2.0, 3.0]),
            scalars(&[4.0, 5.0, 6.0]),
        ],
    );
    sheet
}

#[test]
fn index_picks_cells_rows_and_columns() {
    let sheet = grid();
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:C2"), num(2.0), num(3.0)])),
        n(6.0)
    );
    // Row zero selects the whole column.
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:C2"), num(0.0), num(2.0)])),
        Value::Array(Array::from_rows(vec![
            vec![Scalar::Number(2.0)],
            vec![Scalar::Number(5.0)],
        ]))
    );
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:C2"), num(1.0), num(0.0)])),
        Value::Array(Array::from_rows(vec![scalars(&[1.0, 2.0, 3.0])]))
    );
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:C2"), num(0.0), num(0.0)])),
        Value::Array(Array::from_rows(vec![
            scalars(&[1.0, 2.0, 3.0]),
            scalars(&[4.0, 5.0, 6.0]),
        ]))
    );
}

#[test]
fn two_argument_index_walks_a_single_row_by_column() {
    let sheet = grid();
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:C1"), num(3.0)])),
        n(3.0)
    );
    // Over a column the second argument stays a row number.
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:A2"), num(2.0)])),
        n(4.0)
    );
}

#[test]
fn index_bounds() {
    let sheet = grid();
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:C2"), num(-1.0), num(1.0)])),
        err(ErrorKind::Value)
    );
    assert_eq!(
        eval(&sheet, call("INDEX", vec![range("A1:C2"), num(3.0), num(1.0)])),
        err(ErrorKind::Ref)
    );
}

#[test]
fn offset_builds_a_displaced_reference() {
    let sheet = grid();
    assert_eq!(
        eval(
            &sheet,
            call("OFFSET", vec![range("A1:B2"), num(1.0), num(1.0)])
        ),
        Value::Reference(reference("B2:C3"))
    );
    // Height and width override the source extent.
    assert_eq!(
        eval(
            &sheet,
            call(
                "SUM",
                vec![call(
                    "OFFSET",
                    vec![range("A1"), num(0.0), num(1.0), num(2.0), num(2.0)],
                )],
            )
        ),
        n(16.0)
    );
    // An empty height slot keeps the source height.
    assert_eq!(
        eval(
            &sheet,
            call(
                "OFFSET",
                vec![range("A1:A2"), num(0.0), num(2.0), Expr::Blank, num(1.0)],
            )
        ),
        Value::Reference(reference("C1:C2"))
    );
}

#[test]
fn offset_refuses_degenerate_shapes_and_sheet_edges() {
    let sheet = grid();
    assert_eq!(
        eval(
            &sheet,
            call(
                "OFFSET",
                vec![range("A1"), num(0.0), num(0.0), num(0.0), num(1.0)],
            )
        ),
        err(ErrorKind::Ref)
    );
    assert_eq!(
        eval(
            &sheet,
            call("OFFSET", vec![range("A1"), num(-1.0), num(0.0)])
        ),
        err(ErrorKind::Ref)
    );
    // Array literals have no worksheet home to displace from.
    let literal = Expr::Array(Array::from_rows(vec![scalars(&[1.0, 2.0])]));
    assert_eq!(
        eval(
            &sheet,
            call("OFFSET", vec![literal, num(0.0), num(0.0)])
        ),
        err(ErrorKind::Value)
    );
}

#[test]
fn choose_evaluates_only_the_picked_branch() {
    let sheet = grid();
    assert_eq!(
        eval(
            &sheet,
            call(
                "CHOOSE",
                vec![num(1.0), num(10.0), Expr::Error(ErrorKind::Div0)],
            )
        ),
        n(10.0)
    );
    assert_eq!(
        eval(
            &sheet,
            call("CHOOSE", vec![num(3.0), num(10.0), num(20.0)])
        ),
        err(ErrorKind::Value)
    );
    // A chosen reference branch stays a reference; SUM can aggregate it.
    assert_eq!(
        eval(
            &sheet,
            call(
                "SUM",
                vec![call("CHOOSE", vec![num(2.0), num(0.0), range("A1:C1")])],
            )
        ),
        n(6.0)
    );
}

#[test]
fn row_and_column_report_the_current_cell() {
    let sheet = Sheet::new();
    assert_eq!(eval_at(&sheet, "C7", call("ROW", vec![])), n(7.0));
    assert_eq!(eval_at(&sheet, "C7", call("COLUMN", vec![])), n(3.0));
    assert_eq!(
        eval_at(&sheet, "C7", call("ROW", vec![range("B5:B9")])),
        n(5.0)
    );
    assert_eq!(
        eval_at(&sheet, "C7", call("COLUMN", vec![range("D1")])),
        n(4.0)
    );
}

#[test]
fn rows_columns_and_transpose() {
    let sheet = grid();
    assert_eq!(eval(&sheet, call("ROWS", vec![range("A1:C2")])), n(2.0));
    assert_eq!(eval(&sheet, call("COLUMNS", vec![range("A1:C2")])), n(3.0));
    assert_eq!(
        eval(&sheet, call("TRANSPOSE", vec![range("A1:C2")])),
        Value::Array(Array::from_rows(vec![
            scalars(&[1.0, 4.0]),
            scalars(&[2.0, 5.0]),
            scalars(&[3.0, 6.0]),
        ]))
    );
}
