//! JSON interchange for the host-facing data types: scalars, arrays, and
//! the address types a host persists alongside them.

mod common;

use common::*;
use serde_json::json;
use sheetcalc::refs::{Area, CellAddr};
use sheetcalc::{Array, ErrorKind, Scalar, Value};

#[test]
fn scalars_tag_their_variant() {
    let cases = [
        (Scalar::Number(1.5), json!({ "Number": 1.5 })),
        (Scalar::Text("pear".to_string()), json!({ "Text": "pear" })),
        (Scalar::Logical(true), json!({ "Logical": true })),
        (Scalar::Blank, json!("Blank")),
        (Scalar::Error(ErrorKind::Div0), json!({ "Error": "Div0" })),
    ];
    for (scalar, expected) in cases {
        let encoded = serde_json::to_value(&scalar).unwrap();
        assert_eq!(encoded, expected);
        let back: Scalar = serde_json::from_value(encoded).unwrap();
        assert_eq!(back, scalar);
    }
}

#[test]
fn error_kinds_serialize_as_variant_names() {
    assert_eq!(serde_json::to_value(ErrorKind::NA).unwrap(), json!("NA"));
    for kind in [
        ErrorKind::Null,
        ErrorKind::Div0,
        ErrorKind::Value,
        ErrorKind::Ref,
        ErrorKind::Name,
        ErrorKind::Num,
        ErrorKind::NA,
    ] {
        let text = serde_json::to_string(&kind).unwrap();
        let back: ErrorKind = serde_json::from_str(&text).unwrap();
        assert_eq!(back, kind);
    }
}

#[test]
fn arrays_keep_their_shape_and_order() {
    let array = Array::from_rows(vec![
        vec![Scalar::Number(1.0), Scalar::Blank, Scalar::Text("x".to_string())],
        vec![Scalar::Logical(false), Scalar::Number(2.5), Scalar::Error(ErrorKind::NA)],
    ]);
    let text = serde_json::to_string(&array).unwrap();
    let back: Array = serde_json::from_str(&text).unwrap();
    assert_eq!(back, array);
    assert_eq!(back.rows(), 2);
    assert_eq!(back.cols(), 3);
    assert_eq!(back.at(1, 1), &Scalar::Number(2.5));
}

#[test]
fn addresses_and_areas_round_trip() {
    let addr = CellAddr::new(8, 25);
    assert_eq!(serde_json::to_value(addr).unwrap(), json!({ "row": 8, "col": 25 }));
    assert_eq!(addr.to_string(), "Z9");

    // Construction normalizes corners; the wire shape carries them as-is.
    let area = Area::new(SHEET, CellAddr::new(4, 3), CellAddr::new(1, 0));
    let text = serde_json::to_string(&area).unwrap();
    let back: Area = serde_json::from_str(&text).unwrap();
    assert_eq!(back, area);
    assert_eq!(back.start, CellAddr::new(1, 0));
    assert_eq!(back.to_string(), "A2:D5");
}

#[test]
fn evaluation_results_travel_as_scalars() {
    let mut sheet = Sheet::new();
    sheet.set_column("A1", scalars(&[1.0, 2.5]));
    let result = eval(&sheet, call("SUM", vec![range("A1:A2")]));
    let scalar = match result {
        Value::Scalar(s) => s,
        other => panic!("expected scalar, got {other:?}"),
    };
    assert_eq!(serde_json::to_value(&scalar).unwrap(), json!({ "Number": 3.5 }));
}
