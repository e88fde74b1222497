use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::refs::Reference;

/// The fixed set of spreadsheet error codes. Errors are values, not
/// exceptions: they travel through evaluation like any other scalar and are
/// only "caught" by the lazy error-handling forms (`IFERROR`, `IFNA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ErrorKind {
    #[error("#NULL!")]
    Null,
    #[error("#DIV/0!")]
    Div0,
    #[error("#VALUE!")]
    Value,
    #[error("#REF!")]
    Ref,
    #[error("#NAME?")]
    Name,
    #[error("#NUM!")]
    Num,
    #[error("#N/A")]
    NA,
}

impl ErrorKind {
    pub fn as_code(self) -> &'static str {
        match self {
            ErrorKind::Null => "#NULL!",
            ErrorKind::Div0 => "#DIV/0!",
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Ref => "#REF!",
            ErrorKind::Name => "#NAME?",
            ErrorKind::Num => "#NUM!",
            ErrorKind::NA => "#N/A",
        }
    }

    /// Parses a canonical error code, e.g. for error literals in criteria
    /// text. `#N/A` also accepts the `#N/A!` spelling some producers emit.
    pub fn from_code(code: &str) -> Option<ErrorKind> {
        match code.to_ascii_uppercase().as_str() {
            "#NULL!" => Some(ErrorKind::Null),
            "#DIV/0!" => Some(ErrorKind::Div0),
            "#VALUE!" => Some(ErrorKind::Value),
            "#REF!" => Some(ErrorKind::Ref),
            "#NAME?" => Some(ErrorKind::Name),
            "#NUM!" => Some(ErrorKind::Num),
            "#N/A" | "#N/A!" => Some(ErrorKind::NA),
            _ => None,
        }
    }

    /// The numeric classification `ERROR.TYPE` reports; also the order
    /// criteria use when comparing two errors.
    pub fn type_number(self) -> u8 {
        match self {
            ErrorKind::Null => 1,
            ErrorKind::Div0 => 2,
            ErrorKind::Value => 3,
            ErrorKind::Ref => 4,
            ErrorKind::Name => 5,
            ErrorKind::Num => 6,
            ErrorKind::NA => 7,
        }
    }
}

/// A single-cell value: the non-collection kinds of the value model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Logical(bool),
    Blank,
    Error(ErrorKind),
}

impl Scalar {
    pub fn is_error(&self) -> bool {
        matches!(self, Scalar::Error(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Blank)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Scalar::Number(_))
    }

    pub fn as_error(&self) -> Option<ErrorKind> {
        match self {
            Scalar::Error(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Logical(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<ErrorKind> for Scalar {
    fn from(value: ErrorKind) -> Self {
        Scalar::Error(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Logical(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Scalar::Blank => Ok(()),
            Scalar::Error(e) => write!(f, "{e}"),
        }
    }
}

/// A rectangular, row-major, immutable grid of scalars. Arrays never nest;
/// the element type makes that structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array {
    rows: usize,
    cols: usize,
    values: Vec<Scalar>,
}

impl Array {
    /// Panics when `rows * cols != values.len()` or either dimension is
    /// zero; a malformed shape is a bug in the caller, not a formula error.
    pub fn new(rows: usize, cols: usize, values: Vec<Scalar>) -> Array {
        assert!(rows >= 1 && cols >= 1, "array dimensions must be >= 1");
        assert_eq!(rows * cols, values.len(), "array shape/value mismatch");
        Array { rows, cols, values }
    }

    pub fn from_rows(rows: Vec<Vec<Scalar>>) -> Array {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        assert!(rows.iter().all(|r| r.len() == width), "ragged array rows");
        Array::new(height, width, rows.into_iter().flatten().collect())
    }

    pub fn single(value: Scalar) -> Array {
        Array::new(1, 1, vec![value])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Scalar> {
        if row < self.rows && col < self.cols {
            Some(&self.values[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn at(&self, row: usize, col: usize) -> &Scalar {
        &self.values[row * self.cols + col]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scalar> {
        self.values.iter()
    }

    pub fn into_values(self) -> Vec<Scalar> {
        self.values
    }
}

/// A fully evaluated formula result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Array(Array),
    Reference(Reference),
}

impl Value {
    pub const BLANK: Value = Value::Scalar(Scalar::Blank);

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Scalar(Scalar::Error(_)))
    }

    pub fn as_error(&self) -> Option<ErrorKind> {
        match self {
            Value::Scalar(Scalar::Error(e)) => Some(*e),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::Number(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Scalar::Number(value as f64))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Logical(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::Text(value))
    }
}

impl From<ErrorKind> for Value {
    fn from(value: ErrorKind) -> Self {
        Value::Scalar(Scalar::Error(value))
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Reference> for Value {
    fn from(value: Reference) -> Self {
        Value::Reference(value)
    }
}
