//! The expression tree handed to us by the parser collaborator. References
//! arrive already resolved to sheet ids and normalized areas; this crate
//! never sees source text.

use crate::refs::Reference;
use crate::value::{Array, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Plus,
    /// Postfix `%`.
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Logical(bool),
    Error(ErrorKind),
    /// An argument slot left empty, as in `IF(condition,,fallback)`.
    /// Evaluates to Blank, so a written-but-empty optional still coerces.
    Blank,
    /// `{1,2;3,4}` literals; already rectangular.
    Array(Array),
    Ref(Reference),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Expr {
        Expr::Number(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Expr {
        Expr::Number(value as f64)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Expr {
        Expr::Logical(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Expr {
        Expr::Text(value.to_string())
    }
}

impl From<Reference> for Expr {
    fn from(value: Reference) -> Expr {
        Expr::Ref(value)
    }
}
