use std::cmp::Ordering;

use crate::coerce;
use crate::eval::ast::{BinaryOp, Expr, UnaryOp};
use crate::eval::{CellContext, EvalContext};
use crate::functions;
use crate::locale::{compare_text, Culture};
use crate::refs::{CellAddr, Reference};
use crate::value::{ErrorKind, Scalar, Value};

/// Evaluates one formula tree against a host context. Pure: the only
/// observable effects are context reads (plus the `HYPERLINK` presentation
/// hook).
pub fn evaluate(expr: &Expr, cells: &dyn CellContext, ctx: EvalContext) -> Value {
    Evaluator::new(cells, ctx).eval(expr)
}

pub struct Evaluator<'a> {
    cells: &'a dyn CellContext,
    ctx: EvalContext,
}

impl<'a> Evaluator<'a> {
    pub fn new(cells: &'a dyn CellContext, ctx: EvalContext) -> Evaluator<'a> {
        Evaluator { cells, ctx }
    }

    pub fn cells(&self) -> &'a dyn CellContext {
        self.cells
    }

    pub fn ctx(&self) -> EvalContext {
        self.ctx
    }

    pub fn culture(&self) -> Culture {
        self.cells.culture()
    }

    pub fn eval(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Number(n) => Value::from(*n),
            Expr::Text(s) => Value::Scalar(Scalar::Text(s.clone())),
            Expr::Logical(b) => Value::from(*b),
            Expr::Error(e) => Value::from(*e),
            Expr::Blank => Value::BLANK,
            Expr::Array(arr) => Value::Array(arr.clone()),
            Expr::Ref(r) => Value::Reference(r.clone()),
            Expr::Call { name, args } => functions::call_function(self, name, args),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs),
        }
    }

    /// Evaluates to a single scalar: references go through implicit
    /// intersection, arrays collapse to their top-left element (legacy
    /// non-spilling behavior).
    pub fn eval_scalar(&self, expr: &Expr) -> Scalar {
        match self.eval(expr) {
            Value::Scalar(s) => s,
            Value::Array(arr) => arr.at(0, 0).clone(),
            Value::Reference(r) => self.deref_reference(&r),
        }
    }

    /// Single-cell read, or row/column intersection with the current cell
    /// for one-dimensional ranges. Anything else is `#VALUE!`.
    fn deref_reference(&self, r: &Reference) -> Scalar {
        let area = match r.single_area() {
            Ok(area) => area,
            Err(e) => return Scalar::Error(e),
        };
        if area.is_single_cell() {
            return self.cells.get_cell_value(area.sheet, area.start);
        }
        let cur = self.ctx.current_cell;
        if area.cols() == 1 && cur.row >= area.start.row && cur.row <= area.end.row {
            return self
                .cells
                .get_cell_value(area.sheet, CellAddr::new(cur.row, area.start.col));
        }
        if area.rows() == 1 && cur.col >= area.start.col && cur.col <= area.end.col {
            return self
                .cells
                .get_cell_value(area.sheet, CellAddr::new(area.start.row, cur.col));
        }
        Scalar::Error(ErrorKind::Value)
    }

    fn eval_unary(&self, op: UnaryOp, operand: &Expr) -> Value {
        let v = self.eval_scalar(operand);
        match op {
            // Unary plus returns its operand untouched, even for text.
            UnaryOp::Plus => Value::Scalar(v),
            UnaryOp::Negate => match coerce::to_number(&v, &self.culture()) {
                Ok(n) => Value::from(-n),
                Err(e) => Value::from(e),
            },
            UnaryOp::Percent => match coerce::to_number(&v, &self.culture()) {
                Ok(n) => Value::from(n / 100.0),
                Err(e) => Value::from(e),
            },
        }
    }

    fn eval_binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Value {
        match op {
            BinaryOp::Add => self.arith(lhs, rhs, |a, b| Ok(a + b)),
            BinaryOp::Sub => self.arith(lhs, rhs, |a, b| Ok(a - b)),
            BinaryOp::Mul => self.arith(lhs, rhs, |a, b| Ok(a * b)),
            BinaryOp::Div => self.arith(lhs, rhs, |a, b| {
                if b == 0.0 {
                    Err(ErrorKind::Div0)
                } else {
                    Ok(a / b)
                }
            }),
            BinaryOp::Pow => self.arith(lhs, rhs, pow_op),
            BinaryOp::Concat => {
                let culture = self.culture();
                let a = match coerce::to_text(&self.eval_scalar(lhs), &culture) {
                    Ok(t) => t,
                    Err(e) => return Value::from(e),
                };
                let b = match coerce::to_text(&self.eval_scalar(rhs), &culture) {
                    Ok(t) => t,
                    Err(e) => return Value::from(e),
                };
                Value::Scalar(Scalar::Text(a + &b))
            }
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => {
                let a = self.eval_scalar(lhs);
                let b = self.eval_scalar(rhs);
                match compare_scalars(&a, &b, &self.culture()) {
                    Ok(ord) => Value::from(ord_matches(op, ord)),
                    Err(e) => Value::from(e),
                }
            }
        }
    }

    fn arith(
        &self,
        lhs: &Expr,
        rhs: &Expr,
        f: impl FnOnce(f64, f64) -> Result<f64, ErrorKind>,
    ) -> Value {
        let culture = self.culture();
        let a = match coerce::to_number(&self.eval_scalar(lhs), &culture) {
            Ok(n) => n,
            Err(e) => return Value::from(e),
        };
        let b = match coerce::to_number(&self.eval_scalar(rhs), &culture) {
            Ok(n) => n,
            Err(e) => return Value::from(e),
        };
        match f(a, b) {
            Ok(result) if result.is_finite() => Value::from(result),
            Ok(_) => Value::from(ErrorKind::Num),
            Err(e) => Value::from(e),
        }
    }
}

fn pow_op(base: f64, exp: f64) -> Result<f64, ErrorKind> {
    if base == 0.0 && exp == 0.0 {
        return Err(ErrorKind::Num);
    }
    if base == 0.0 && exp < 0.0 {
        return Err(ErrorKind::Div0);
    }
    Ok(base.powf(exp))
}

fn ord_matches(op: BinaryOp, ord: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::Ne => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Ge => ord != Ordering::Less,
        _ => false,
    }
}

/// The type-aware total order used by comparison operators and ordered
/// criteria. Blank adopts the other side's zero identity (0, `""`, or
/// FALSE); mixed types rank Number < Text < Logical; errors propagate.
pub fn compare_scalars(
    a: &Scalar,
    b: &Scalar,
    culture: &Culture,
) -> Result<Ordering, ErrorKind> {
    if let Scalar::Error(e) = a {
        return Err(*e);
    }
    if let Scalar::Error(e) = b {
        return Err(*e);
    }
    match (a, b) {
        (Scalar::Blank, Scalar::Blank) => Ok(Ordering::Equal),
        (Scalar::Blank, other) => compare_scalars(&blank_identity_for(other), other, culture),
        (other, Scalar::Blank) => compare_scalars(other, &blank_identity_for(other), culture),
        (Scalar::Number(x), Scalar::Number(y)) => Ok(x.partial_cmp(y).unwrap_or(Ordering::Equal)),
        (Scalar::Text(x), Scalar::Text(y)) => Ok(compare_text(x, y)),
        (Scalar::Logical(x), Scalar::Logical(y)) => Ok(x.cmp(y)),
        _ => Ok(type_rank(a).cmp(&type_rank(b))),
    }
}

fn blank_identity_for(other: &Scalar) -> Scalar {
    match other {
        Scalar::Number(_) => Scalar::Number(0.0),
        Scalar::Text(_) => Scalar::Text(String::new()),
        Scalar::Logical(_) => Scalar::Logical(false),
        _ => Scalar::Blank,
    }
}

fn type_rank(s: &Scalar) -> u8 {
    match s {
        Scalar::Number(_) => 0,
        Scalar::Text(_) => 1,
        Scalar::Logical(_) => 2,
        Scalar::Blank | Scalar::Error(_) => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cmp(a: Scalar, b: Scalar) -> Result<Ordering, ErrorKind> {
        compare_scalars(&a, &b, &Culture::en_us())
    }

    #[test]
    fn blank_takes_the_other_sides_zero_identity() {
        assert_eq!(cmp(Scalar::Blank, Scalar::Number(0.0)), Ok(Ordering::Equal));
        assert_eq!(cmp(Scalar::Blank, Scalar::Number(-1.0)), Ok(Ordering::Greater));
        assert_eq!(cmp(Scalar::Blank, Scalar::Text(String::new())), Ok(Ordering::Equal));
        assert_eq!(cmp(Scalar::Blank, Scalar::from("a")), Ok(Ordering::Less));
        assert_eq!(cmp(Scalar::Blank, Scalar::Logical(false)), Ok(Ordering::Equal));
        assert_eq!(cmp(Scalar::Blank, Scalar::Logical(true)), Ok(Ordering::Less));
    }

    #[test]
    fn mixed_types_rank_number_text_logical() {
        assert_eq!(cmp(Scalar::Number(1e9), Scalar::from("")), Ok(Ordering::Less));
        assert_eq!(cmp(Scalar::from("zzz"), Scalar::Logical(false)), Ok(Ordering::Less));
        assert_eq!(cmp(Scalar::Logical(false), Scalar::Number(1.0)), Ok(Ordering::Greater));
    }

    #[test]
    fn text_comparison_is_case_insensitive() {
        assert_eq!(cmp(Scalar::from("Apple"), Scalar::from("APPLE")), Ok(Ordering::Equal));
        assert_eq!(cmp(Scalar::from("apple"), Scalar::from("Banana")), Ok(Ordering::Less));
    }

    #[test]
    fn errors_propagate_from_either_side() {
        assert_eq!(
            cmp(Scalar::Error(ErrorKind::NA), Scalar::Number(1.0)),
            Err(ErrorKind::NA)
        );
        assert_eq!(
            cmp(Scalar::Number(1.0), Scalar::Error(ErrorKind::Div0)),
            Err(ErrorKind::Div0)
        );
    }
}
