//! The dispatch adapter: one place where raw argument expressions become
//! the typed values a function body works with. Every eager function
//! declares an ordered parameter-kind list; the adapter applies the value
//! model's coercion left to right and short-circuits on the first error, so
//! ~120 functions share a single error-propagation policy.

use crate::coerce;
use crate::eval::{CellContext, EvalContext, Evaluator, Expr};
use crate::locale::Culture;
use crate::value::{ErrorKind, Scalar, Value};
use crate::view::RangeView;

use super::EagerFn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Number,
    Text,
    Logical,
    /// Raw scalar; errors pass through to the body (the `IS*` family
    /// inspects them instead of propagating).
    Scalar,
    /// Single-area reference, array literal, or scalar promoted to 1×1.
    Range,
    /// A written-but-blank argument coerces normally (blank -> 0, FALSE);
    /// only a truly omitted argument takes the default. `VLOOKUP(k,t,2,)`
    /// therefore means exact mode, not the TRUE default.
    OptionalNumber(f64),
    OptionalLogical(bool),
    /// Unlike the defaulted kinds, an empty argument slot here reads as
    /// omitted, not as a blank value.
    OptionalScalar,
    OptionalRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    None,
    /// Remaining arguments are value sets to aggregate; reference unions
    /// expand to one set per area.
    Values,
    /// Remaining arguments are (criteria-range, criteria) pairs.
    Pairs,
}

pub struct Signature {
    pub fixed: &'static [ParamKind],
    pub repeat: Repeat,
}

impl Signature {
    pub const fn fixed(fixed: &'static [ParamKind]) -> Signature {
        Signature {
            fixed,
            repeat: Repeat::None,
        }
    }

    pub const fn variadic(fixed: &'static [ParamKind]) -> Signature {
        Signature {
            fixed,
            repeat: Repeat::Values,
        }
    }

    pub const fn pairs(fixed: &'static [ParamKind]) -> Signature {
        Signature {
            fixed,
            repeat: Repeat::Pairs,
        }
    }
}

enum CoercedArg<'a> {
    Number(f64),
    Text(String),
    Logical(bool),
    Scalar(Scalar),
    Range(RangeView<'a>),
    /// An omitted `OptionalScalar`/`OptionalRange`.
    Missing,
}

/// Whether a value reached the function as a direct scalar argument or as
/// an element of a range/array. The two follow different rules: direct
/// scalars coerce, elements are taken at face value and non-numeric ones
/// are skipped by numeric folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Direct,
    Element,
}

pub enum ValueSource<'a> {
    Direct(Scalar),
    View(RangeView<'a>),
}

impl<'a> ValueSource<'a> {
    /// Walks every scalar in the source in row-major order. The closure's
    /// error stops the walk; element errors are the closure's to judge.
    pub fn for_each(
        &self,
        f: &mut impl FnMut(Provenance, Scalar) -> Result<(), ErrorKind>,
    ) -> Result<(), ErrorKind> {
        match self {
            ValueSource::Direct(s) => f(Provenance::Direct, s.clone()),
            ValueSource::View(view) => {
                for i in 0..view.cell_count() {
                    f(Provenance::Element, view.at_offset(i))?;
                }
                Ok(())
            }
        }
    }

    /// The source as a view, promoting direct scalars to 1×1. Direct error
    /// scalars refuse, matching how a range argument would have failed.
    pub fn to_view(&self) -> Result<RangeView<'a>, ErrorKind> {
        match self {
            ValueSource::Direct(Scalar::Error(e)) => Err(*e),
            ValueSource::Direct(s) => Ok(RangeView::Single(s.clone())),
            ValueSource::View(view) => Ok(view.clone()),
        }
    }
}

/// The typed argument set handed to an eager function body. Accessors
/// panic on a kind mismatch: the signature and the body are written
/// together, so a mismatch is a registration bug, not a formula error.
pub struct Call<'a> {
    ev: &'a Evaluator<'a>,
    provided: usize,
    slots: Vec<CoercedArg<'a>>,
    tail: Vec<ValueSource<'a>>,
    pairs: Vec<(RangeView<'a>, Scalar)>,
}

impl<'a> Call<'a> {
    pub fn evaluator(&self) -> &'a Evaluator<'a> {
        self.ev
    }

    pub fn cells(&self) -> &'a dyn CellContext {
        self.ev.cells()
    }

    pub fn ctx(&self) -> EvalContext {
        self.ev.ctx()
    }

    pub fn culture(&self) -> Culture {
        self.ev.culture()
    }

    /// How many arguments the caller actually wrote (defaults excluded).
    pub fn provided_len(&self) -> usize {
        self.provided
    }

    pub fn number(&self, i: usize) -> f64 {
        match &self.slots[i] {
            CoercedArg::Number(n) => *n,
            _ => panic!("parameter {i} is not declared Number"),
        }
    }

    pub fn text(&self, i: usize) -> &str {
        match &self.slots[i] {
            CoercedArg::Text(s) => s,
            _ => panic!("parameter {i} is not declared Text"),
        }
    }

    pub fn logical(&self, i: usize) -> bool {
        match &self.slots[i] {
            CoercedArg::Logical(b) => *b,
            _ => panic!("parameter {i} is not declared Logical"),
        }
    }

    pub fn scalar(&self, i: usize) -> &Scalar {
        match &self.slots[i] {
            CoercedArg::Scalar(s) => s,
            _ => panic!("parameter {i} is not declared Scalar"),
        }
    }

    pub fn range(&self, i: usize) -> &RangeView<'a> {
        match &self.slots[i] {
            CoercedArg::Range(view) => view,
            _ => panic!("parameter {i} is not declared Range"),
        }
    }

    pub fn opt_scalar(&self, i: usize) -> Option<&Scalar> {
        match &self.slots[i] {
            CoercedArg::Scalar(s) => Some(s),
            CoercedArg::Missing => None,
            _ => panic!("parameter {i} is not declared OptionalScalar"),
        }
    }

    pub fn opt_range(&self, i: usize) -> Option<&RangeView<'a>> {
        match &self.slots[i] {
            CoercedArg::Range(view) => Some(view),
            CoercedArg::Missing => None,
            _ => panic!("parameter {i} is not declared OptionalRange"),
        }
    }

    /// The `Repeat::Values` tail.
    pub fn values(&self) -> &[ValueSource<'a>] {
        &self.tail
    }

    /// The `Repeat::Pairs` tail.
    pub fn pairs(&self) -> &[(RangeView<'a>, Scalar)] {
        &self.pairs
    }
}

pub(crate) fn invoke<'a>(
    ev: &'a Evaluator<'a>,
    signature: &Signature,
    args: &[Expr],
    f: EagerFn,
) -> Value {
    let culture = ev.culture();
    let mut call = Call {
        ev,
        provided: args.len(),
        slots: Vec::with_capacity(signature.fixed.len()),
        tail: Vec::new(),
        pairs: Vec::new(),
    };

    for (i, kind) in signature.fixed.iter().enumerate() {
        match coerce_param(ev, &culture, *kind, args.get(i)) {
            Ok(slot) => call.slots.push(slot),
            Err(e) => return Value::from(e),
        }
    }

    let rest = if args.len() > signature.fixed.len() {
        &args[signature.fixed.len()..]
    } else {
        &[]
    };
    match signature.repeat {
        Repeat::None => {
            // Arity was checked at dispatch; a longer list here means the
            // registration's max_args disagrees with its signature.
            debug_assert!(rest.is_empty(), "fixed signature given extra arguments");
        }
        Repeat::Values => {
            for expr in rest {
                push_value_source(ev, expr, &mut call.tail);
            }
        }
        Repeat::Pairs => {
            if rest.len() % 2 != 0 {
                return Value::from(ErrorKind::Value);
            }
            for pair in rest.chunks(2) {
                let view = match RangeView::from_value(ev.eval(&pair[0]), ev.cells()) {
                    Ok(view) => view,
                    Err(e) => return Value::from(e),
                };
                let operand = ev.eval_scalar(&pair[1]);
                call.pairs.push((view, operand));
            }
        }
    }

    f(&call)
}

fn coerce_param<'a>(
    ev: &'a Evaluator<'a>,
    culture: &Culture,
    kind: ParamKind,
    arg: Option<&Expr>,
) -> Result<CoercedArg<'a>, ErrorKind> {
    match kind {
        ParamKind::Number => {
            let s = ev.eval_scalar(required(arg)?);
            coerce::to_number(&s, culture).map(CoercedArg::Number)
        }
        ParamKind::Text => {
            let s = ev.eval_scalar(required(arg)?);
            coerce::to_text(&s, culture).map(CoercedArg::Text)
        }
        ParamKind::Logical => {
            let s = ev.eval_scalar(required(arg)?);
            coerce::to_logical(&s, culture).map(CoercedArg::Logical)
        }
        ParamKind::Scalar => Ok(CoercedArg::Scalar(ev.eval_scalar(required(arg)?))),
        ParamKind::Range => {
            let value = ev.eval(required(arg)?);
            RangeView::from_value(value, ev.cells()).map(CoercedArg::Range)
        }
        ParamKind::OptionalNumber(default) => match arg {
            None => Ok(CoercedArg::Number(default)),
            Some(expr) => {
                let s = ev.eval_scalar(expr);
                coerce::to_number(&s, culture).map(CoercedArg::Number)
            }
        },
        ParamKind::OptionalLogical(default) => match arg {
            None => Ok(CoercedArg::Logical(default)),
            Some(expr) => {
                let s = ev.eval_scalar(expr);
                coerce::to_logical(&s, culture).map(CoercedArg::Logical)
            }
        },
        // An empty argument slot counts as omitted for these two; a blank
        // *value* still arrives through a reference or a blank cell.
        ParamKind::OptionalScalar => match arg {
            None | Some(Expr::Blank) => Ok(CoercedArg::Missing),
            Some(expr) => Ok(CoercedArg::Scalar(ev.eval_scalar(expr))),
        },
        ParamKind::OptionalRange => match arg {
            None | Some(Expr::Blank) => Ok(CoercedArg::Missing),
            Some(expr) => {
                let value = ev.eval(expr);
                RangeView::from_value(value, ev.cells()).map(CoercedArg::Range)
            }
        },
    }
}

fn required(arg: Option<&Expr>) -> Result<&Expr, ErrorKind> {
    arg.ok_or(ErrorKind::Value)
}

fn push_value_source<'a>(ev: &'a Evaluator<'a>, expr: &Expr, out: &mut Vec<ValueSource<'a>>) {
    match ev.eval(expr) {
        Value::Scalar(s) => out.push(ValueSource::Direct(s)),
        Value::Array(arr) => out.push(ValueSource::View(RangeView::Cells(arr))),
        Value::Reference(r) => {
            // A union aggregates per area; shape rules apply per area too.
            for area in r.areas() {
                out.push(ValueSource::View(RangeView::Sheet {
                    cells: ev.cells(),
                    area: *area,
                }));
            }
        }
    }
}
