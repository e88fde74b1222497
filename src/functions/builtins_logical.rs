//! Logical builtins. The branching forms (IF, IFS, IFERROR, IFNA, SWITCH)
//! register lazily so untaken branches are never evaluated and cannot
//! poison the result; AND/OR/XOR are ordinary eager folds.

use std::cmp::Ordering;

use crate::coerce;
use crate::eval::{compare_scalars, Evaluator, Expr};
use crate::value::{ErrorKind, Scalar, Value};

use super::{
    Call, FunctionImpl, FunctionSpec, ParamKind, Provenance, ReturnShape, SideEffect, Signature,
    Volatility,
};

const VAR_ARGS: usize = crate::EXCEL_MAX_ARGS;

static VALUES: Signature = Signature::variadic(&[]);
static ONE_LOGICAL: Signature = Signature::fixed(&[ParamKind::Logical]);
static NO_ARGS: Signature = Signature::fixed(&[]);

inventory::submit! {
    FunctionSpec {
        name: "IF",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(if_then_else),
    }
}

fn if_then_else(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    let condition = ev.eval_scalar(&args[0]);
    let condition = match coerce::to_logical(&condition, &ev.culture()) {
        Ok(b) => b,
        Err(e) => return Value::from(e),
    };
    if condition {
        ev.eval(&args[1])
    } else {
        match args.get(2) {
            Some(branch) => ev.eval(branch),
            None => Value::from(false),
        }
    }
}

inventory::submit! {
    FunctionSpec {
        name: "IFS",
        min_args: 2,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(ifs),
    }
}

fn ifs(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    if args.len() % 2 != 0 {
        return Value::from(ErrorKind::Value);
    }
    for pair in args.chunks_exact(2) {
        let condition = ev.eval_scalar(&pair[0]);
        match coerce::to_logical(&condition, &ev.culture()) {
            Ok(true) => return ev.eval(&pair[1]),
            Ok(false) => {}
            Err(e) => return Value::from(e),
        }
    }
    // No condition held; there is no default branch in IFS.
    Value::from(ErrorKind::NA)
}

inventory::submit! {
    FunctionSpec {
        name: "IFERROR",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(iferror),
    }
}

fn iferror(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    match ev.eval_scalar(&args[0]) {
        Scalar::Error(_) => ev.eval(&args[1]),
        value => Value::Scalar(value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "IFNA",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(ifna),
    }
}

fn ifna(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    match ev.eval_scalar(&args[0]) {
        Scalar::Error(ErrorKind::NA) => ev.eval(&args[1]),
        value => Value::Scalar(value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "SWITCH",
        min_args: 3,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(switch),
    }
}

fn switch(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    let target = ev.eval_scalar(&args[0]);
    if let Scalar::Error(e) = target {
        return Value::from(e);
    }
    let culture = ev.culture();
    let mut rest = &args[1..];
    while rest.len() >= 2 {
        let candidate = ev.eval_scalar(&rest[0]);
        if let Scalar::Error(e) = candidate {
            return Value::from(e);
        }
        // Same comparison the `=` operator uses; "1" does not match 1.
        if compare_scalars(&target, &candidate, &culture) == Ok(Ordering::Equal) {
            return ev.eval(&rest[1]);
        }
        rest = &rest[2..];
    }
    match rest.first() {
        Some(default) => ev.eval(default),
        None => Value::from(ErrorKind::NA),
    }
}

/// Counts coercible operands and how many held true. Text and blank range
/// elements are skipped; a call with nothing to judge at all is an error.
fn fold_logicals(call: &Call<'_>) -> Result<(usize, usize), ErrorKind> {
    let culture = call.culture();
    let mut trues = 0usize;
    let mut total = 0usize;
    for source in call.values() {
        source.for_each(&mut |provenance, scalar| {
            match (provenance, &scalar) {
                (_, Scalar::Error(e)) => return Err(*e),
                (Provenance::Direct, _) => {
                    if coerce::to_logical(&scalar, &culture)? {
                        trues += 1;
                    }
                    total += 1;
                }
                (Provenance::Element, Scalar::Logical(b)) => {
                    if *b {
                        trues += 1;
                    }
                    total += 1;
                }
                (Provenance::Element, Scalar::Number(n)) => {
                    if *n != 0.0 {
                        trues += 1;
                    }
                    total += 1;
                }
                (Provenance::Element, _) => {}
            }
            Ok(())
        })?;
    }
    if total == 0 {
        return Err(ErrorKind::Value);
    }
    Ok((trues, total))
}

inventory::submit! {
    FunctionSpec {
        name: "AND",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, and),
    }
}

fn and(call: &Call<'_>) -> Value {
    match fold_logicals(call) {
        Ok((trues, total)) => Value::from(trues == total),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "OR",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, or),
    }
}

fn or(call: &Call<'_>) -> Value {
    match fold_logicals(call) {
        Ok((trues, _)) => Value::from(trues > 0),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "XOR",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, xor),
    }
}

fn xor(call: &Call<'_>) -> Value {
    match fold_logicals(call) {
        Ok((trues, _)) => Value::from(trues % 2 == 1),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "NOT",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_LOGICAL, not),
    }
}

fn not(call: &Call<'_>) -> Value {
    Value::from(!call.logical(0))
}

inventory::submit! {
    FunctionSpec {
        name: "TRUE",
        min_args: 0,
        max_args: 0,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NO_ARGS, true_fn),
    }
}

fn true_fn(_call: &Call<'_>) -> Value {
    Value::from(true)
}

inventory::submit! {
    FunctionSpec {
        name: "FALSE",
        min_args: 0,
        max_args: 0,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NO_ARGS, false_fn),
    }
}

fn false_fn(_call: &Call<'_>) -> Value {
    Value::from(false)
}
