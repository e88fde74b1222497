//! Information builtins. The IS* family takes its argument as a raw scalar,
//! so error values flow in to be inspected instead of poisoning the call.

use crate::eval::{Evaluator, Expr};
use crate::value::{ErrorKind, Scalar, Value};

use super::{
    Call, FunctionImpl, FunctionSpec, ParamKind, ReturnShape, SideEffect, Signature, Volatility,
};

static ONE_SCALAR: Signature = Signature::fixed(&[ParamKind::Scalar]);
static ONE_NUMBER: Signature = Signature::fixed(&[ParamKind::Number]);
static NO_ARGS: Signature = Signature::fixed(&[]);

inventory::submit! {
    FunctionSpec {
        name: "ISBLANK",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, isblank),
    }
}

fn isblank(call: &Call<'_>) -> Value {
    // Only a genuinely empty cell qualifies; "" from a formula does not.
    Value::from(matches!(call.scalar(0), Scalar::Blank))
}

inventory::submit! {
    FunctionSpec {
        name: "ISERROR",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, iserror),
    }
}

fn iserror(call: &Call<'_>) -> Value {
    Value::from(matches!(call.scalar(0), Scalar::Error(_)))
}

inventory::submit! {
    FunctionSpec {
        name: "ISERR",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, iserr),
    }
}

fn iserr(call: &Call<'_>) -> Value {
    // Every error except #N/A; ISNA is its complement.
    Value::from(matches!(call.scalar(0), Scalar::Error(e) if *e != ErrorKind::NA))
}

inventory::submit! {
    FunctionSpec {
        name: "ISNA",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, isna),
    }
}

fn isna(call: &Call<'_>) -> Value {
    Value::from(matches!(call.scalar(0), Scalar::Error(ErrorKind::NA)))
}

inventory::submit! {
    FunctionSpec {
        name: "ISNUMBER",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, isnumber),
    }
}

fn isnumber(call: &Call<'_>) -> Value {
    // No text parsing: ISNUMBER("5") is FALSE.
    Value::from(matches!(call.scalar(0), Scalar::Number(_)))
}

inventory::submit! {
    FunctionSpec {
        name: "ISTEXT",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, istext),
    }
}

fn istext(call: &Call<'_>) -> Value {
    Value::from(matches!(call.scalar(0), Scalar::Text(_)))
}

inventory::submit! {
    FunctionSpec {
        name: "ISNONTEXT",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, isnontext),
    }
}

fn isnontext(call: &Call<'_>) -> Value {
    Value::from(!matches!(call.scalar(0), Scalar::Text(_)))
}

inventory::submit! {
    FunctionSpec {
        name: "ISLOGICAL",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, islogical),
    }
}

fn islogical(call: &Call<'_>) -> Value {
    Value::from(matches!(call.scalar(0), Scalar::Logical(_)))
}

inventory::submit! {
    FunctionSpec {
        name: "ISREF",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(isref),
    }
}

fn isref(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    // Judged on the evaluated shape, so a #REF! error scalar is not a
    // reference.
    Value::from(matches!(ev.eval(&args[0]), Value::Reference(_)))
}

inventory::submit! {
    FunctionSpec {
        name: "ISEVEN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, iseven),
    }
}

fn iseven(call: &Call<'_>) -> Value {
    Value::from((call.number(0).trunc() % 2.0).abs() == 0.0)
}

inventory::submit! {
    FunctionSpec {
        name: "ISODD",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, isodd),
    }
}

fn isodd(call: &Call<'_>) -> Value {
    Value::from((call.number(0).trunc() % 2.0).abs() == 1.0)
}

inventory::submit! {
    FunctionSpec {
        name: "N",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, n),
    }
}

fn n(call: &Call<'_>) -> Value {
    match call.scalar(0) {
        Scalar::Number(v) => Value::from(*v),
        Scalar::Logical(b) => Value::from(if *b { 1.0 } else { 0.0 }),
        Scalar::Error(e) => Value::from(*e),
        // Text never parses here, unlike ordinary numeric coercion.
        Scalar::Text(_) | Scalar::Blank => Value::from(0.0),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "NA",
        min_args: 0,
        max_args: 0,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NO_ARGS, na),
    }
}

fn na(_call: &Call<'_>) -> Value {
    Value::from(ErrorKind::NA)
}

inventory::submit! {
    FunctionSpec {
        name: "TYPE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(type_code),
    }
}

fn type_code(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    let code = match ev.eval(&args[0]) {
        Value::Array(_) => 64.0,
        Value::Reference(_) => scalar_type_code(&ev.eval_scalar(&args[0])),
        Value::Scalar(s) => scalar_type_code(&s),
    };
    Value::from(code)
}

fn scalar_type_code(scalar: &Scalar) -> f64 {
    match scalar {
        // A blank cell reports as a number, matching its zero coercion.
        Scalar::Number(_) | Scalar::Blank => 1.0,
        Scalar::Text(_) => 2.0,
        Scalar::Logical(_) => 4.0,
        Scalar::Error(_) => 16.0,
    }
}

inventory::submit! {
    FunctionSpec {
        name: "ERROR.TYPE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, error_type),
    }
}

fn error_type(call: &Call<'_>) -> Value {
    match call.scalar(0) {
        Scalar::Error(e) => Value::from(f64::from(e.type_number())),
        // A non-error argument is the one case where this function itself
        // errors.
        _ => Value::from(ErrorKind::NA),
    }
}
