//! Math and trigonometry builtins.

use std::f64::consts::PI;

use crate::value::{ErrorKind, Scalar, Value};
use crate::view::RangeView;

use super::{
    fold_numbers, number_value, volatile_rand_u64_below, Call, FunctionImpl, FunctionSpec,
    NumberFold, ParamKind, ReturnShape, SideEffect, Signature, Volatility,
};

const VAR_ARGS: usize = crate::EXCEL_MAX_ARGS;

/// Largest f64 that still distinguishes adjacent integers.
const INT_LIMIT: f64 = 9_007_199_254_740_992.0;

static ONE_NUMBER: Signature = Signature::fixed(&[ParamKind::Number]);
static TWO_NUMBERS: Signature = Signature::fixed(&[ParamKind::Number, ParamKind::Number]);
static NO_ARGS: Signature = Signature::fixed(&[]);
static VALUES: Signature = Signature::variadic(&[]);
static NUMBER_WITH_DIGITS: Signature =
    Signature::fixed(&[ParamKind::Number, ParamKind::OptionalNumber(0.0)]);
static LOG_ARGS: Signature = Signature::fixed(&[ParamKind::Number, ParamKind::OptionalNumber(10.0)]);

inventory::submit! {
    FunctionSpec {
        name: "ABS",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, abs),
    }
}

fn abs(call: &Call<'_>) -> Value {
    Value::from(call.number(0).abs())
}

inventory::submit! {
    FunctionSpec {
        name: "INT",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, int),
    }
}

fn int(call: &Call<'_>) -> Value {
    // Rounds toward negative infinity, not toward zero: INT(-8.9) is -9.
    Value::from(call.number(0).floor())
}

inventory::submit! {
    FunctionSpec {
        name: "SIGN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, sign),
    }
}

fn sign(call: &Call<'_>) -> Value {
    let n = call.number(0);
    // f64::signum reports 1 for 0.0, which is not what SIGN means.
    Value::from(if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        0.0
    })
}

inventory::submit! {
    FunctionSpec {
        name: "MOD",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, modulo),
    }
}

fn modulo(call: &Call<'_>) -> Value {
    let (a, b) = (call.number(0), call.number(1));
    if b == 0.0 {
        return Value::from(ErrorKind::Div0);
    }
    // Excel quirk: the result takes the sign of the divisor, so MOD(3,-2) is -1.
    number_value(Ok(a - b * (a / b).floor()))
}

#[derive(Clone, Copy)]
enum RoundMode {
    HalfAwayFromZero,
    AwayFromZero,
    TowardZero,
}

/// The power-of-ten scaling picks up binary noise (76.54 * 100 lands just
/// above 7654); snap to the nearest 1e-10 before the directional round.
fn snap(scaled: f64) -> f64 {
    let cleaned = (scaled * 1e10).round() / 1e10;
    if cleaned.is_finite() {
        cleaned
    } else {
        scaled
    }
}

fn round_to(n: f64, digits: f64, mode: RoundMode) -> f64 {
    let digits = digits.trunc().clamp(-400.0, 400.0) as i32;
    let scale = 10f64.powi(digits);
    let scaled = n * scale;
    if !scaled.is_finite() {
        return n;
    }
    let rounded = match mode {
        // f64::round already halves away from zero, which is what ROUND means.
        RoundMode::HalfAwayFromZero => snap(scaled).round(),
        RoundMode::AwayFromZero => snap(scaled).abs().ceil().copysign(n),
        RoundMode::TowardZero => snap(scaled).abs().trunc().copysign(n),
    };
    rounded / scale
}

inventory::submit! {
    FunctionSpec {
        name: "ROUND",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, round),
    }
}

fn round(call: &Call<'_>) -> Value {
    // Half rounds away from zero, not banker's style: ROUND(2.5,0) is 3.
    number_value(Ok(round_to(
        call.number(0),
        call.number(1),
        RoundMode::HalfAwayFromZero,
    )))
}

inventory::submit! {
    FunctionSpec {
        name: "ROUNDUP",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, roundup),
    }
}

fn roundup(call: &Call<'_>) -> Value {
    number_value(Ok(round_to(
        call.number(0),
        call.number(1),
        RoundMode::AwayFromZero,
    )))
}

inventory::submit! {
    FunctionSpec {
        name: "ROUNDDOWN",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, rounddown),
    }
}

fn rounddown(call: &Call<'_>) -> Value {
    number_value(Ok(round_to(
        call.number(0),
        call.number(1),
        RoundMode::TowardZero,
    )))
}

inventory::submit! {
    FunctionSpec {
        name: "TRUNC",
        min_args: 1,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NUMBER_WITH_DIGITS, trunc),
    }
}

fn trunc(call: &Call<'_>) -> Value {
    // TRUNC is ROUNDDOWN with an optional digit count.
    number_value(Ok(round_to(
        call.number(0),
        call.number(1),
        RoundMode::TowardZero,
    )))
}

inventory::submit! {
    FunctionSpec {
        name: "CEILING",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, ceiling),
    }
}

fn ceiling(call: &Call<'_>) -> Value {
    let (n, significance) = (call.number(0), call.number(1));
    if significance == 0.0 {
        // Excel quirk: CEILING of anything at significance 0 is 0, while
        // FLOOR divides by zero.
        return Value::from(0.0);
    }
    if n > 0.0 && significance < 0.0 {
        return Value::from(ErrorKind::Num);
    }
    number_value(Ok(snap(n / significance).ceil() * significance))
}

inventory::submit! {
    FunctionSpec {
        name: "FLOOR",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, floor),
    }
}

fn floor(call: &Call<'_>) -> Value {
    let (n, significance) = (call.number(0), call.number(1));
    if significance == 0.0 {
        return Value::from(ErrorKind::Div0);
    }
    if n > 0.0 && significance < 0.0 {
        return Value::from(ErrorKind::Num);
    }
    number_value(Ok(snap(n / significance).floor() * significance))
}

inventory::submit! {
    FunctionSpec {
        name: "SQRT",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, sqrt),
    }
}

fn sqrt(call: &Call<'_>) -> Value {
    let n = call.number(0);
    if n < 0.0 {
        return Value::from(ErrorKind::Num);
    }
    Value::from(n.sqrt())
}

inventory::submit! {
    FunctionSpec {
        name: "POWER",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, power),
    }
}

fn power(call: &Call<'_>) -> Value {
    let (base, exponent) = (call.number(0), call.number(1));
    if base == 0.0 && exponent == 0.0 {
        return Value::from(ErrorKind::Num);
    }
    if base == 0.0 && exponent < 0.0 {
        return Value::from(ErrorKind::Div0);
    }
    number_value(Ok(base.powf(exponent)))
}

inventory::submit! {
    FunctionSpec {
        name: "EXP",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, exp),
    }
}

fn exp(call: &Call<'_>) -> Value {
    number_value(Ok(call.number(0).exp()))
}

inventory::submit! {
    FunctionSpec {
        name: "LN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, ln),
    }
}

fn ln(call: &Call<'_>) -> Value {
    let n = call.number(0);
    if n <= 0.0 {
        return Value::from(ErrorKind::Num);
    }
    Value::from(n.ln())
}

inventory::submit! {
    FunctionSpec {
        name: "LOG",
        min_args: 1,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&LOG_ARGS, log),
    }
}

fn log(call: &Call<'_>) -> Value {
    let (n, base) = (call.number(0), call.number(1));
    if n <= 0.0 || base <= 0.0 {
        return Value::from(ErrorKind::Num);
    }
    let denominator = base.ln();
    if denominator == 0.0 {
        return Value::from(ErrorKind::Div0);
    }
    number_value(Ok(n.ln() / denominator))
}

inventory::submit! {
    FunctionSpec {
        name: "LOG10",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, log10),
    }
}

fn log10(call: &Call<'_>) -> Value {
    let n = call.number(0);
    if n <= 0.0 {
        return Value::from(ErrorKind::Num);
    }
    Value::from(n.log10())
}

inventory::submit! {
    FunctionSpec {
        name: "PI",
        min_args: 0,
        max_args: 0,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NO_ARGS, pi),
    }
}

fn pi(_call: &Call<'_>) -> Value {
    Value::from(PI)
}

inventory::submit! {
    FunctionSpec {
        name: "RADIANS",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, radians),
    }
}

fn radians(call: &Call<'_>) -> Value {
    Value::from(call.number(0) * PI / 180.0)
}

inventory::submit! {
    FunctionSpec {
        name: "DEGREES",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, degrees),
    }
}

fn degrees(call: &Call<'_>) -> Value {
    Value::from(call.number(0) * 180.0 / PI)
}

inventory::submit! {
    FunctionSpec {
        name: "SIN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, sin),
    }
}

fn sin(call: &Call<'_>) -> Value {
    number_value(Ok(call.number(0).sin()))
}

inventory::submit! {
    FunctionSpec {
        name: "COS",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, cos),
    }
}

fn cos(call: &Call<'_>) -> Value {
    number_value(Ok(call.number(0).cos()))
}

inventory::submit! {
    FunctionSpec {
        name: "TAN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, tan),
    }
}

fn tan(call: &Call<'_>) -> Value {
    number_value(Ok(call.number(0).tan()))
}

inventory::submit! {
    FunctionSpec {
        name: "ASIN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, asin),
    }
}

fn asin(call: &Call<'_>) -> Value {
    let n = call.number(0);
    if !(-1.0..=1.0).contains(&n) {
        return Value::from(ErrorKind::Num);
    }
    Value::from(n.asin())
}

inventory::submit! {
    FunctionSpec {
        name: "ACOS",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, acos),
    }
}

fn acos(call: &Call<'_>) -> Value {
    let n = call.number(0);
    if !(-1.0..=1.0).contains(&n) {
        return Value::from(ErrorKind::Num);
    }
    Value::from(n.acos())
}

inventory::submit! {
    FunctionSpec {
        name: "ATAN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, atan),
    }
}

fn atan(call: &Call<'_>) -> Value {
    Value::from(call.number(0).atan())
}

inventory::submit! {
    FunctionSpec {
        name: "ATAN2",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, atan2),
    }
}

fn atan2(call: &Call<'_>) -> Value {
    // Argument order is (x, y), the reverse of the usual atan2 convention.
    let (x, y) = (call.number(0), call.number(1));
    if x == 0.0 && y == 0.0 {
        return Value::from(ErrorKind::Div0);
    }
    Value::from(y.atan2(x))
}

inventory::submit! {
    FunctionSpec {
        name: "FACT",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, fact),
    }
}

fn fact(call: &Call<'_>) -> Value {
    let n = call.number(0).trunc();
    // 171! overflows f64.
    if n < 0.0 || n > 170.0 {
        return Value::from(ErrorKind::Num);
    }
    let mut product = 1.0;
    for i in 2..=(n as u32) {
        product *= f64::from(i);
    }
    Value::from(product)
}

inventory::submit! {
    FunctionSpec {
        name: "COMBIN",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, combin),
    }
}

fn combin(call: &Call<'_>) -> Value {
    let n = call.number(0).trunc();
    let k = call.number(1).trunc();
    if n < 0.0 || k < 0.0 || n < k {
        return Value::from(ErrorKind::Num);
    }
    let r = k.min(n - k);
    // Any C(n, r) with r beyond a thousand has long since left f64 range.
    if r > 1_000.0 {
        return Value::from(ErrorKind::Num);
    }
    let mut result = 1.0;
    for i in 1..=(r as u32) {
        result = result * (n - r + f64::from(i)) / f64::from(i);
    }
    number_value(Ok(result.round()))
}

fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Collects the call's numeric samples as non-negative integers, the shared
/// intake for GCD and LCM.
fn integer_samples(call: &Call<'_>) -> Result<Vec<u64>, ErrorKind> {
    let mut samples = Vec::new();
    let mut out_of_range = false;
    fold_numbers(call, NumberFold::Strict, &mut |n| {
        let n = n.trunc();
        if n < 0.0 || n >= INT_LIMIT {
            out_of_range = true;
        } else {
            samples.push(n as u64);
        }
    })?;
    if out_of_range {
        return Err(ErrorKind::Num);
    }
    Ok(samples)
}

inventory::submit! {
    FunctionSpec {
        name: "GCD",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, gcd),
    }
}

fn gcd(call: &Call<'_>) -> Value {
    match integer_samples(call) {
        Ok(samples) => {
            let divisor = samples.into_iter().fold(0, gcd_u64);
            Value::from(divisor as f64)
        }
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "LCM",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, lcm),
    }
}

fn lcm(call: &Call<'_>) -> Value {
    let samples = match integer_samples(call) {
        Ok(samples) => samples,
        Err(e) => return Value::from(e),
    };
    let mut multiple: u128 = 1;
    for n in samples {
        if n == 0 {
            return Value::from(0.0);
        }
        let n = u128::from(n);
        multiple = multiple / u128::from(gcd_u64(multiple as u64, n as u64)) * n;
        if multiple >= INT_LIMIT as u128 {
            return Value::from(ErrorKind::Num);
        }
    }
    Value::from(multiple as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "EVEN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, even),
    }
}

fn even(call: &Call<'_>) -> Value {
    let n = call.number(0);
    if n == 0.0 {
        return Value::from(0.0);
    }
    // Rounds away from zero to the next even integer.
    number_value(Ok(((n.abs() / 2.0).ceil() * 2.0).copysign(n)))
}

inventory::submit! {
    FunctionSpec {
        name: "ODD",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, odd),
    }
}

fn odd(call: &Call<'_>) -> Value {
    let n = call.number(0);
    if n == 0.0 {
        // Excel quirk: ODD(0) is 1.
        return Value::from(1.0);
    }
    let mut m = n.abs().ceil();
    if m % 2.0 == 0.0 {
        m += 1.0;
    }
    number_value(Ok(m.copysign(n)))
}

inventory::submit! {
    FunctionSpec {
        name: "QUOTIENT",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, quotient),
    }
}

fn quotient(call: &Call<'_>) -> Value {
    let (a, b) = (call.number(0), call.number(1));
    if b == 0.0 {
        return Value::from(ErrorKind::Div0);
    }
    number_value(Ok((a / b).trunc()))
}

inventory::submit! {
    FunctionSpec {
        name: "SUM",
        min_args: 0,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, sum),
    }
}

fn sum(call: &Call<'_>) -> Value {
    let mut total = 0.0;
    if let Err(e) = fold_numbers(call, NumberFold::Strict, &mut |n| total += n) {
        return Value::from(e);
    }
    number_value(Ok(total))
}

inventory::submit! {
    FunctionSpec {
        name: "PRODUCT",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, product),
    }
}

fn product(call: &Call<'_>) -> Value {
    let mut product = 1.0;
    let mut any = false;
    if let Err(e) = fold_numbers(call, NumberFold::Strict, &mut |n| {
        product *= n;
        any = true;
    }) {
        return Value::from(e);
    }
    // No numeric sample at all reports 0, not the empty product.
    number_value(Ok(if any { product } else { 0.0 }))
}

inventory::submit! {
    FunctionSpec {
        name: "SUMPRODUCT",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, sumproduct),
    }
}

fn sumproduct(call: &Call<'_>) -> Value {
    let mut views: Vec<RangeView<'_>> = Vec::with_capacity(call.values().len());
    for source in call.values() {
        match source.to_view() {
            Ok(view) => views.push(view),
            Err(e) => return Value::from(e),
        }
    }
    let shape = views[0].shape();
    if views.iter().any(|v| v.shape() != shape) {
        return Value::from(ErrorKind::Value);
    }
    let mut total = 0.0;
    for offset in 0..views[0].cell_count() {
        let mut term = 1.0;
        for view in &views {
            match view.at_offset(offset) {
                Scalar::Number(n) => term *= n,
                Scalar::Error(e) => return Value::from(e),
                // Text and logicals multiply as zero here, unlike SUM which
                // skips them entirely.
                _ => term = 0.0,
            }
        }
        total += term;
    }
    number_value(Ok(total))
}

inventory::submit! {
    FunctionSpec {
        name: "RAND",
        min_args: 0,
        max_args: 0,
        volatility: Volatility::Volatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&NO_ARGS, rand),
    }
}

fn rand(call: &Call<'_>) -> Value {
    Value::from(call.cells().volatile_rand())
}

inventory::submit! {
    FunctionSpec {
        name: "RANDBETWEEN",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::Volatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_NUMBERS, randbetween),
    }
}

fn randbetween(call: &Call<'_>) -> Value {
    let low = call.number(0).ceil();
    let high = call.number(1).floor();
    if low > high || low.abs() >= INT_LIMIT || high.abs() >= INT_LIMIT {
        return Value::from(ErrorKind::Num);
    }
    let span = (high - low + 1.0) as u64;
    let draw = volatile_rand_u64_below(call.cells(), span);
    Value::from(low + draw as f64)
}
