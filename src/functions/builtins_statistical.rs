//! Statistical builtins: the counting family, extremes, order statistics,
//! and the dispersion measures.

use crate::coerce;
use crate::value::{ErrorKind, Scalar, Value};
use crate::view::RangeView;

use super::tally::{Average, Extreme, Spread, SpreadMode, Tally};
use super::{
    fold_numbers, number_value, Call, FunctionImpl, FunctionSpec, NumberFold, ParamKind,
    Provenance, ReturnShape, SideEffect, Signature, Volatility,
};

const VAR_ARGS: usize = crate::EXCEL_MAX_ARGS;

static VALUES: Signature = Signature::variadic(&[]);
static RANGE_ONLY: Signature = Signature::fixed(&[ParamKind::Range]);
static RANGE_AND_K: Signature = Signature::fixed(&[ParamKind::Range, ParamKind::Number]);

inventory::submit! {
    FunctionSpec {
        name: "AVERAGE",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, average),
    }
}

fn average(call: &Call<'_>) -> Value {
    tally_numbers(call, NumberFold::Strict, &mut Average::default())
}

inventory::submit! {
    FunctionSpec {
        name: "AVERAGEA",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, averagea),
    }
}

fn averagea(call: &Call<'_>) -> Value {
    tally_numbers(call, NumberFold::CountAllTypes, &mut Average::default())
}

inventory::submit! {
    FunctionSpec {
        name: "MAX",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, max),
    }
}

fn max(call: &Call<'_>) -> Value {
    tally_numbers(call, NumberFold::Strict, &mut Extreme::max())
}

inventory::submit! {
    FunctionSpec {
        name: "MAXA",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, maxa),
    }
}

fn maxa(call: &Call<'_>) -> Value {
    tally_numbers(call, NumberFold::CountAllTypes, &mut Extreme::max())
}

inventory::submit! {
    FunctionSpec {
        name: "MIN",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, min),
    }
}

fn min(call: &Call<'_>) -> Value {
    tally_numbers(call, NumberFold::Strict, &mut Extreme::min())
}

inventory::submit! {
    FunctionSpec {
        name: "MINA",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, mina),
    }
}

fn mina(call: &Call<'_>) -> Value {
    tally_numbers(call, NumberFold::CountAllTypes, &mut Extreme::min())
}

/// Runs the shared numeric fold into a tally and reports its result.
fn tally_numbers(call: &Call<'_>, mode: NumberFold, tally: &mut dyn Tally) -> Value {
    if let Err(e) = fold_numbers(call, mode, &mut |n| tally.fold(n)) {
        return Value::from(e);
    }
    number_value(tally.finish())
}

inventory::submit! {
    FunctionSpec {
        name: "COUNT",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, count),
    }
}

fn count(call: &Call<'_>) -> Value {
    let culture = call.culture();
    let mut tally = 0usize;
    for source in call.values() {
        // Errors never poison a COUNT; an error cell is simply not a number.
        let _ = source.for_each(&mut |provenance, scalar| {
            match (provenance, &scalar) {
                (Provenance::Direct, _) => {
                    if coerce::to_number(&scalar, &culture).is_ok() {
                        tally += 1;
                    }
                }
                (Provenance::Element, Scalar::Number(_)) => tally += 1,
                (Provenance::Element, _) => {}
            }
            Ok(())
        });
    }
    Value::from(tally as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "COUNTA",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, counta),
    }
}

fn counta(call: &Call<'_>) -> Value {
    let mut tally = 0usize;
    for source in call.values() {
        let _ = source.for_each(&mut |provenance, scalar| {
            match (provenance, &scalar) {
                // A provided argument always counts, even a blank one.
                (Provenance::Direct, _) => tally += 1,
                (Provenance::Element, Scalar::Blank) => {}
                // Error cells and empty text both count as "not empty".
                (Provenance::Element, _) => tally += 1,
            }
            Ok(())
        });
    }
    Value::from(tally as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "COUNTBLANK",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_ONLY, countblank),
    }
}

fn countblank(call: &Call<'_>) -> Value {
    let view = call.range(0);
    let mut tally = 0usize;
    for offset in 0..view.cell_count() {
        match view.at_offset(offset) {
            Scalar::Blank => tally += 1,
            // Empty text produced by a formula counts as blank here.
            Scalar::Text(t) if t.is_empty() => tally += 1,
            _ => {}
        }
    }
    Value::from(tally as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "MEDIAN",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, median),
    }
}

fn median(call: &Call<'_>) -> Value {
    let mut numbers = Vec::new();
    if let Err(e) = fold_numbers(call, NumberFold::Strict, &mut |n| numbers.push(n)) {
        return Value::from(e);
    }
    if numbers.is_empty() {
        return Value::from(ErrorKind::Num);
    }
    numbers.sort_unstable_by(f64::total_cmp);
    let mid = numbers.len() / 2;
    let median = if numbers.len() % 2 == 1 {
        numbers[mid]
    } else {
        (numbers[mid - 1] + numbers[mid]) / 2.0
    };
    Value::from(median)
}

inventory::submit! {
    FunctionSpec {
        name: "LARGE",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_AND_K, large),
    }
}

fn large(call: &Call<'_>) -> Value {
    number_value(order_statistic(call.range(0), call.number(1), true))
}

inventory::submit! {
    FunctionSpec {
        name: "SMALL",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_AND_K, small),
    }
}

fn small(call: &Call<'_>) -> Value {
    number_value(order_statistic(call.range(0), call.number(1), false))
}

/// The k-th order statistic for LARGE and SMALL. Non-numeric elements are
/// skipped and the rank is validated against what remains; error cells
/// surface.
fn order_statistic(view: &RangeView<'_>, k: f64, descending: bool) -> Result<f64, ErrorKind> {
    let mut numbers = Vec::new();
    for offset in 0..view.cell_count() {
        match view.at_offset(offset) {
            Scalar::Number(n) => numbers.push(n),
            Scalar::Error(e) => return Err(e),
            _ => {}
        }
    }
    let k = k.trunc();
    if k < 1.0 || k > numbers.len() as f64 {
        return Err(ErrorKind::Num);
    }
    numbers.sort_unstable_by(f64::total_cmp);
    let index = if descending {
        numbers.len() - k as usize
    } else {
        k as usize - 1
    };
    Ok(numbers[index])
}

inventory::submit! {
    FunctionSpec {
        name: "STDEV",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, stdev),
    }
}

fn stdev(call: &Call<'_>) -> Value {
    tally_numbers(
        call,
        NumberFold::Strict,
        &mut Spread::new(SpreadMode::SampleStdDev),
    )
}

inventory::submit! {
    FunctionSpec {
        name: "STDEVP",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, stdevp),
    }
}

fn stdevp(call: &Call<'_>) -> Value {
    tally_numbers(
        call,
        NumberFold::Strict,
        &mut Spread::new(SpreadMode::PopulationStdDev),
    )
}

inventory::submit! {
    FunctionSpec {
        name: "VAR",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, var),
    }
}

fn var(call: &Call<'_>) -> Value {
    tally_numbers(
        call,
        NumberFold::Strict,
        &mut Spread::new(SpreadMode::SampleVariance),
    )
}

inventory::submit! {
    FunctionSpec {
        name: "VARP",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, varp),
    }
}

fn varp(call: &Call<'_>) -> Value {
    tally_numbers(
        call,
        NumberFold::Strict,
        &mut Spread::new(SpreadMode::PopulationVariance),
    )
}
