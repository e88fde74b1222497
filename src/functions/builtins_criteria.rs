//! The conditional aggregates: COUNTIF/SUMIF/AVERAGEIF and their
//! multi-criteria *IFS counterparts.
//!
//! All of them parse criteria through [`super::criteria`] and the *IFS
//! family intersects offsets through [`super::tally`]. The split that
//! matters here: SUMIF and AVERAGEIF silently resize a mismatched result
//! range from its top-left cell, while every *IFS function demands
//! congruent shapes up front.

use crate::eval::CellContext;
use crate::refs::{Area, CellAddr, MAX_COLS, MAX_ROWS};
use crate::value::{ErrorKind, Scalar, Value};
use crate::view::RangeView;

use super::criteria::LEGACY_TEXT_LIMIT;
use super::tally::{count_matching, fold_matching, Average, CriteriaRange, Extreme, Sum, Tally};
use super::{
    number_value, Call, FunctionImpl, FunctionSpec, ParamKind, ReturnShape, SideEffect, Signature,
    Volatility,
};

const VAR_ARGS: usize = crate::EXCEL_MAX_ARGS;

static RANGE_AND_CRITERION: Signature = Signature::fixed(&[ParamKind::Range, ParamKind::Scalar]);
static RANGE_CRITERION_RESULT: Signature = Signature::fixed(&[
    ParamKind::Range,
    ParamKind::Scalar,
    ParamKind::OptionalRange,
]);
static PAIRS_ONLY: Signature = Signature::pairs(&[]);
static VALUES_THEN_PAIRS: Signature = Signature::pairs(&[ParamKind::Range]);

/// Criterion text beyond the legacy cap refuses outright, the same cap the
/// classic lookups enforce.
fn check_criterion(criterion: &Scalar) -> Result<(), ErrorKind> {
    match criterion {
        Scalar::Text(t) if t.chars().count() > LEGACY_TEXT_LIMIT => Err(ErrorKind::Value),
        _ => Ok(()),
    }
}

/// `(rows, cols)` resize from a view's top-left, for the SUMIF/AVERAGEIF
/// result range. Only live worksheet ranges can grow past their own extent.
fn resize_like<'a>(
    view: &RangeView<'a>,
    (rows, cols): (usize, usize),
    cells: &'a dyn CellContext,
) -> Result<RangeView<'a>, ErrorKind> {
    if view.shape() == (rows, cols) {
        return Ok(view.clone());
    }
    let Some(area) = view.sheet_area() else {
        return Err(ErrorKind::Value);
    };
    let end_row = area.start.row as usize + rows - 1;
    let end_col = area.start.col as usize + cols - 1;
    if end_row >= MAX_ROWS as usize || end_col >= MAX_COLS as usize {
        return Err(ErrorKind::Ref);
    }
    let resized = Area::new(
        area.sheet,
        area.start,
        CellAddr::new(end_row as u32, end_col as u32),
    );
    Ok(RangeView::Sheet {
        cells,
        area: resized,
    })
}

inventory::submit! {
    FunctionSpec {
        name: "COUNTIF",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_AND_CRITERION, countif),
    }
}

fn countif(call: &Call<'_>) -> Value {
    let criterion = call.scalar(1);
    if let Err(e) = check_criterion(criterion) {
        return Value::from(e);
    }
    let range = CriteriaRange::new(call.range(0).clone(), criterion, &call.culture());
    match count_matching(&[range]) {
        Ok(count) => Value::from(count as f64),
        Err(e) => Value::from(e),
    }
}

/// Shared SUMIF/AVERAGEIF body: one criteria range, optional result range
/// resized to the criteria shape.
fn fold_single_criterion(call: &Call<'_>, tally: &mut dyn Tally) -> Value {
    let criterion = call.scalar(1);
    if let Err(e) = check_criterion(criterion) {
        return Value::from(e);
    }
    let criteria_view = call.range(0);
    let values = match call.opt_range(2) {
        Some(view) => match resize_like(view, criteria_view.shape(), call.cells()) {
            Ok(view) => view,
            Err(e) => return Value::from(e),
        },
        None => criteria_view.clone(),
    };
    let range = CriteriaRange::new(criteria_view.clone(), criterion, &call.culture());
    match fold_matching(&[values], &[range], tally) {
        Ok(()) => number_value(tally.finish()),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "SUMIF",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_CRITERION_RESULT, sumif),
    }
}

fn sumif(call: &Call<'_>) -> Value {
    fold_single_criterion(call, &mut Sum::default())
}

inventory::submit! {
    FunctionSpec {
        name: "AVERAGEIF",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_CRITERION_RESULT, averageif),
    }
}

fn averageif(call: &Call<'_>) -> Value {
    fold_single_criterion(call, &mut Average::default())
}

/// Builds the `CriteriaRange` list from a call's `(range, criterion)` pair
/// tail, validating each criterion on the way.
fn pair_ranges<'a>(call: &Call<'a>) -> Result<Vec<CriteriaRange<'a>>, ErrorKind> {
    let culture = call.culture();
    let mut ranges = Vec::with_capacity(call.pairs().len());
    for (view, criterion) in call.pairs() {
        check_criterion(criterion)?;
        ranges.push(CriteriaRange::new(view.clone(), criterion, &culture));
    }
    Ok(ranges)
}

inventory::submit! {
    FunctionSpec {
        name: "COUNTIFS",
        min_args: 2,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&PAIRS_ONLY, countifs),
    }
}

fn countifs(call: &Call<'_>) -> Value {
    let ranges = match pair_ranges(call) {
        Ok(ranges) => ranges,
        Err(e) => return Value::from(e),
    };
    match count_matching(&ranges) {
        Ok(count) => Value::from(count as f64),
        Err(e) => Value::from(e),
    }
}

/// Shared *IFS body: strict congruence between the value range and every
/// criteria range, no resizing.
fn fold_criteria(call: &Call<'_>, tally: &mut dyn Tally) -> Value {
    let ranges = match pair_ranges(call) {
        Ok(ranges) => ranges,
        Err(e) => return Value::from(e),
    };
    let values = call.range(0).clone();
    match fold_matching(&[values], &ranges, tally) {
        Ok(()) => number_value(tally.finish()),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "SUMIFS",
        min_args: 3,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES_THEN_PAIRS, sumifs),
    }
}

fn sumifs(call: &Call<'_>) -> Value {
    fold_criteria(call, &mut Sum::default())
}

inventory::submit! {
    FunctionSpec {
        name: "AVERAGEIFS",
        min_args: 3,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES_THEN_PAIRS, averageifs),
    }
}

fn averageifs(call: &Call<'_>) -> Value {
    fold_criteria(call, &mut Average::default())
}

inventory::submit! {
    FunctionSpec {
        name: "MINIFS",
        min_args: 3,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES_THEN_PAIRS, minifs),
    }
}

fn minifs(call: &Call<'_>) -> Value {
    fold_criteria(call, &mut Extreme::min())
}

inventory::submit! {
    FunctionSpec {
        name: "MAXIFS",
        min_args: 3,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES_THEN_PAIRS, maxifs),
    }
}

fn maxifs(call: &Call<'_>) -> Value {
    fold_criteria(call, &mut Extreme::max())
}
