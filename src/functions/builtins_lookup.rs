//! Lookup and reference builtins.
//!
//! The classic lookups (MATCH, VLOOKUP, HLOOKUP, LOOKUP) share their legacy
//! baggage: a blank lookup key searches for zero, lookup text past 255
//! characters refuses the call, approximate mode runs the historical
//! bisection, and exact mode activates wildcards. XLOOKUP and XMATCH carry
//! none of that and get their own matcher.

use std::cmp::Ordering;

use crate::coerce;
use crate::eval::{compare_scalars, Evaluator, Expr};
use crate::locale::Culture;
use crate::refs::{Area, CellAddr, Reference, MAX_COLS, MAX_ROWS};
use crate::value::{Array, ErrorKind, Scalar, Value};
use crate::view::RangeView;

use super::bisect::{bisection_search, vector_at, vector_len, LookupVector};
use super::criteria::LEGACY_TEXT_LIMIT;
use super::wildcard::{contains_wildcards, WildcardPattern};
use super::{
    Call, FunctionImpl, FunctionSpec, ParamKind, ReturnShape, SideEffect, Signature, Volatility,
};

const VAR_ARGS: usize = crate::EXCEL_MAX_ARGS;

static MATCH_ARGS: Signature = Signature::fixed(&[
    ParamKind::Scalar,
    ParamKind::Range,
    ParamKind::OptionalNumber(1.0),
]);
static XMATCH_ARGS: Signature = Signature::fixed(&[
    ParamKind::Scalar,
    ParamKind::Range,
    ParamKind::OptionalNumber(0.0),
    ParamKind::OptionalNumber(1.0),
]);
static VLOOKUP_ARGS: Signature = Signature::fixed(&[
    ParamKind::Scalar,
    ParamKind::Range,
    ParamKind::Number,
    ParamKind::OptionalLogical(true),
]);
static LOOKUP_ARGS: Signature = Signature::fixed(&[
    ParamKind::Scalar,
    ParamKind::Range,
    ParamKind::OptionalRange,
]);
static XLOOKUP_ARGS: Signature = Signature::fixed(&[
    ParamKind::Scalar,
    ParamKind::Range,
    ParamKind::Range,
    ParamKind::OptionalScalar,
    ParamKind::OptionalNumber(0.0),
    ParamKind::OptionalNumber(1.0),
]);
static INDEX_ARGS: Signature = Signature::fixed(&[
    ParamKind::Range,
    ParamKind::Number,
    ParamKind::OptionalNumber(0.0),
]);
static OFFSET_ARGS: Signature = Signature::fixed(&[
    ParamKind::Range,
    ParamKind::Number,
    ParamKind::Number,
    ParamKind::OptionalScalar,
    ParamKind::OptionalScalar,
]);
static OPTIONAL_RANGE: Signature = Signature::fixed(&[ParamKind::OptionalRange]);
static RANGE_ONLY: Signature = Signature::fixed(&[ParamKind::Range]);

/// Legacy lookup key normalization: blanks search for zero, error keys
/// propagate, and text past the legacy cap refuses the call outright.
fn legacy_key(scalar: &Scalar) -> Result<Scalar, ErrorKind> {
    match scalar {
        Scalar::Error(e) => Err(*e),
        Scalar::Blank => Ok(Scalar::Number(0.0)),
        Scalar::Text(t) if t.chars().count() > LEGACY_TEXT_LIMIT => Err(ErrorKind::Value),
        other => Ok(other.clone()),
    }
}

/// XLOOKUP/XMATCH key normalization: same blank-to-zero rule, no length cap.
fn modern_key(scalar: &Scalar) -> Result<Scalar, ErrorKind> {
    match scalar {
        Scalar::Error(e) => Err(*e),
        Scalar::Blank => Ok(Scalar::Number(0.0)),
        other => Ok(other.clone()),
    }
}

/// The single row or column a one-dimensional view exposes.
fn single_vector(view: &RangeView<'_>) -> Option<LookupVector> {
    let (rows, cols) = view.shape();
    if rows == 1 && cols > 1 {
        Some(LookupVector::Row(0))
    } else if cols == 1 {
        Some(LookupVector::Column(0))
    } else {
        None
    }
}

/// The axis LOOKUP's vector form searches: the longer one, columns winning
/// ties.
fn long_axis(view: &RangeView<'_>) -> LookupVector {
    let (rows, cols) = view.shape();
    if cols > rows {
        LookupVector::Row(0)
    } else {
        LookupVector::Column(0)
    }
}

fn same_type(a: &Scalar, b: &Scalar) -> bool {
    matches!(
        (a, b),
        (Scalar::Number(_), Scalar::Number(_))
            | (Scalar::Text(_), Scalar::Text(_))
            | (Scalar::Logical(_), Scalar::Logical(_))
    )
}

/// Does this candidate satisfy an exact match? Error cells never do, and a
/// prepared wildcard pattern replaces plain text equality.
fn exact_hit(
    key: &Scalar,
    candidate: &Scalar,
    pattern: Option<&WildcardPattern>,
    culture: &Culture,
) -> bool {
    if matches!(candidate, Scalar::Error(_)) {
        return false;
    }
    match pattern {
        Some(p) => matches!(candidate, Scalar::Text(c) if p.matches(c)),
        None => {
            same_type(key, candidate)
                && compare_scalars(key, candidate, culture) == Ok(Ordering::Equal)
        }
    }
}

/// First index matching the key exactly, wildcards active for text keys.
fn exact_scan(
    view: &RangeView<'_>,
    vector: LookupVector,
    key: &Scalar,
    culture: &Culture,
) -> Option<usize> {
    let pattern = match key {
        Scalar::Text(t) if contains_wildcards(t) => Some(WildcardPattern::new(t)),
        _ => None,
    };
    (0..vector_len(view, vector))
        .find(|&i| exact_hit(key, &vector_at(view, vector, i), pattern.as_ref(), culture))
}

/// The XMATCH/XLOOKUP matcher. `match_mode`: 0 exact, -1 exact or next
/// smaller, 1 exact or next larger, 2 wildcard. `search_mode`: 1 forward,
/// -1 reverse, 2 binary over ascending data, -2 binary over descending
/// data. A binary mode that cannot express the requested match falls back
/// to the forward scan.
fn xmatch_index(
    view: &RangeView<'_>,
    vector: LookupVector,
    key: &Scalar,
    match_mode: f64,
    search_mode: f64,
    culture: &Culture,
) -> Option<usize> {
    if search_mode == 2.0 && match_mode <= 0.0 {
        let found = bisection_search(view, vector, key, true)?;
        if match_mode == 0.0 && !exact_hit(key, &vector_at(view, vector, found), None, culture) {
            return None;
        }
        return Some(found);
    }
    if search_mode == -2.0 && match_mode >= 0.0 && match_mode < 2.0 {
        let found = bisection_search(view, vector, key, false)?;
        if match_mode == 0.0 && !exact_hit(key, &vector_at(view, vector, found), None, culture) {
            return None;
        }
        return Some(found);
    }

    let len = vector_len(view, vector);
    let pattern = match key {
        Scalar::Text(t) if match_mode == 2.0 && contains_wildcards(t) => {
            Some(WildcardPattern::new(t))
        }
        _ => None,
    };
    let order: Box<dyn Iterator<Item = usize>> = if search_mode == -1.0 {
        Box::new((0..len).rev())
    } else {
        Box::new(0..len)
    };
    let mut nearest: Option<usize> = None;
    for i in order {
        let candidate = vector_at(view, vector, i);
        if exact_hit(key, &candidate, pattern.as_ref(), culture) {
            return Some(i);
        }
        if match_mode.abs() == 1.0 && same_type(key, &candidate) {
            let wants_smaller = match_mode == -1.0;
            let Ok(cmp) = compare_scalars(&candidate, key, culture) else {
                continue;
            };
            let qualifies = if wants_smaller {
                cmp == Ordering::Less
            } else {
                cmp == Ordering::Greater
            };
            if !qualifies {
                continue;
            }
            let better = match nearest {
                None => true,
                Some(j) => {
                    let held = vector_at(view, vector, j);
                    match compare_scalars(&candidate, &held, culture) {
                        Ok(Ordering::Less) => !wants_smaller,
                        Ok(Ordering::Greater) => wants_smaller,
                        _ => false,
                    }
                }
            };
            if better {
                nearest = Some(i);
            }
        }
    }
    nearest
}

inventory::submit! {
    FunctionSpec {
        name: "MATCH",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&MATCH_ARGS, match_position),
    }
}

fn match_position(call: &Call<'_>) -> Value {
    let key = match legacy_key(call.scalar(0)) {
        Ok(key) => key,
        Err(e) => return Value::from(e),
    };
    let view = call.range(1);
    let Some(vector) = single_vector(view) else {
        return Value::from(ErrorKind::NA);
    };
    let mode = call.number(2);
    let found = if mode > 0.0 {
        bisection_search(view, vector, &key, true)
    } else if mode == 0.0 {
        exact_scan(view, vector, &key, &call.culture())
    } else {
        bisection_search(view, vector, &key, false)
    };
    match found {
        Some(i) => Value::from((i + 1) as f64),
        None => Value::from(ErrorKind::NA),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "XMATCH",
        min_args: 2,
        max_args: 4,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&XMATCH_ARGS, xmatch),
    }
}

fn xmatch(call: &Call<'_>) -> Value {
    let key = match modern_key(call.scalar(0)) {
        Ok(key) => key,
        Err(e) => return Value::from(e),
    };
    let view = call.range(1);
    let Some(vector) = single_vector(view) else {
        return Value::from(ErrorKind::Value);
    };
    match xmatch_index(
        view,
        vector,
        &key,
        call.number(2),
        call.number(3),
        &call.culture(),
    ) {
        Some(i) => Value::from((i + 1) as f64),
        None => Value::from(ErrorKind::NA),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "VLOOKUP",
        min_args: 3,
        max_args: 4,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VLOOKUP_ARGS, vlookup),
    }
}

fn vlookup(call: &Call<'_>) -> Value {
    let key = match legacy_key(call.scalar(0)) {
        Ok(key) => key,
        Err(e) => return Value::from(e),
    };
    let table = call.range(1);
    let pick = call.number(2).trunc();
    if pick < 1.0 {
        return Value::from(ErrorKind::Value);
    }
    if pick > table.cols() as f64 {
        return Value::from(ErrorKind::Ref);
    }
    let found = if call.logical(3) {
        bisection_search(table, LookupVector::Column(0), &key, true)
    } else {
        exact_scan(table, LookupVector::Column(0), &key, &call.culture())
    };
    match found {
        Some(row) => Value::Scalar(table.at(row, pick as usize - 1)),
        None => Value::from(ErrorKind::NA),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "HLOOKUP",
        min_args: 3,
        max_args: 4,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VLOOKUP_ARGS, hlookup),
    }
}

fn hlookup(call: &Call<'_>) -> Value {
    let key = match legacy_key(call.scalar(0)) {
        Ok(key) => key,
        Err(e) => return Value::from(e),
    };
    let table = call.range(1);
    let pick = call.number(2).trunc();
    if pick < 1.0 {
        return Value::from(ErrorKind::Value);
    }
    if pick > table.rows() as f64 {
        return Value::from(ErrorKind::Ref);
    }
    let found = if call.logical(3) {
        bisection_search(table, LookupVector::Row(0), &key, true)
    } else {
        exact_scan(table, LookupVector::Row(0), &key, &call.culture())
    };
    match found {
        Some(col) => Value::Scalar(table.at(pick as usize - 1, col)),
        None => Value::from(ErrorKind::NA),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "LOOKUP",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&LOOKUP_ARGS, lookup),
    }
}

fn lookup(call: &Call<'_>) -> Value {
    let key = match legacy_key(call.scalar(0)) {
        Ok(key) => key,
        Err(e) => return Value::from(e),
    };
    let view = call.range(1);
    match call.opt_range(2) {
        // Vector form: search one vector, answer from the other.
        Some(results) => {
            let Some(i) = bisection_search(view, long_axis(view), &key, true) else {
                return Value::from(ErrorKind::NA);
            };
            let result_vector = long_axis(results);
            if i >= vector_len(results, result_vector) {
                return Value::from(ErrorKind::Ref);
            }
            Value::Scalar(vector_at(results, result_vector, i))
        }
        // Array form: search the first row or column, answer from the last.
        None => {
            let (rows, cols) = view.shape();
            let (search, take): (LookupVector, fn(&RangeView<'_>, usize) -> Scalar) =
                if cols > rows {
                    (LookupVector::Row(0), |v, i| v.at(v.rows() - 1, i))
                } else {
                    (LookupVector::Column(0), |v, i| v.at(i, v.cols() - 1))
                };
            match bisection_search(view, search, &key, true) {
                Some(i) => Value::Scalar(take(view, i)),
                None => Value::from(ErrorKind::NA),
            }
        }
    }
}

/// One row of a view as a result value: a scalar when the view is a single
/// column, otherwise a 1×N array.
fn row_slice(view: &RangeView<'_>, row: usize) -> Value {
    if view.cols() == 1 {
        return Value::Scalar(view.at(row, 0));
    }
    let values = (0..view.cols()).map(|c| view.at(row, c)).collect();
    Value::Array(Array::new(1, view.cols(), values))
}

fn col_slice(view: &RangeView<'_>, col: usize) -> Value {
    if view.rows() == 1 {
        return Value::Scalar(view.at(0, col));
    }
    let values = (0..view.rows()).map(|r| view.at(r, col)).collect();
    Value::Array(Array::new(view.rows(), 1, values))
}

inventory::submit! {
    FunctionSpec {
        name: "XLOOKUP",
        min_args: 3,
        max_args: 6,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Array,
        implementation: FunctionImpl::Eager(&XLOOKUP_ARGS, xlookup),
    }
}

fn xlookup(call: &Call<'_>) -> Value {
    let key = match modern_key(call.scalar(0)) {
        Ok(key) => key,
        Err(e) => return Value::from(e),
    };
    let lookup_view = call.range(1);
    let Some(vector) = single_vector(lookup_view) else {
        return Value::from(ErrorKind::Value);
    };
    let len = vector_len(lookup_view, vector);
    let returns = call.range(2);
    let found = xmatch_index(
        lookup_view,
        vector,
        &key,
        call.number(4),
        call.number(5),
        &call.culture(),
    );
    let Some(i) = found else {
        return match call.opt_scalar(3) {
            Some(fallback) => Value::Scalar(fallback.clone()),
            None => Value::from(ErrorKind::NA),
        };
    };
    match vector {
        LookupVector::Column(_) => {
            // Return range rows must line up with the lookup column.
            if returns.rows() != len {
                return Value::from(ErrorKind::Value);
            }
            row_slice(returns, i)
        }
        LookupVector::Row(_) => {
            if returns.cols() != len {
                return Value::from(ErrorKind::Value);
            }
            col_slice(returns, i)
        }
    }
}

inventory::submit! {
    FunctionSpec {
        name: "INDEX",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Array,
        implementation: FunctionImpl::Eager(&INDEX_ARGS, index),
    }
}

fn index(call: &Call<'_>) -> Value {
    let view = call.range(0);
    let (rows, cols) = view.shape();
    let mut row = call.number(1).trunc();
    let mut col = call.number(2).trunc();
    // Two-argument INDEX over a single row addresses by column.
    if call.provided_len() < 3 && rows == 1 && cols > 1 {
        col = row;
        row = 1.0;
    }
    if row < 0.0 || col < 0.0 {
        return Value::from(ErrorKind::Value);
    }
    if row > rows as f64 || col > cols as f64 {
        return Value::from(ErrorKind::Ref);
    }
    // Index zero selects the whole axis.
    match (row as usize, col as usize) {
        (0, 0) => Value::Array(view.to_array()),
        (r, 0) => row_slice(view, r - 1),
        (0, c) => col_slice(view, c - 1),
        (r, c) => Value::Scalar(view.at(r - 1, c - 1)),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "OFFSET",
        min_args: 3,
        max_args: 5,
        volatility: Volatility::Volatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Reference,
        implementation: FunctionImpl::Eager(&OFFSET_ARGS, offset),
    }
}

fn offset(call: &Call<'_>) -> Value {
    let view = call.range(0);
    let Some(area) = view.sheet_area() else {
        // Only a real worksheet reference can be displaced.
        return Value::from(ErrorKind::Value);
    };
    let culture = call.culture();
    let dimension = |slot: usize, default: usize| -> Result<i64, ErrorKind> {
        match call.opt_scalar(slot) {
            None => Ok(default as i64),
            Some(s) => Ok(coerce::to_number(s, &culture)?.trunc() as i64),
        }
    };
    let height = match dimension(3, view.rows()) {
        Ok(h) => h,
        Err(e) => return Value::from(e),
    };
    let width = match dimension(4, view.cols()) {
        Ok(w) => w,
        Err(e) => return Value::from(e),
    };
    if height <= 0 || width <= 0 {
        return Value::from(ErrorKind::Ref);
    }
    let start_row = i64::from(area.start.row) + call.number(1).trunc() as i64;
    let start_col = i64::from(area.start.col) + call.number(2).trunc() as i64;
    let end_row = start_row + height - 1;
    let end_col = start_col + width - 1;
    if start_row < 0 || start_col < 0 || end_row >= i64::from(MAX_ROWS) || end_col >= i64::from(MAX_COLS) {
        return Value::from(ErrorKind::Ref);
    }
    Value::Reference(Reference::single(Area::new(
        area.sheet,
        CellAddr::new(start_row as u32, start_col as u32),
        CellAddr::new(end_row as u32, end_col as u32),
    )))
}

inventory::submit! {
    FunctionSpec {
        name: "CHOOSE",
        min_args: 2,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Lazy(choose),
    }
}

fn choose(ev: &Evaluator<'_>, args: &[Expr]) -> Value {
    let picked = ev.eval_scalar(&args[0]);
    let picked = match coerce::to_number(&picked, &ev.culture()) {
        Ok(n) => n.trunc(),
        Err(e) => return Value::from(e),
    };
    if picked < 1.0 || picked >= args.len() as f64 {
        return Value::from(ErrorKind::Value);
    }
    // Only the chosen branch is evaluated; it may be a reference.
    ev.eval(&args[picked as usize])
}

inventory::submit! {
    FunctionSpec {
        name: "ROW",
        min_args: 0,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&OPTIONAL_RANGE, row),
    }
}

fn row(call: &Call<'_>) -> Value {
    match call.opt_range(0) {
        None => Value::from(f64::from(call.ctx().current_cell.row) + 1.0),
        Some(view) => match view.sheet_area() {
            Some(area) => Value::from(f64::from(area.start.row) + 1.0),
            None => Value::from(ErrorKind::Value),
        },
    }
}

inventory::submit! {
    FunctionSpec {
        name: "COLUMN",
        min_args: 0,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&OPTIONAL_RANGE, column),
    }
}

fn column(call: &Call<'_>) -> Value {
    match call.opt_range(0) {
        None => Value::from(f64::from(call.ctx().current_cell.col) + 1.0),
        Some(view) => match view.sheet_area() {
            Some(area) => Value::from(f64::from(area.start.col) + 1.0),
            None => Value::from(ErrorKind::Value),
        },
    }
}

inventory::submit! {
    FunctionSpec {
        name: "ROWS",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_ONLY, rows),
    }
}

fn rows(call: &Call<'_>) -> Value {
    Value::from(call.range(0).rows() as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "COLUMNS",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&RANGE_ONLY, columns),
    }
}

fn columns(call: &Call<'_>) -> Value {
    Value::from(call.range(0).cols() as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "TRANSPOSE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Array,
        implementation: FunctionImpl::Eager(&RANGE_ONLY, transpose),
    }
}

fn transpose(call: &Call<'_>) -> Value {
    Value::Array(call.range(0).clone().transposed().to_array())
}
