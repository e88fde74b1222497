//! Database builtins: aggregate one field of a header-rowed table, filtered
//! through a criteria table whose rows OR together and whose cells within a
//! row AND together.

use crate::value::{ErrorKind, Scalar, Value};

use super::database::{fold_fields, matching_records, CriteriaTable, Database};
use super::tally::{Average, Extreme, Product, Sum, Tally};
use super::{
    number_value, Call, FunctionImpl, FunctionSpec, ParamKind, ReturnShape, SideEffect, Signature,
    Volatility,
};

static DB_ARGS: Signature =
    Signature::fixed(&[ParamKind::Range, ParamKind::Scalar, ParamKind::Range]);

inventory::submit! {
    FunctionSpec {
        name: "DSUM",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, dsum),
    }
}

fn dsum(call: &Call<'_>) -> Value {
    let mut sum = Sum::default();
    number_value(fold_database(call, &mut sum))
}

inventory::submit! {
    FunctionSpec {
        name: "DCOUNT",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, dcount),
    }
}

fn dcount(call: &Call<'_>) -> Value {
    match database_count(call, CountKind::Numbers) {
        Ok(count) => Value::from(count as f64),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "DCOUNTA",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, dcounta),
    }
}

fn dcounta(call: &Call<'_>) -> Value {
    match database_count(call, CountKind::NonBlank) {
        Ok(count) => Value::from(count as f64),
        Err(e) => Value::from(e),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "DAVERAGE",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, daverage),
    }
}

fn daverage(call: &Call<'_>) -> Value {
    let mut average = Average::default();
    number_value(fold_database(call, &mut average))
}

inventory::submit! {
    FunctionSpec {
        name: "DMAX",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, dmax),
    }
}

fn dmax(call: &Call<'_>) -> Value {
    let mut extreme = Extreme::max();
    number_value(fold_database(call, &mut extreme))
}

inventory::submit! {
    FunctionSpec {
        name: "DMIN",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, dmin),
    }
}

fn dmin(call: &Call<'_>) -> Value {
    let mut extreme = Extreme::min();
    number_value(fold_database(call, &mut extreme))
}

inventory::submit! {
    FunctionSpec {
        name: "DPRODUCT",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, dproduct),
    }
}

fn dproduct(call: &Call<'_>) -> Value {
    let mut product = Product::default();
    number_value(fold_database(call, &mut product))
}

inventory::submit! {
    FunctionSpec {
        name: "DGET",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&DB_ARGS, dget),
    }
}

fn dget(call: &Call<'_>) -> Value {
    match dget_value(call) {
        Ok(scalar) => Value::Scalar(scalar),
        Err(e) => Value::from(e),
    }
}

fn dget_value(call: &Call<'_>) -> Result<Scalar, ErrorKind> {
    let (db, criteria) = bind(call)?;
    let field = db.field_index(call.scalar(1), &call.culture())?;
    let mut records = matching_records(&db, &criteria);
    // Exactly one record may qualify: none is #VALUE!, several are #NUM!.
    let record = records.next().ok_or(ErrorKind::Value)?;
    if records.next().is_some() {
        return Err(ErrorKind::Num);
    }
    Ok(db.field_value(record, field))
}

/// Builds the database and parsed criteria table every D-function starts
/// from.
fn bind<'a>(call: &Call<'a>) -> Result<(Database<'a>, CriteriaTable), ErrorKind> {
    let db = Database::new(call.range(0).clone());
    let criteria = CriteriaTable::new(call.range(2), &db, &call.culture())?;
    Ok((db, criteria))
}

fn fold_database(call: &Call<'_>, tally: &mut dyn Tally) -> Result<f64, ErrorKind> {
    let (db, criteria) = bind(call)?;
    let field = db.field_index(call.scalar(1), &call.culture())?;
    fold_fields(&db, &criteria, field, tally)?;
    tally.finish()
}

#[derive(Clone, Copy)]
enum CountKind {
    Numbers,
    NonBlank,
}

fn database_count(call: &Call<'_>, kind: CountKind) -> Result<usize, ErrorKind> {
    let (db, criteria) = bind(call)?;
    let selector = call.scalar(1);
    if matches!(selector, Scalar::Blank) {
        // No field given: count the matching records themselves.
        return Ok(matching_records(&db, &criteria).count());
    }
    let field = db.field_index(selector, &call.culture())?;
    let count = matching_records(&db, &criteria)
        .filter(|&record| {
            let value = db.field_value(record, field);
            match kind {
                CountKind::Numbers => matches!(value, Scalar::Number(_)),
                CountKind::NonBlank => !matches!(value, Scalar::Blank),
            }
        })
        .count();
    Ok(count)
}
