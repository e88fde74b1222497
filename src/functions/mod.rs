//! The function registry and dispatch entry point. Functions register
//! themselves with `inventory::submit!`; the first lookup collects them into
//! a name-keyed table that stays read-only for the life of the process.

pub mod args;
pub mod bisect;
pub mod criteria;
pub mod database;
pub mod tally;
pub mod wildcard;

mod builtins_criteria;
mod builtins_database;
mod builtins_date_time;
mod builtins_information;
mod builtins_logical;
mod builtins_lookup;
mod builtins_math;
mod builtins_statistical;
mod builtins_text;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::coerce;
use crate::eval::{CellContext, Evaluator, Expr};
use crate::value::{ErrorKind, Scalar, Value};
use crate::EXCEL_MAX_ARGS;

pub use args::{Call, ParamKind, Provenance, Repeat, Signature, ValueSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volatility {
    NonVolatile,
    /// Re-evaluated on every recalculation pass regardless of dependencies.
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    Pure,
    /// May touch presentation state through the context; never computation
    /// state.
    MutatesPresentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    Scalar,
    Array,
    Reference,
}

pub type EagerFn = fn(&Call<'_>) -> Value;
pub type LazyFn = fn(&Evaluator<'_>, &[Expr]) -> Value;

pub enum FunctionImpl {
    /// Arguments are evaluated and coerced by the dispatch adapter before
    /// the body runs; the first coercion error short-circuits the call.
    Eager(&'static Signature, EagerFn),
    /// The body receives raw expressions and decides what to evaluate
    /// (`IF`, `IFERROR`, `CHOOSE`, ...).
    Lazy(LazyFn),
}

pub struct FunctionSpec {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub volatility: Volatility,
    pub side_effect: SideEffect,
    pub returns: ReturnShape,
    pub implementation: FunctionImpl,
}

inventory::collect!(FunctionSpec);

fn registry() -> &'static HashMap<&'static str, &'static FunctionSpec> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static FunctionSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        for spec in inventory::iter::<FunctionSpec> {
            let prev = map.insert(spec.name, spec);
            assert!(
                prev.is_none(),
                "duplicate function registration: {}",
                spec.name
            );
        }
        map
    })
}

/// Case-insensitive lookup; `_xlfn.`-prefixed names (how newer functions
/// appear in older files) resolve to their plain spelling.
pub fn lookup_function(name: &str) -> Option<&'static FunctionSpec> {
    let upper = name.to_ascii_uppercase();
    let key = upper.strip_prefix("_XLFN.").unwrap_or(upper.as_str());
    registry().get(key).copied()
}

/// Sorted list of registered function names, for host introspection.
pub fn registered_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = registry().keys().copied().collect();
    names.sort_unstable();
    names
}

pub fn call_function(ev: &Evaluator<'_>, name: &str, args: &[Expr]) -> Value {
    let Some(spec) = lookup_function(name) else {
        return Value::from(ErrorKind::Name);
    };
    if args.len() < spec.min_args || args.len() > spec.max_args || args.len() > EXCEL_MAX_ARGS {
        return Value::from(ErrorKind::Value);
    }
    match &spec.implementation {
        FunctionImpl::Lazy(f) => f(ev, args),
        FunctionImpl::Eager(signature, f) => args::invoke(ev, signature, args, *f),
    }
}

/// Collapses the `Result<f64, ErrorKind>` shape most numeric bodies produce.
/// Non-finite results become `#NUM!`, so overflow checks need no per-function
/// boilerplate.
pub(crate) fn number_value(result: Result<f64, ErrorKind>) -> Value {
    match result {
        Ok(n) if n.is_finite() => Value::from(n),
        Ok(_) => Value::from(ErrorKind::Num),
        Err(e) => Value::from(e),
    }
}

/// How a numeric fold treats non-number elements found inside ranges and
/// arrays. Direct arguments always coerce (and fail loudly when they cannot).
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberFold {
    /// Range elements contribute only when they are numbers.
    Strict,
    /// Logical elements count as 1/0 and text elements as 0 (the *A family).
    CountAllTypes,
}

/// Feeds every numeric sample from the call's variadic tail into `f`.
///
/// Direct scalars coerce with text parsing; elements dispatch on stored type.
/// Error cells surface from anywhere, since the fold reads every cell.
pub(crate) fn fold_numbers(
    call: &Call<'_>,
    mode: NumberFold,
    f: &mut dyn FnMut(f64),
) -> Result<(), ErrorKind> {
    let culture = call.culture();
    for source in call.values() {
        source.for_each(&mut |provenance, scalar| {
            match (provenance, &scalar) {
                (_, Scalar::Error(e)) => return Err(*e),
                (Provenance::Direct, _) => f(coerce::to_number(&scalar, &culture)?),
                (Provenance::Element, Scalar::Number(n)) => f(*n),
                (Provenance::Element, Scalar::Logical(b)) if mode == NumberFold::CountAllTypes => {
                    f(if *b { 1.0 } else { 0.0 })
                }
                (Provenance::Element, Scalar::Text(_)) if mode == NumberFold::CountAllTypes => {
                    f(0.0)
                }
                (Provenance::Element, _) => {}
            }
            Ok(())
        })?;
    }
    Ok(())
}

/// Bijective u64 mixer used as the deterministic PRNG building block for
/// the process-seeded default draw.
pub fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e3779b97f4a7c15);
    state = (state ^ (state >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    state = (state ^ (state >> 27)).wrapping_mul(0x94d049bb133111eb);
    state ^ (state >> 31)
}

static PROCESS_DRAWS: AtomicU64 = AtomicU64::new(0);

/// Default `volatile_rand_u64` source: wall-clock seed mixed with a global
/// draw counter so consecutive draws differ even within one clock tick.
pub fn process_rand_u64() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let draw = PROCESS_DRAWS.fetch_add(1, Ordering::Relaxed);
    splitmix64(nanos ^ draw.wrapping_mul(0x9e3779b97f4a7c15))
}

/// Uniform draw in `[0, span)` by rejection sampling, so `RANDBETWEEN`
/// carries no modulo bias.
pub(crate) fn volatile_rand_u64_below(cells: &dyn CellContext, span: u64) -> u64 {
    if span == 0 {
        return 0;
    }
    let zone = (u64::MAX / span) * span;
    loop {
        let v = cells.volatile_rand_u64();
        if v < zone {
            return v % span;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_strips_xlfn() {
        assert!(lookup_function("sum").is_some());
        assert!(lookup_function("SUM").is_some());
        assert!(lookup_function("_xlfn.XLOOKUP").is_some());
        assert!(lookup_function("NO_SUCH_FN").is_none());
    }

    #[test]
    fn the_library_is_registered() {
        let names = registered_names();
        assert!(names.len() >= 120, "registered {}", names.len());
        for name in ["VLOOKUP", "SUMIFS", "DGET", "EOMONTH", "TEXTJOIN"] {
            assert!(names.contains(&name), "{name} missing");
        }
    }

    #[test]
    fn splitmix_is_deterministic_and_spreads() {
        assert_eq!(splitmix64(1), splitmix64(1));
        assert_ne!(splitmix64(1), splitmix64(2));
        assert_ne!(splitmix64(0), 0);
    }
}
