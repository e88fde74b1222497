#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Formula evaluation for a spreadsheet engine: the value model, argument
//! coercion, signature-driven function dispatch, and the lookup/selection
//! algorithms behind `MATCH`, `VLOOKUP`, `XLOOKUP`, the `*IF(S)` family and
//! the database functions.
//!
//! Hosts hand the crate an already-resolved expression tree (references
//! arrive as sheet ids plus normalized areas, never as source text) and a
//! read-only [`CellContext`] for cell reads, culture, the date system, the
//! clock and the volatile RNG. Evaluation is synchronous, single-threaded
//! and pure; the one outward hook is `HYPERLINK`'s presentation callback.
//!
//! Errors are values: `#DIV/0!`, `#N/A` and friends flow through results as
//! [`Scalar::Error`], poison eager calls, and propagate out of ranges only
//! when the specific cell is actually read.
//!
//! Quirk fidelity matters more than elegance here. The bisection search
//! gives defined (tested) answers on never-sorted data, serial dates keep
//! the 1900 leap-day bug, and the legacy lookups enforce their 255-character
//! text limit. Hosts that round these corners off silently change the
//! results of real-world workbooks.

pub mod coerce;
pub mod date;
pub mod eval;
pub mod functions;
pub mod locale;
pub mod refs;
pub mod value;
pub mod view;

pub use eval::{evaluate, CellContext, EvalContext, Evaluator, Expr};
pub use value::{Array, ErrorKind, Scalar, Value};

/// Hard cap on the argument list of a single call.
pub const EXCEL_MAX_ARGS: usize = 255;
