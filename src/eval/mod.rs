pub mod ast;
pub mod evaluator;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use evaluator::{compare_scalars, evaluate, Evaluator};

use chrono::{DateTime, Utc};

use crate::date::DateSystem;
use crate::locale::Culture;
use crate::refs::{CellAddr, SheetId};
use crate::value::Scalar;

/// Read-only contract the host supplies for one evaluation. Cell reads are
/// synchronous and never fail at this boundary; a sheet/address the host
/// cannot resolve yields `Scalar::Blank` or an error scalar, at the host's
/// discretion. A host that hands back malformed data (for an address inside
/// an Area it produced itself) is a programming error and may panic the
/// evaluation.
pub trait CellContext {
    fn get_cell_value(&self, sheet: SheetId, addr: CellAddr) -> Scalar;

    fn sheet_exists(&self, _sheet: SheetId) -> bool {
        true
    }

    fn culture(&self) -> Culture {
        Culture::en_us()
    }

    fn date_system(&self) -> DateSystem {
        DateSystem::V1900
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// One draw of the volatile RNG backing `RAND`/`RANDBETWEEN`. The
    /// default is process-seeded; hosts override it for deterministic
    /// recalculation tests.
    fn volatile_rand_u64(&self) -> u64 {
        crate::functions::process_rand_u64()
    }

    fn volatile_rand(&self) -> f64 {
        let bits = self.volatile_rand_u64() >> 11; // 53 bits.
        (bits as f64) / (1u64 << 53) as f64
    }

    /// Presentation-state hook for `HYPERLINK`; never affects computation.
    fn register_hyperlink(&self, _location: &str, _friendly: &str) {}
}

/// Where the formula being evaluated lives; drives implicit intersection
/// and the `ROW()`/`COLUMN()` zero-argument forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalContext {
    pub current_sheet: SheetId,
    pub current_cell: CellAddr,
}

impl EvalContext {
    pub fn new(current_sheet: SheetId, current_cell: CellAddr) -> EvalContext {
        EvalContext {
            current_sheet,
            current_cell,
        }
    }
}
