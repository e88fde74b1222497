//! Shared fixture for the integration suites: an in-memory sheet addressed
//! in A1 style, a scriptable clock and RNG, and shorthand builders for
//! expression trees (this crate takes resolved ASTs, not formula text).

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use sheetcalc::date::DateSystem;
use sheetcalc::eval::{CellContext, EvalContext};
use sheetcalc::functions::splitmix64;
use sheetcalc::locale::Culture;
use sheetcalc::refs::{parse_a1, parse_a1_range, Area, CellAddr, Reference, SheetId};
use sheetcalc::{evaluate, Expr, Scalar, Value};

pub const SHEET: SheetId = 0;

pub struct Sheet {
    cells: HashMap<CellAddr, Scalar>,
    pub culture: Culture,
    pub date_system: DateSystem,
    pub now: Option<DateTime<Utc>>,
    /// Scripted RNG draws consumed front to back; once exhausted, draws
    /// fall back to a deterministic counter-seeded sequence.
    pub draws: RefCell<Vec<u64>>,
    counter: Cell<u64>,
    pub links: RefCell<Vec<(String, String)>>,
}

impl Default for Sheet {
    fn default() -> Sheet {
        Sheet {
            cells: HashMap::new(),
            culture: Culture::en_us(),
            date_system: DateSystem::V1900,
            now: None,
            draws: RefCell::new(Vec::new()),
            counter: Cell::new(0),
            links: RefCell::new(Vec::new()),
        }
    }
}

impl Sheet {
    pub fn new() -> Sheet {
        Sheet::default()
    }

    pub fn set(&mut self, addr: &str, value: impl Into<Scalar>) {
        let addr = parse_a1(addr).expect("test cell address");
        self.cells.insert(addr, value.into());
    }

    /// Fills a column top to bottom starting at `addr`.
    pub fn set_column(&mut self, addr: &str, values: Vec<Scalar>) {
        let start = parse_a1(addr).expect("test cell address");
        for (i, value) in values.into_iter().enumerate() {
            self.cells
                .insert(CellAddr::new(start.row + i as u32, start.col), value);
        }
    }

    /// Fills a rectangular block row by row starting at `addr`.
    pub fn set_block(&mut self, addr: &str, rows: Vec<Vec<Scalar>>) {
        let start = parse_a1(addr).expect("test cell address");
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                self.cells
                    .insert(CellAddr::new(start.row + r as u32, start.col + c as u32), value);
            }
        }
    }

    /// Freezes the clock for TODAY/NOW/DATEVALUE tests.
    pub fn set_now(&mut self, year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) {
        self.now = Some(
            Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
                .single()
                .expect("test clock instant"),
        );
    }

    pub fn script_draws(&self, draws: &[u64]) {
        self.draws.borrow_mut().extend_from_slice(draws);
    }
}

impl CellContext for Sheet {
    fn get_cell_value(&self, sheet: SheetId, addr: CellAddr) -> Scalar {
        if sheet != SHEET {
            return Scalar::Blank;
        }
        self.cells.get(&addr).cloned().unwrap_or(Scalar::Blank)
    }

    fn culture(&self) -> Culture {
        self.culture
    }

    fn date_system(&self) -> DateSystem {
        self.date_system
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn volatile_rand_u64(&self) -> u64 {
        let mut draws = self.draws.borrow_mut();
        if draws.is_empty() {
            let n = self.counter.get();
            self.counter.set(n + 1);
            splitmix64(0x5EED ^ n)
        } else {
            draws.remove(0)
        }
    }

    fn register_hyperlink(&self, location: &str, friendly: &str) {
        self.links
            .borrow_mut()
            .push((location.to_string(), friendly.to_string()));
    }
}

/// Evaluates as if the formula sat in Z9, well away from the fixture data.
pub fn eval(sheet: &Sheet, expr: Expr) -> Value {
    eval_at(sheet, "Z9", expr)
}

pub fn eval_at(sheet: &Sheet, at: &str, expr: Expr) -> Value {
    let addr = parse_a1(at).expect("test cell address");
    evaluate(&expr, sheet, EvalContext::new(SHEET, addr))
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::call(name, args)
}

pub fn num(n: f64) -> Expr {
    Expr::Number(n)
}

pub fn text(s: &str) -> Expr {
    Expr::Text(s.to_string())
}

pub fn logical(b: bool) -> Expr {
    Expr::Logical(b)
}

/// `"A1"` or `"A1:B3"` as a resolved single-area reference expression.
pub fn range(a1: &str) -> Expr {
    Expr::Ref(reference(a1))
}

pub fn reference(a1: &str) -> Reference {
    let (start, end) = parse_a1_range(a1).expect("test range");
    Reference::single(Area::new(SHEET, start, end))
}

pub fn err(e: sheetcalc::ErrorKind) -> Value {
    Value::from(e)
}

pub fn n(value: f64) -> Value {
    Value::from(value)
}

pub fn t(value: &str) -> Value {
    Value::from(value)
}

pub fn scalars(ns: &[f64]) -> Vec<Scalar> {
    ns.iter().map(|&n| Scalar::Number(n)).collect()
}
