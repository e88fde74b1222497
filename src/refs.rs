//! Cell addresses, rectangular areas, and (possibly non-contiguous)
//! references. All coordinates are 0-indexed; Areas are plain value types
//! that name cells by coordinate only, so edits elsewhere never invalidate
//! a held Area.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::value::ErrorKind;

/// Worksheet identity, assigned by the host. The engine never interprets it
/// beyond equality.
pub type SheetId = usize;

pub const MAX_ROWS: u32 = 1_048_576;
pub const MAX_COLS: u32 = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddr {
    pub row: u32,
    pub col: u32,
}

impl CellAddr {
    pub fn new(row: u32, col: u32) -> CellAddr {
        CellAddr { row, col }
    }
}

impl fmt::Display for CellAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_label(self.col), self.row + 1)
    }
}

/// 0-indexed column number to its A1 letters (`0` → `A`, `27` → `AB`).
pub fn column_label(col: u32) -> String {
    let mut n = col + 1;
    let mut out = [0u8; 7];
    let mut len = 0;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out[len] = b'A' + rem;
        len += 1;
        n = (n - 1) / 26;
    }
    out[..len].iter().rev().map(|&b| b as char).collect()
}

/// One rectangular block of cells on a single sheet, normalized so
/// `start <= end` componentwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    pub sheet: SheetId,
    pub start: CellAddr,
    pub end: CellAddr,
}

impl Area {
    pub fn new(sheet: SheetId, a: CellAddr, b: CellAddr) -> Area {
        Area {
            sheet,
            start: CellAddr::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddr::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn cell(sheet: SheetId, addr: CellAddr) -> Area {
        Area {
            sheet,
            start: addr,
            end: addr,
        }
    }

    pub fn rows(&self) -> usize {
        (self.end.row - self.start.row + 1) as usize
    }

    pub fn cols(&self) -> usize {
        (self.end.col - self.start.col + 1) as usize
    }

    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, addr: CellAddr) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Address of the cell at a (row, col) offset from the top-left corner.
    /// Offsets must be in bounds; callers validate shape first.
    pub fn addr_at(&self, row_off: usize, col_off: usize) -> CellAddr {
        debug_assert!(row_off < self.rows() && col_off < self.cols());
        CellAddr::new(
            self.start.row + row_off as u32,
            self.start.col + col_off as u32,
        )
    }

    /// Row-major iteration over every address in the area.
    pub fn iter_addrs(&self) -> impl Iterator<Item = CellAddr> + '_ {
        let start = self.start;
        let cols = self.cols() as u32;
        (0..self.cell_count() as u32)
            .map(move |i| CellAddr::new(start.row + i / cols, start.col + i % cols))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// An ordered set of one or more areas treated as a single formula value.
/// Most operations require exactly one area; multi-area ("non-contiguous")
/// references are rejected at those sites with `#VALUE!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    areas: SmallVec<[Area; 1]>,
}

impl Reference {
    pub fn single(area: Area) -> Reference {
        Reference {
            areas: SmallVec::from_buf([area]),
        }
    }

    /// Panics on an empty area list; an empty reference cannot be produced
    /// by the grammar and indicates a collaborator bug.
    pub fn from_areas(areas: Vec<Area>) -> Reference {
        assert!(!areas.is_empty(), "reference must contain at least one area");
        Reference {
            areas: SmallVec::from_vec(areas),
        }
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn is_contiguous(&self) -> bool {
        self.areas.len() == 1
    }

    /// The one area of a contiguous reference, or `#VALUE!` for a union.
    pub fn single_area(&self) -> Result<Area, ErrorKind> {
        if self.areas.len() == 1 {
            Ok(self.areas[0])
        } else {
            Err(ErrorKind::Value)
        }
    }
}

impl From<Area> for Reference {
    fn from(area: Area) -> Reference {
        Reference::single(area)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("invalid A1 address: {0}")]
    InvalidA1(String),
    #[error("column out of range")]
    ColumnOutOfRange,
    #[error("row out of range")]
    RowOutOfRange,
}

/// Parse an A1-style address like `A1` or `$B$12` into a 0-indexed
/// [`CellAddr`].
pub fn parse_a1(input: &str) -> Result<CellAddr, AddressParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AddressParseError::InvalidA1(input.to_string()));
    }

    let mut chars = input.chars().peekable();
    if matches!(chars.peek(), Some('$')) {
        chars.next();
    }

    let mut col: u32 = 0;
    let mut col_len = 0;
    while let Some(ch) = chars.peek().copied() {
        if ch.is_ascii_alphabetic() {
            let digit = (ch.to_ascii_uppercase() as u8 - b'A' + 1) as u32;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .ok_or(AddressParseError::ColumnOutOfRange)?;
            col_len += 1;
            chars.next();
        } else {
            break;
        }
    }
    if col_len == 0 {
        return Err(AddressParseError::InvalidA1(input.to_string()));
    }

    if matches!(chars.peek(), Some('$')) {
        chars.next();
    }

    let mut row: u32 = 0;
    let mut row_len = 0;
    while let Some(ch) = chars.peek().copied() {
        if ch.is_ascii_digit() {
            row = row
                .checked_mul(10)
                .and_then(|v| v.checked_add((ch as u8 - b'0') as u32))
                .ok_or(AddressParseError::RowOutOfRange)?;
            row_len += 1;
            chars.next();
        } else {
            break;
        }
    }
    if row_len == 0 || chars.next().is_some() {
        return Err(AddressParseError::InvalidA1(input.to_string()));
    }

    if col == 0 || col > MAX_COLS {
        return Err(AddressParseError::ColumnOutOfRange);
    }
    if row == 0 || row > MAX_ROWS {
        return Err(AddressParseError::RowOutOfRange);
    }

    Ok(CellAddr::new(row - 1, col - 1))
}

/// Parse `A1` or `A1:B3` into normalized corner addresses.
pub fn parse_a1_range(input: &str) -> Result<(CellAddr, CellAddr), AddressParseError> {
    match input.split_once(':') {
        Some((a, b)) => {
            let start = parse_a1(a)?;
            let end = parse_a1(b)?;
            Ok((
                CellAddr::new(start.row.min(end.row), start.col.min(end.col)),
                CellAddr::new(start.row.max(end.row), start.col.max(end.col)),
            ))
        }
        None => {
            let addr = parse_a1(input)?;
            Ok((addr, addr))
        }
    }
}
