//! Array views: one indexed `(row, col)` interface over literal arrays,
//! scalars promoted to 1×1, live worksheet ranges, and transposed data.
//! Worksheet cells are read through the context on demand; nothing is
//! copied unless a real transform requires it.

use crate::eval::CellContext;
use crate::refs::Area;
use crate::value::{Array, ErrorKind, Scalar, Value};

#[derive(Clone)]
pub enum RangeView<'a> {
    /// An owned rectangular block (array literal or computed array).
    Cells(Array),
    /// A scalar acting as a 1×1 array; every in-range index yields it.
    Single(Scalar),
    /// A live worksheet range; each `at` is one context read.
    Sheet {
        cells: &'a dyn CellContext,
        area: Area,
    },
    Transposed(Box<RangeView<'a>>),
}

impl<'a> RangeView<'a> {
    /// View over an evaluated argument. Scalars promote to 1×1, arrays are
    /// taken as-is, contiguous references become live views; an error
    /// scalar or a non-contiguous reference refuses the conversion.
    pub fn from_value(
        value: Value,
        cells: &'a dyn CellContext,
    ) -> Result<RangeView<'a>, ErrorKind> {
        match value {
            Value::Scalar(Scalar::Error(e)) => Err(e),
            Value::Scalar(s) => Ok(RangeView::Single(s)),
            Value::Array(arr) => Ok(RangeView::Cells(arr)),
            Value::Reference(r) => {
                let area = r.single_area()?;
                Ok(RangeView::Sheet { cells, area })
            }
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            RangeView::Cells(arr) => arr.rows(),
            RangeView::Single(_) => 1,
            RangeView::Sheet { area, .. } => area.rows(),
            RangeView::Transposed(inner) => inner.cols(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            RangeView::Cells(arr) => arr.cols(),
            RangeView::Single(_) => 1,
            RangeView::Sheet { area, .. } => area.cols(),
            RangeView::Transposed(inner) => inner.rows(),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Value at a (row, col) position. Callers index within
    /// `rows() × cols()`; a `Single` view repeats its scalar at any index.
    pub fn at(&self, row: usize, col: usize) -> Scalar {
        match self {
            RangeView::Cells(arr) => arr.at(row, col).clone(),
            RangeView::Single(s) => s.clone(),
            RangeView::Sheet { cells, area } => {
                cells.get_cell_value(area.sheet, area.addr_at(row, col))
            }
            RangeView::Transposed(inner) => inner.at(col, row),
        }
    }

    /// Row-major linear index; the offset currency of the tally engine.
    pub fn at_offset(&self, offset: usize) -> Scalar {
        let cols = self.cols();
        self.at(offset / cols, offset % cols)
    }

    pub fn transposed(self) -> RangeView<'a> {
        match self {
            // Double transpose restores the original orientation.
            RangeView::Transposed(inner) => *inner,
            other => RangeView::Transposed(Box::new(other)),
        }
    }

    /// Row-major iteration over every element.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.cell_count()).map(|i| self.at_offset(i))
    }

    /// Backing area for live views; `None` for in-memory data.
    pub fn sheet_area(&self) -> Option<Area> {
        match self {
            RangeView::Sheet { area, .. } => Some(*area),
            _ => None,
        }
    }

    /// Materializes the view into an owned array.
    pub fn to_array(&self) -> Array {
        Array::new(self.rows(), self.cols(), self.iter().collect())
    }
}
