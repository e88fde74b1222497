//! Approximate-match search shared by MATCH, VLOOKUP, HLOOKUP, LOOKUP and
//! the binary modes of XLOOKUP/XMATCH.
//!
//! This is not a textbook binary search. It stays deterministic on data
//! that was never sorted: values of a different type than the lookup value
//! are gaps (skipped, never compared), the boundary invariants are checked
//! up front instead of assumed, and a descending search whose bracket
//! closes without finding the target answers with its low bound instead of
//! rescanning. The tests at the bottom pin exact indices for unsorted
//! inputs; do not "repair" the algorithm without updating what callers
//! expect.

use std::cmp::Ordering;

use crate::locale::compare_text;
use crate::value::Scalar;
use crate::view::RangeView;

/// Which line of a two-dimensional view a lookup walks.
#[derive(Debug, Clone, Copy)]
pub enum LookupVector {
    Row(usize),
    Column(usize),
}

pub fn vector_len(view: &RangeView<'_>, vector: LookupVector) -> usize {
    match vector {
        LookupVector::Row(_) => view.cols(),
        LookupVector::Column(_) => view.rows(),
    }
}

pub fn vector_at(view: &RangeView<'_>, vector: LookupVector, index: usize) -> Scalar {
    match vector {
        LookupVector::Row(row) => view.at(row, index),
        LookupVector::Column(col) => view.at(index, col),
    }
}

/// Finds the index of the largest value `<=` the target when
/// `find_smaller_or_equal` is set (ascending data), or of the smallest
/// value `>=` the target otherwise (descending data). `None` means no
/// usable match, which callers report as `#N/A`.
pub fn bisection_search(
    view: &RangeView<'_>,
    vector: LookupVector,
    target: &Scalar,
    find_smaller_or_equal: bool,
) -> Option<usize> {
    let len = vector_len(view, vector);
    let value_at = |i: usize| vector_at(view, vector, i);

    let mut low = (0..len).find(|&i| same_type(&value_at(i), target))?;
    let mut high = (low..len).rev().find(|&i| same_type(&value_at(i), target))?;

    if find_smaller_or_equal {
        if cmp_same_type(&value_at(low), target) == Ordering::Greater {
            return None;
        }
        if cmp_same_type(&value_at(high), target) != Ordering::Greater {
            return Some(high);
        }
        while let Some(mid) = find_middle(&value_at, target, low, high) {
            match cmp_same_type(&value_at(mid), target) {
                Ordering::Greater => high = mid,
                // <= keeps moving low forward, so a run of equal values
                // converges on its last element.
                _ => low = mid,
            }
        }
        Some(low)
    } else {
        if cmp_same_type(&value_at(low), target) == Ordering::Less {
            return None;
        }
        if cmp_same_type(&value_at(high), target) == Ordering::Greater {
            return Some(high);
        }
        while let Some(mid) = find_middle(&value_at, target, low, high) {
            match cmp_same_type(&value_at(mid), target) {
                Ordering::Greater => low = mid,
                Ordering::Equal => high = mid,
                // Below-target values shrink the bracket from the high
                // side; on out-of-order data this strands the search at
                // its low bound instead of scanning on.
                Ordering::Less => high = mid,
            }
        }
        if cmp_same_type(&value_at(high), target) == Ordering::Equal {
            Some(high)
        } else {
            Some(low)
        }
    }
}

/// Midpoint between `low` and `high`, nudged off type-mismatched cells.
/// Tries the low side first, staying strictly inside the bracket; `None`
/// once the bracket is closed or holds nothing comparable.
fn find_middle(
    value_at: &impl Fn(usize) -> Scalar,
    target: &Scalar,
    low: usize,
    high: usize,
) -> Option<usize> {
    if high - low < 2 {
        return None;
    }
    let naive = low + (high - low) / 2;
    if same_type(&value_at(naive), target) {
        return Some(naive);
    }
    if let Some(i) = (low + 1..naive)
        .rev()
        .find(|&i| same_type(&value_at(i), target))
    {
        return Some(i);
    }
    (naive + 1..high).find(|&i| same_type(&value_at(i), target))
}

fn same_type(candidate: &Scalar, target: &Scalar) -> bool {
    matches!(
        (candidate, target),
        (Scalar::Number(_), Scalar::Number(_))
            | (Scalar::Text(_), Scalar::Text(_))
            | (Scalar::Logical(_), Scalar::Logical(_))
    )
}

fn cmp_same_type(candidate: &Scalar, target: &Scalar) -> Ordering {
    match (candidate, target) {
        (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Scalar::Text(a), Scalar::Text(b)) => compare_text(a, b),
        (Scalar::Logical(a), Scalar::Logical(b)) => a.cmp(b),
        _ => unreachable!("gaps are filtered before comparison"),
    }
}
