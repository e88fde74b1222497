//! Multi-criteria tallying behind SUMIFS, COUNTIFS, AVERAGEIFS, MINIFS and
//! MAXIFS. Every criteria range yields a lazy, ascending sequence of
//! matching cell offsets (row-major, relative to its own origin); a k-way
//! "advance the minimum" merge intersects the sequences, and each surviving
//! offset samples the value range(s). Memory stays proportional to the
//! match count, never the range size.

use std::iter::Peekable;

use crate::locale::Culture;
use crate::value::{ErrorKind, Scalar};
use crate::view::RangeView;

use super::criteria::Criteria;

/// One criteria range paired with its parsed criterion.
pub struct CriteriaRange<'v> {
    view: RangeView<'v>,
    criteria: Criteria,
}

impl<'v> CriteriaRange<'v> {
    pub fn new(view: RangeView<'v>, criterion: &Scalar, culture: &Culture) -> CriteriaRange<'v> {
        CriteriaRange {
            view,
            criteria: Criteria::create(criterion, culture),
        }
    }

    fn matching_offsets(&self) -> MatchingOffsets<'_, 'v> {
        MatchingOffsets {
            range: self,
            next_offset: 0,
        }
    }
}

/// Lazy ascending offsets of the cells a criterion accepts.
struct MatchingOffsets<'a, 'v> {
    range: &'a CriteriaRange<'v>,
    next_offset: usize,
}

impl Iterator for MatchingOffsets<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let count = self.range.view.cell_count();
        while self.next_offset < count {
            let offset = self.next_offset;
            self.next_offset += 1;
            if self.range.criteria.matches(&self.range.view.at_offset(offset)) {
                return Some(offset);
            }
        }
        None
    }
}

/// Intersection of all offset sequences: a candidate offset is raised to
/// the largest head seen, every cursor is advanced up to it, and the
/// offset is produced only once all cursors agree.
struct MergedOffsets<'a, 'v> {
    cursors: Vec<Peekable<MatchingOffsets<'a, 'v>>>,
}

impl Iterator for MergedOffsets<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursors.is_empty() {
            return None;
        }
        let mut candidate = *self.cursors[0].peek()?;
        loop {
            let mut all_agree = true;
            for cursor in &mut self.cursors {
                while *cursor.peek()? < candidate {
                    cursor.next();
                }
                let head = *cursor.peek()?;
                if head > candidate {
                    candidate = head;
                    all_agree = false;
                }
            }
            if all_agree {
                for cursor in &mut self.cursors {
                    cursor.next();
                }
                return Some(candidate);
            }
        }
    }
}

fn merged<'a, 'v>(ranges: &'a [CriteriaRange<'v>]) -> MergedOffsets<'a, 'v> {
    MergedOffsets {
        cursors: ranges.iter().map(|r| r.matching_offsets().peekable()).collect(),
    }
}

/// Every range in one call, criteria and value ranges alike, must span the
/// same rows and columns; checked before any cell is read.
fn check_congruent(values: &[RangeView<'_>], criteria: &[CriteriaRange<'_>]) -> Result<(), ErrorKind> {
    let mut shapes = values
        .iter()
        .map(RangeView::shape)
        .chain(criteria.iter().map(|r| r.view.shape()));
    let Some(first) = shapes.next() else {
        return Ok(());
    };
    if shapes.all(|shape| shape == first) {
        Ok(())
    } else {
        Err(ErrorKind::Value)
    }
}

/// Counts offsets matching every criterion; COUNTIFS.
pub fn count_matching(criteria: &[CriteriaRange<'_>]) -> Result<usize, ErrorKind> {
    check_congruent(&[], criteria)?;
    Ok(merged(criteria).count())
}

/// Samples every value range at each surviving offset and folds numbers
/// into the accumulator. Non-numeric samples are skipped; a sampled error
/// cell propagates.
pub fn fold_matching(
    values: &[RangeView<'_>],
    criteria: &[CriteriaRange<'_>],
    tally: &mut dyn Tally,
) -> Result<(), ErrorKind> {
    check_congruent(values, criteria)?;
    for offset in merged(criteria) {
        for view in values {
            match view.at_offset(offset) {
                Scalar::Number(n) => tally.fold(n),
                Scalar::Error(e) => return Err(e),
                _ => {}
            }
        }
    }
    Ok(())
}

/// A fold over sampled numbers. One instance lives for one call.
pub trait Tally {
    fn fold(&mut self, sample: f64);
    fn finish(&self) -> Result<f64, ErrorKind>;
}

#[derive(Default)]
pub struct Sum {
    total: f64,
}

impl Tally for Sum {
    fn fold(&mut self, sample: f64) {
        self.total += sample;
    }

    fn finish(&self) -> Result<f64, ErrorKind> {
        Ok(self.total)
    }
}

#[derive(Default)]
pub struct Average {
    total: f64,
    count: usize,
}

impl Tally for Average {
    fn fold(&mut self, sample: f64) {
        self.total += sample;
        self.count += 1;
    }

    fn finish(&self) -> Result<f64, ErrorKind> {
        if self.count == 0 {
            return Err(ErrorKind::Div0);
        }
        Ok(self.total / self.count as f64)
    }
}

pub struct Extreme {
    best: Option<f64>,
    prefer_max: bool,
}

impl Extreme {
    pub fn min() -> Extreme {
        Extreme {
            best: None,
            prefer_max: false,
        }
    }

    pub fn max() -> Extreme {
        Extreme {
            best: None,
            prefer_max: true,
        }
    }
}

impl Tally for Extreme {
    fn fold(&mut self, sample: f64) {
        self.best = Some(match self.best {
            None => sample,
            Some(best) if self.prefer_max => best.max(sample),
            Some(best) => best.min(sample),
        });
    }

    // MINIFS and MAXIFS report 0 when nothing matched.
    fn finish(&self) -> Result<f64, ErrorKind> {
        Ok(self.best.unwrap_or(0.0))
    }
}

#[derive(Default)]
pub struct Product {
    product: f64,
    any: bool,
}

impl Tally for Product {
    fn fold(&mut self, sample: f64) {
        if self.any {
            self.product *= sample;
        } else {
            self.product = sample;
            self.any = true;
        }
    }

    fn finish(&self) -> Result<f64, ErrorKind> {
        Ok(if self.any { self.product } else { 0.0 })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SpreadMode {
    SampleVariance,
    PopulationVariance,
    SampleStdDev,
    PopulationStdDev,
}

/// Welford's online variance; shared by the STDEV/VAR family and kept
/// here with the other fold state machines.
pub struct Spread {
    mode: SpreadMode,
    count: f64,
    mean: f64,
    m2: f64,
}

impl Spread {
    pub fn new(mode: SpreadMode) -> Spread {
        Spread {
            mode,
            count: 0.0,
            mean: 0.0,
            m2: 0.0,
        }
    }
}

impl Tally for Spread {
    fn fold(&mut self, sample: f64) {
        self.count += 1.0;
        let delta = sample - self.mean;
        self.mean += delta / self.count;
        self.m2 += delta * (sample - self.mean);
    }

    fn finish(&self) -> Result<f64, ErrorKind> {
        let sample_based = matches!(
            self.mode,
            SpreadMode::SampleVariance | SpreadMode::SampleStdDev
        );
        let denominator = if sample_based {
            self.count - 1.0
        } else {
            self.count
        };
        if denominator < 1.0 {
            return Err(ErrorKind::Div0);
        }
        let variance = self.m2 / denominator;
        Ok(match self.mode {
            SpreadMode::SampleVariance | SpreadMode::PopulationVariance => variance,
            SpreadMode::SampleStdDev | SpreadMode::PopulationStdDev => variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Array;

    fn column(values: Vec<Scalar>) -> RangeView<'static> {
        let rows = values.len();
        RangeView::Cells(Array::new(rows, 1, values))
    }

    fn nums(ns: &[f64]) -> Vec<Scalar> {
        ns.iter().map(|&n| Scalar::Number(n)).collect()
    }

    fn texts(ts: &[&str]) -> Vec<Scalar> {
        ts.iter().map(|t| Scalar::Text(t.to_string())).collect()
    }

    fn crit<'v>(view: RangeView<'v>, criterion: &str) -> CriteriaRange<'v> {
        CriteriaRange::new(
            view,
            &Scalar::Text(criterion.to_string()),
            &Culture::en_us(),
        )
    }

    #[test]
    fn count_intersects_all_criteria() {
        let ranges = vec![
            crit(column(nums(&[1.0, 2.0, 3.0, 4.0])), ">1"),
            crit(column(texts(&["a", "b", "a", "a"])), "a"),
        ];
        assert_eq!(count_matching(&ranges), Ok(2));
    }

    #[test]
    fn mismatched_shapes_fail_before_any_read() {
        let values = [column(vec![
            Scalar::Number(1.0),
            Scalar::Error(ErrorKind::Div0),
            Scalar::Number(3.0),
            Scalar::Number(4.0),
            Scalar::Number(5.0),
        ])];
        let ranges = vec![crit(column(nums(&[1.0, 2.0, 3.0, 4.0])), ">0")];
        let mut sum = Sum::default();
        // Shape error wins over the error cell the sum would have hit.
        assert_eq!(fold_matching(&values, &ranges, &mut sum), Err(ErrorKind::Value));
    }

    #[test]
    fn fold_sums_only_surviving_offsets() {
        let values = [column(nums(&[10.0, 20.0, 30.0, 40.0]))];
        let ranges = vec![
            crit(column(nums(&[1.0, 2.0, 3.0, 4.0])), ">=2"),
            crit(column(texts(&["x", "y", "y", "y"])), "y"),
        ];
        let mut sum = Sum::default();
        fold_matching(&values, &ranges, &mut sum).unwrap();
        assert_eq!(sum.finish(), Ok(90.0));
    }

    #[test]
    fn non_numeric_samples_are_skipped() {
        let values = [column(vec![
            Scalar::Text("a".to_string()),
            Scalar::Number(5.0),
            Scalar::Logical(true),
            Scalar::Blank,
        ])];
        let ranges = vec![crit(column(nums(&[1.0, 1.0, 1.0, 1.0])), "1")];
        let mut sum = Sum::default();
        fold_matching(&values, &ranges, &mut sum).unwrap();
        assert_eq!(sum.finish(), Ok(5.0));
    }

    #[test]
    fn sampled_error_cells_propagate() {
        let values = [column(vec![
            Scalar::Number(1.0),
            Scalar::Error(ErrorKind::NA),
        ])];
        let ranges = vec![crit(column(nums(&[1.0, 2.0])), ">0")];
        let mut sum = Sum::default();
        assert_eq!(fold_matching(&values, &ranges, &mut sum), Err(ErrorKind::NA));
    }

    #[test]
    fn average_of_nothing_is_div0() {
        assert_eq!(Average::default().finish(), Err(ErrorKind::Div0));
    }

    #[test]
    fn extremes_of_nothing_are_zero() {
        assert_eq!(Extreme::min().finish(), Ok(0.0));
        assert_eq!(Extreme::max().finish(), Ok(0.0));
    }

    #[test]
    fn spread_matches_known_values() {
        let mut pop = Spread::new(SpreadMode::PopulationStdDev);
        for n in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            pop.fold(n);
        }
        assert!((pop.finish().unwrap() - 2.0).abs() < 1e-12);

        let mut sample = Spread::new(SpreadMode::SampleVariance);
        for n in [1.0, 2.0, 3.0, 4.0] {
            sample.fold(n);
        }
        let got = sample.finish().unwrap();
        assert!((got - 5.0 / 3.0).abs() < 1e-12);

        assert_eq!(
            Spread::new(SpreadMode::SampleVariance).finish(),
            Err(ErrorKind::Div0)
        );
    }
}
