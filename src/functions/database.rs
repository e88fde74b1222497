//! Shared machinery for the DSUM family: a database range whose first row
//! is headers, filtered through a criteria table whose rows OR together
//! while the cells within one row AND together. Each criteria cell goes
//! through the same `Criteria` parser the *IF functions use.

use crate::coerce::to_text;
use crate::locale::{text_eq, Culture};
use crate::value::{ErrorKind, Scalar};
use crate::view::RangeView;

use super::criteria::Criteria;
use super::tally::Tally;

pub struct Database<'v> {
    view: RangeView<'v>,
}

impl<'v> Database<'v> {
    pub fn new(view: RangeView<'v>) -> Database<'v> {
        Database { view }
    }

    pub fn record_count(&self) -> usize {
        self.view.rows() - 1
    }

    pub fn field_value(&self, record: usize, field: usize) -> Scalar {
        self.view.at(record + 1, field)
    }

    /// Resolves the `field` argument: a 1-based column number, or header
    /// text matched case-insensitively.
    pub fn field_index(&self, selector: &Scalar, culture: &Culture) -> Result<usize, ErrorKind> {
        match selector {
            Scalar::Number(n) => {
                let index = *n as i64;
                if index >= 1 && index as usize <= self.view.cols() {
                    Ok(index as usize - 1)
                } else {
                    Err(ErrorKind::Value)
                }
            }
            Scalar::Text(_) => self
                .find_field_by_header(selector, culture)
                .ok_or(ErrorKind::Value),
            Scalar::Error(e) => Err(*e),
            _ => Err(ErrorKind::Value),
        }
    }

    fn find_field_by_header(&self, header: &Scalar, culture: &Culture) -> Option<usize> {
        let name = to_text(header, culture).ok()?;
        (0..self.view.cols()).find(|&col| {
            to_text(&self.view.at(0, col), culture).map_or(false, |h| text_eq(&h, &name))
        })
    }
}

/// A parsed criteria table. Blank criteria cells impose no constraint; a
/// criteria row with no constraints left matches every record.
pub struct CriteriaTable {
    rows: Vec<Vec<RecordCriterion>>,
}

struct RecordCriterion {
    // None when the criteria header names no database column; such a
    // constraint can never be satisfied.
    field: Option<usize>,
    criteria: Criteria,
}

impl CriteriaTable {
    pub fn new(
        view: &RangeView<'_>,
        db: &Database<'_>,
        culture: &Culture,
    ) -> Result<CriteriaTable, ErrorKind> {
        if view.rows() < 2 {
            return Err(ErrorKind::Value);
        }
        let mut rows = Vec::with_capacity(view.rows() - 1);
        for row in 1..view.rows() {
            let mut cells = Vec::new();
            for col in 0..view.cols() {
                let criterion = view.at(row, col);
                if matches!(criterion, Scalar::Blank) {
                    continue;
                }
                cells.push(RecordCriterion {
                    field: db.find_field_by_header(&view.at(0, col), culture),
                    criteria: Criteria::create(&criterion, culture),
                });
            }
            rows.push(cells);
        }
        Ok(CriteriaTable { rows })
    }

    pub fn matches_record(&self, db: &Database<'_>, record: usize) -> bool {
        self.rows.iter().any(|cells| {
            cells.iter().all(|cell| match cell.field {
                Some(field) => cell.criteria.matches(&db.field_value(record, field)),
                None => false,
            })
        })
    }
}

pub fn matching_records<'a>(
    db: &'a Database<'_>,
    criteria: &'a CriteriaTable,
) -> impl Iterator<Item = usize> + 'a {
    (0..db.record_count()).filter(move |&record| criteria.matches_record(db, record))
}

/// Folds the numeric field values of matching records. Non-numeric fields
/// are skipped; an error cell in a matching record propagates.
pub fn fold_fields(
    db: &Database<'_>,
    criteria: &CriteriaTable,
    field: usize,
    tally: &mut dyn Tally,
) -> Result<(), ErrorKind> {
    for record in matching_records(db, criteria) {
        match db.field_value(record, field) {
            Scalar::Number(n) => tally.fold(n),
            Scalar::Error(e) => return Err(e),
            _ => {}
        }
    }
    Ok(())
}
