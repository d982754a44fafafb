//! Row filtering driven by the filter dropdown and range slider.
//!
//! The meaning of a range depends on the filtered column's type: a closed
//! float interval, a closed integer interval, or a set of positions into the
//! column's sorted distinct values for text columns.

use crate::data::{ColumnData, Table};
use std::collections::{BTreeSet, HashSet};

/// Slider/selection state for the filter column
#[derive(Debug, Clone, PartialEq)]
pub enum FilterRange {
    /// The two handles of a range slider
    Bounds(f64, f64),
    /// An explicit set of category indices
    Indices(BTreeSet<usize>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub range: FilterRange,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, range: FilterRange) -> Self {
        Self {
            column: column.into(),
            range,
        }
    }
}

/// A filtered, reindexed view of a table. `rows[i]` is the position in the
/// source table of output row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTable {
    pub table: Table,
    pub rows: Vec<usize>,
}

impl FilteredTable {
    pub fn unfiltered(table: &Table) -> Self {
        Self {
            table: table.clone(),
            rows: (0..table.n_rows()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Apply an optional filter. Anything that cannot be interpreted leaves the
/// table unfiltered.
pub fn filter(table: &Table, spec: Option<&FilterSpec>) -> FilteredTable {
    let Some(spec) = spec else {
        return FilteredTable::unfiltered(table);
    };

    match matching_rows(table, spec) {
        Some(rows) => {
            log::debug!(
                "Filter on '{}' kept {} of {} rows",
                spec.column,
                rows.len(),
                table.n_rows()
            );
            FilteredTable {
                table: table.take(&rows),
                rows,
            }
        }
        None => {
            log::warn!("Ignoring filter on '{}': {:?}", spec.column, spec.range);
            FilteredTable::unfiltered(table)
        }
    }
}

fn matching_rows(table: &Table, spec: &FilterSpec) -> Option<Vec<usize>> {
    let column = table.column(&spec.column)?;

    match &column.data {
        ColumnData::Float(values) => {
            let (lo, hi) = numeric_bounds(&spec.range)?;
            Some(positions(values, |v| lo <= *v && *v <= hi))
        }
        ColumnData::Int(values) => {
            let (lo, hi) = numeric_bounds(&spec.range)?;
            let (lo, hi) = (lo.round() as i64, hi.round() as i64);
            Some(positions(values, |v| lo <= *v && *v <= hi))
        }
        ColumnData::Text(values) => {
            let categories = column.distinct_sorted();
            let indices: BTreeSet<usize> = match &spec.range {
                FilterRange::Bounds(lo, hi) => {
                    if !(lo.is_finite() && hi.is_finite()) || *lo < 0.0 || *hi < 0.0 {
                        return None;
                    }
                    [lo.round() as usize, hi.round() as usize].into_iter().collect()
                }
                FilterRange::Indices(set) => set.clone(),
            };
            if indices.is_empty() || indices.iter().any(|&i| i >= categories.len()) {
                return None;
            }
            let wanted: HashSet<&str> = indices.iter().map(|&i| categories[i].as_str()).collect();
            Some(positions(values, |v| wanted.contains(v.as_str())))
        }
    }
}

/// Normalised `(lo, hi)` for numeric columns
fn numeric_bounds(range: &FilterRange) -> Option<(f64, f64)> {
    let (a, b) = match range {
        FilterRange::Bounds(a, b) => (*a, *b),
        FilterRange::Indices(set) => {
            let first = *set.iter().next()?;
            let last = *set.iter().next_back()?;
            (first as f64, last as f64)
        }
    };
    if a.is_nan() || b.is_nan() {
        return None;
    }
    Some((a.min(b), a.max(b)))
}

fn positions<T>(values: &[Option<T>], keep: impl Fn(&T) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.as_ref().filter(|v| keep(v)).map(|_| i))
        .collect()
}
