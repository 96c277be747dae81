use std::collections::HashSet;

use crate::models::{CanonicalDataset, CanonicalRecord};

/// Current station-set and year-range selection.
///
/// The range is inclusive on both ends; the range picker guarantees
/// `year_from <= year_to` before this type is constructed. An empty station
/// set is a valid selection that yields an empty subset.
#[derive(Debug, Clone)]
pub struct FilterParams {
    stations: HashSet<String>,
    year_from: i32,
    year_to: i32,
}

impl FilterParams {
    pub fn new(stations: impl IntoIterator<Item = String>, year_from: i32, year_to: i32) -> Self {
        Self {
            stations: stations.into_iter().collect(),
            year_from,
            year_to,
        }
    }

    /// Default selection: every discovered station over the full observed
    /// year range, which returns the entire dataset
    pub fn for_dataset(dataset: &CanonicalDataset) -> Self {
        let (year_from, year_to) = dataset.year_bounds().unwrap_or((0, 0));
        Self::new(dataset.stations().iter().cloned(), year_from, year_to)
    }

    pub fn year_range(&self) -> (i32, i32) {
        (self.year_from, self.year_to)
    }

    pub fn stations(&self) -> &HashSet<String> {
        &self.stations
    }

    fn matches(&self, record: &CanonicalRecord) -> bool {
        self.stations.contains(&record.station)
            && record.year >= self.year_from
            && record.year <= self.year_to
    }

    /// Pure projection of the canonical dataset onto the current selection.
    /// Borrows the dataset's rows; safe to recompute on every parameter
    /// change without touching the dataset itself.
    pub fn apply<'a>(&self, dataset: &'a CanonicalDataset) -> WorkingSubset<'a> {
        let rows = dataset
            .records()
            .iter()
            .filter(|record| self.matches(record))
            .collect();
        WorkingSubset { rows }
    }
}

/// The canonical dataset restricted to the current filter selection: a view
/// of borrowed rows, rebuilt on each parameter change, never mutated.
#[derive(Debug)]
pub struct WorkingSubset<'a> {
    rows: Vec<&'a CanonicalRecord>,
}

impl<'a> WorkingSubset<'a> {
    pub fn rows(&self) -> &[&'a CanonicalRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
