use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::models::CanonicalDataset;
use crate::processors::{DatasetCache, FilterParams};

/// One exploration session over a data directory.
///
/// Owns the dataset cache and the current filter selection. The dataset is
/// built at most once per distinct directory content; filter changes are
/// cheap and only affect what the next `filter_params` resolves to. Callers
/// re-apply the filter and re-run the analyzers after each change: explicit
/// recomputation, no reactive machinery. Clustering is an explicit command
/// elsewhere and holds no state here.
pub struct DashboardSession {
    data_dir: PathBuf,
    cache: DatasetCache,
    stations: Option<Vec<String>>,
    years: Option<(i32, i32)>,
}

impl DashboardSession {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: DatasetCache::new(),
            stations: None,
            years: None,
        }
    }

    /// The canonical dataset, built on first call and cached after
    pub fn dataset(&mut self) -> Result<Arc<CanonicalDataset>> {
        self.cache.load(&self.data_dir)
    }

    /// Restrict the selection to the given stations; `None` means all
    pub fn select_stations(&mut self, stations: Vec<String>) {
        debug!(count = stations.len(), "station selection changed");
        self.stations = Some(stations);
    }

    /// Restrict the selection to an inclusive year range. The caller's
    /// input validation guarantees `from <= to`.
    pub fn select_years(&mut self, from: i32, to: i32) {
        debug!(from, to, "year selection changed");
        self.years = Some((from, to));
    }

    /// Back to the defaults: all stations, full observed year range
    pub fn reset_selection(&mut self) {
        self.stations = None;
        self.years = None;
    }

    /// Resolve the current selection against a dataset, filling unset
    /// parts with the dataset's own bounds
    pub fn filter_params(&self, dataset: &CanonicalDataset) -> FilterParams {
        let stations = self
            .stations
            .clone()
            .unwrap_or_else(|| dataset.stations().to_vec());
        let (default_from, default_to) = dataset.year_bounds().unwrap_or((0, 0));
        let (from, to) = self.years.unwrap_or((default_from, default_to));
        FilterParams::new(stations, from, to)
    }

    /// Explicit cache invalidation: the next `dataset()` call rebuilds
    pub fn reload(&mut self) {
        self.cache.invalidate();
    }
}
