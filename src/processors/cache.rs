use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::CanonicalDataset;
use crate::processors::Cleaner;
use crate::readers::{DirectoryLoader, SourceFingerprint};

/// Memoizes the canonical dataset per distinct input directory content.
///
/// The key is a fingerprint of the directory (file names, lengths,
/// modification times). Cleaning is the expensive step, so an unchanged
/// fingerprint short-circuits to the previously built dataset; anything else
/// rebuilds from scratch. Invalidation is explicit, never implicit.
pub struct DatasetCache {
    cached: Option<(SourceFingerprint, Arc<CanonicalDataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Return the canonical dataset for `dir`, building it at most once per
    /// distinct directory content
    pub fn load(&mut self, dir: &Path) -> Result<Arc<CanonicalDataset>> {
        let fingerprint = SourceFingerprint::scan(dir)?;

        if let Some((cached_fingerprint, dataset)) = &self.cached {
            if *cached_fingerprint == fingerprint {
                debug!("dataset cache hit");
                return Ok(Arc::clone(dataset));
            }
        }

        info!(dir = %dir.display(), "dataset cache miss, rebuilding");
        let raw = DirectoryLoader::new().load_directory(dir)?;
        let records = Cleaner::new().clean(raw)?;
        let dataset = Arc::new(CanonicalDataset::new(records));

        self.cached = Some((fingerprint, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached dataset; the next `load` rebuilds unconditionally
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}
