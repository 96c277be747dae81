pub mod dataset;
pub mod record;

pub use dataset::CanonicalDataset;
pub use record::{CanonicalRecord, NumericColumn, RawRecord};
