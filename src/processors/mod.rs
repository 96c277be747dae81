pub mod cache;
pub mod cleaner;
pub mod filter;

pub use cache::DatasetCache;
pub use cleaner::Cleaner;
pub use filter::{FilterParams, WorkingSubset};
