pub mod directory_loader;

pub use directory_loader::{DirectoryLoader, SourceFingerprint};
