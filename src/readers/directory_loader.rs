use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{ExplorerError, Result};
use crate::models::RawRecord;
use crate::utils::constants::{DATA_FILE_EXTENSION, REQUIRED_COLUMNS};

/// Loads every station file in a directory into one concatenated record set.
///
/// Files are discovered in file-name order so that concatenation order, and
/// with it everything the cleaner derives from row position, is
/// deterministic across runs.
pub struct DirectoryLoader;

impl DirectoryLoader {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate the station files directly inside `dir`, sorted by name
    pub fn discover_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ExplorerError::MissingSource {
                path: dir.to_path_buf(),
            });
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(DATA_FILE_EXTENSION))
            })
            .collect();

        files.sort();

        if files.is_empty() {
            return Err(ExplorerError::EmptySource {
                path: dir.to_path_buf(),
            });
        }

        Ok(files)
    }

    /// Read all station files and concatenate them, preserving row order
    /// within each file and discovery order across files
    pub fn load_directory(&self, dir: &Path) -> Result<Vec<RawRecord>> {
        let files = self.discover_files(dir)?;
        let mut records = Vec::new();

        for path in &files {
            let file_records = self.load_file(path)?;
            debug!(
                file = %path.display(),
                rows = file_records.len(),
                "loaded station file"
            );
            records.extend(file_records);
        }

        info!(files = files.len(), rows = records.len(), "loaded data directory");
        Ok(records)
    }

    /// Read one station file, validating its schema and timestamps
    pub fn load_file(&self, path: &Path) -> Result<Vec<RawRecord>> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        let mut reader = csv::Reader::from_path(path)?;
        self.check_schema(&mut reader, &file_name)?;

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<RawRecord>().enumerate() {
            let record = row?;

            // The four time components must form a valid calendar timestamp
            let valid = NaiveDate::from_ymd_opt(record.year, record.month, record.day)
                .and_then(|date| date.and_hms_opt(record.hour, 0, 0))
                .is_some();
            if !valid {
                return Err(ExplorerError::InvalidTimestamp {
                    file: file_name,
                    row: index + 1,
                    year: record.year,
                    month: record.month,
                    day: record.day,
                    hour: record.hour,
                });
            }

            records.push(record);
        }

        Ok(records)
    }

    fn check_schema(&self, reader: &mut csv::Reader<File>, file: &str) -> Result<()> {
        let headers = reader.headers()?;
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(ExplorerError::SchemaMismatch {
                    file: file.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for DirectoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Content identity of an input directory: sorted file names with their
/// lengths and modification times. Two scans compare equal exactly when the
/// canonical dataset built from them would be identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    entries: Vec<(String, u64, SystemTime)>,
}

impl SourceFingerprint {
    pub fn scan(dir: &Path) -> Result<Self> {
        let files = DirectoryLoader::new().discover_files(dir)?;
        let mut entries = Vec::with_capacity(files.len());

        for path in files {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            let metadata = fs::metadata(&path)?;
            entries.push((name, metadata.len(), metadata.modified()?));
        }

        Ok(Self { entries })
    }
}
