use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExplorerError>;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Data directory not found: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("Data directory contains no station files: {}", path.display())]
    EmptySource { path: PathBuf },

    #[error("File '{file}' is missing required column '{column}'")]
    SchemaMismatch { file: String, column: String },

    #[error("Invalid timestamp in '{file}' at row {row}: {year:04}-{month:02}-{day:02} hour {hour}")]
    InvalidTimestamp {
        file: String,
        row: usize,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Clustering error: {0}")]
    Clustering(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
