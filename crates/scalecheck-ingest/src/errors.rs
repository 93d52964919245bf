use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while reading or cleaning a response file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("table error: {0}")]
    Table(#[from] scalecheck_core::Error),
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
