//! Error types for score file ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering and reconciling source files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Input Errors ===
    /// Source directory does not exist or is not a directory.
    #[error("source directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Source directory holds no score files.
    #[error("no score files (*.csv, *.tsv) found in {path}")]
    NoSourceFiles { path: PathBuf },

    // === File System Errors ===
    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// The delimited reader rejected the file.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    /// True for the errors that mean the run has no usable input at all.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. } | Self::NoSourceFiles { .. }
        )
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::NoSourceFiles {
            path: PathBuf::from("/data/scores"),
        };
        assert_eq!(
            err.to_string(),
            "no score files (*.csv, *.tsv) found in /data/scores"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("percentile".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
        assert!(!ingest_err.is_input_error());
    }
}
