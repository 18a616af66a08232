//! Error types for the transform stage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Percentile outside `[0, 100]` or not a number.
    #[error("percentile {value} is outside [0, 100]{}", describe_location(.row, .source_filename))]
    PercentileOutOfRange {
        value: f64,
        row: Option<usize>,
        source_filename: Option<String>,
    },

    /// A required column is absent from the frame.
    #[error("column {column} is missing")]
    MissingColumn { column: String },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

fn describe_location(row: &Option<usize>, source_filename: &Option<String>) -> String {
    match (row, source_filename) {
        (Some(row), Some(file)) => format!(" (row {row}, {file})"),
        (Some(row), None) => format!(" (row {row})"),
        (None, Some(file)) => format!(" ({file})"),
        (None, None) => String::new(),
    }
}

impl TransformError {
    /// True for rejected input values, as opposed to frame failures.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::PercentileOutOfRange { .. })
    }
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
