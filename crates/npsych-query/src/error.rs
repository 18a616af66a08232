//! Error types for the query interface.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The expression could not be planned or executed.
    #[error("query failed: {message}\n  query: {expression}")]
    Execution { expression: String, message: String },

    /// The data directory could not be listed.
    #[error("failed to scan data directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be loaded.
    #[error("failed to read {path}: {message}")]
    Artifact { path: PathBuf, message: String },
}

impl QueryError {
    /// Rewrites any error as an `Execution` error carrying the query text.
    pub(crate) fn for_expression(self, expression: &str) -> Self {
        match self {
            Self::Execution { .. } => self,
            other => Self::Execution {
                expression: expression.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// The query text, when the error came from running one.
    pub fn expression(&self) -> Option<&str> {
        match self {
            Self::Execution { expression, .. } => Some(expression),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
