//! Error types for dataset persistence.

use std::path::PathBuf;

use npsych_model::{DatasetKind, OutputFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A single writer strategy failed. Caught by the chain.
    #[error("{writer} failed: {message}")]
    Writer {
        writer: &'static str,
        message: String,
    },

    /// Every strategy for a format failed.
    #[error("could not write {dataset} as {format}: {}", .attempts.join("; "))]
    FallbacksExhausted {
        dataset: DatasetKind,
        format: OutputFormat,
        attempts: Vec<String>,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write manifest: {message}")]
    Manifest { message: String },
}

impl PersistenceError {
    pub(crate) fn writer(writer: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Writer {
            writer,
            message: err.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
