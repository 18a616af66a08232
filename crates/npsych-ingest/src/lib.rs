//! Score file ingestion.
//!
//! This crate discovers per-instrument score exports in a directory, reads
//! them as delimited text, and reconciles their differing column sets into a
//! single Polars DataFrame.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use npsych_ingest::reconcile_directory;
//!
//! let reconciled = reconcile_directory(Path::new("data/patient01"))?;
//! println!("{} records, {} columns", reconciled.record_count(), reconciled.schema.len());
//! ```

mod discovery;
mod error;
mod reader;
mod reconcile;

// === Error Types ===
pub use error::{IngestError, Result};

// === File Discovery ===
pub use discovery::{Delimiter, list_score_files};

// === Reading ===
pub use reader::{ScoreTable, read_score_file};

// === Reconciliation ===
pub use reconcile::{
    CoercionReport, Reconciled, SourceFileSummary, reconcile_directory, reconcile_tables,
};
