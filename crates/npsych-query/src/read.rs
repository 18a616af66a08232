//! Opens artifacts as lazy scans with the matching Polars reader.
//!
//! Nothing is read from disk until the plan is collected, so an artifact
//! that no query touches is never opened.

use std::path::Path;
use std::sync::Arc;

use csv::ReaderBuilder;
use npsych_model::{OutputFormat, is_numeric_column};
use polars::prelude::*;
use tracing::debug;

use crate::error::{QueryError, Result};

fn artifact_error(path: &Path, err: impl std::fmt::Display) -> QueryError {
    QueryError::Artifact {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Header row of a CSV artifact. Empty for an empty file.
fn csv_header(path: &Path) -> std::result::Result<Vec<String>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut record = csv::ByteRecord::new();
    if !reader.read_byte_record(&mut record)? {
        return Ok(Vec::new());
    }
    Ok(record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect())
}

/// Column types for a CSV artifact: `Float64` for score and statistic
/// columns. Everything else stays text so codes like `007` survive.
fn csv_dtype_overwrite(path: &Path) -> Option<SchemaRef> {
    let header = match csv_header(path) {
        Ok(header) => header,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "csv header unreadable");
            return None;
        }
    };
    let schema: Schema = header
        .iter()
        .filter(|name| is_numeric_column(name))
        .map(|name| Field::new(name.as_str().into(), DataType::Float64))
        .collect();
    if schema.is_empty() {
        None
    } else {
        Some(Arc::new(schema))
    }
}

/// Builds a lazy scan over a `.parquet`, `.feather`/`.arrow` or `.csv`
/// artifact.
pub fn scan_artifact(path: &Path) -> Result<LazyFrame> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(OutputFormat::from_extension)
        .ok_or_else(|| artifact_error(path, "unsupported artifact extension"))?;
    let pl_path = PlPath::new(&path.to_string_lossy());

    match format {
        OutputFormat::Csv => LazyCsvReader::new(pl_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_dtype_overwrite(csv_dtype_overwrite(path))
            .finish(),
        OutputFormat::Parquet => LazyFrame::scan_parquet(pl_path, ScanArgsParquet::default()),
        OutputFormat::Feather => LazyFrame::scan_ipc(pl_path, ScanArgsIpc::default()),
    }
    .map_err(|e| artifact_error(path, e))
}

/// Reads an artifact fully into memory.
pub fn read_artifact(path: &Path) -> Result<DataFrame> {
    scan_artifact(path)?
        .collect()
        .map_err(|e| artifact_error(path, e))
}
