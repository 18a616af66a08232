//! Delimited score file reading.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::warn;

use crate::discovery::Delimiter;
use crate::error::{IngestError, Result};

/// One instrument export as read from disk: header row plus text cells.
///
/// Empty cells are `None`. Rows are padded or truncated to the header width.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ScoreTable {
    /// File name recorded in the `source_filename` lineage column.
    pub fn source_filename(&self) -> String {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Index of the first header with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads a score file. The delimiter follows the file extension and
/// defaults to comma.
pub fn read_score_file(path: &Path) -> Result<ScoreTable> {
    let delimiter = Delimiter::from_path(path).unwrap_or(Delimiter::Comma);
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.iter().all(String::is_empty) {
        warn!(path = %path.display(), "score file has no header row");
        return Ok(ScoreTable {
            path: path.to_path_buf(),
            headers: Vec::new(),
            rows: Vec::new(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let row: Vec<Option<String>> = (0..headers.len())
            .map(|idx| record.get(idx).and_then(normalize_cell))
            .collect();
        if row.iter().all(Option::is_none) {
            continue;
        }
        rows.push(row);
    }

    Ok(ScoreTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}
