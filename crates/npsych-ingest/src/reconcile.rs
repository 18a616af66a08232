//! Union-of-columns schema reconciliation.
//!
//! Every discovered file contributes its header to a single
//! [`ReconciledSchema`]. Rows are then materialized against that schema so
//! each record carries every column, with nulls where its file lacked one.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use npsych_model::{ColumnKind, ReconciledSchema, SOURCE_FILENAME, parse_f64};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use tracing::{debug, info, warn};

use crate::discovery::list_score_files;
use crate::error::{IngestError, Result};
use crate::reader::{ScoreTable, read_score_file};

/// Numeric cells that could not be parsed and were stored as null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionReport {
    /// Count per numeric column.
    pub by_column: BTreeMap<String, usize>,
    /// Count per source file.
    pub by_file: BTreeMap<String, usize>,
}

impl CoercionReport {
    pub fn total(&self) -> usize {
        self.by_column.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn record(&mut self, column: &str, file: &str) {
        *self.by_column.entry(column.to_string()).or_insert(0) += 1;
        *self.by_file.entry(file.to_string()).or_insert(0) += 1;
    }
}

/// Shape of one source file as seen by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileSummary {
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
}

/// Output of a reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub schema: ReconciledSchema,
    /// One row per source row, columns in schema order.
    pub frame: DataFrame,
    pub files: Vec<SourceFileSummary>,
    pub coercions: CoercionReport,
}

impl Reconciled {
    pub fn record_count(&self) -> usize {
        self.frame.height()
    }
}

/// Discovers and reconciles every score file in `dir`.
///
/// Fails when the directory is missing or holds no score files.
pub fn reconcile_directory(dir: &Path) -> Result<Reconciled> {
    let start = Instant::now();
    let files = list_score_files(dir)?;
    if files.is_empty() {
        return Err(IngestError::NoSourceFiles {
            path: dir.to_path_buf(),
        });
    }

    let mut tables = Vec::with_capacity(files.len());
    for path in &files {
        let table = read_score_file(path)?;
        debug!(
            source_filename = %table.source_filename(),
            rows = table.row_count(),
            columns = table.headers.len(),
            "read score file"
        );
        tables.push(table);
    }

    let reconciled = reconcile_tables(&tables)?;
    info!(
        file_count = reconciled.files.len(),
        column_count = reconciled.schema.len(),
        record_count = reconciled.record_count(),
        coerced_cells = reconciled.coercions.total(),
        duration_ms = start.elapsed().as_millis(),
        "reconciliation complete"
    );
    Ok(reconciled)
}

/// Reconciles already-read tables, in the order given.
pub fn reconcile_tables(tables: &[ScoreTable]) -> Result<Reconciled> {
    let schema = ReconciledSchema::from_headers(tables.iter().map(|table| table.headers.iter()));
    let total_rows: usize = tables.iter().map(ScoreTable::row_count).sum();
    let mut coercions = CoercionReport::default();
    let mut columns: Vec<Column> = Vec::with_capacity(schema.len());

    for spec in schema.columns() {
        let name = spec.name.as_str();
        if name == SOURCE_FILENAME {
            let mut values: Vec<String> = Vec::with_capacity(total_rows);
            for table in tables {
                let filename = table.source_filename();
                values.extend(std::iter::repeat_n(filename, table.row_count()));
            }
            columns.push(Series::new(name.into(), values).into());
            continue;
        }

        match spec.kind {
            ColumnKind::Text => {
                let mut values: Vec<Option<String>> = Vec::with_capacity(total_rows);
                for table in tables {
                    match table.column_index(name) {
                        Some(idx) => values.extend(table.rows.iter().map(|row| row[idx].clone())),
                        None => values.extend(std::iter::repeat_n(None, table.row_count())),
                    }
                }
                columns.push(Series::new(name.into(), values).into());
            }
            ColumnKind::Numeric => {
                let mut values: Vec<Option<f64>> = Vec::with_capacity(total_rows);
                for table in tables {
                    let Some(idx) = table.column_index(name) else {
                        values.extend(std::iter::repeat_n(None, table.row_count()));
                        continue;
                    };
                    let filename = table.source_filename();
                    for row in &table.rows {
                        let parsed = match row[idx].as_deref() {
                            None => None,
                            Some(raw) => {
                                let parsed = parse_f64(raw);
                                if parsed.is_none() {
                                    coercions.record(name, &filename);
                                }
                                parsed
                            }
                        };
                        values.push(parsed);
                    }
                }
                columns.push(Series::new(name.into(), values).into());
            }
        }
    }

    if !coercions.is_empty() {
        warn!(
            coerced_cells = coercions.total(),
            columns = ?coercions.by_column,
            files = ?coercions.by_file,
            "unparseable numeric cells set to null"
        );
    }

    let frame = DataFrame::new(columns)?;
    let files = tables
        .iter()
        .map(|table| SourceFileSummary {
            filename: table.source_filename(),
            rows: table.row_count(),
            columns: table.headers.len(),
        })
        .collect();

    Ok(Reconciled {
        schema,
        frame,
        files,
        coercions,
    })
}
