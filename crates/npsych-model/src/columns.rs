//! Column vocabulary and the reconciled schema.
//!
//! Instrument exports carry arbitrary column sets. The pipeline works against
//! a [`ReconciledSchema`] that is computed once per run as the union of every
//! file's header, so that each row can be materialized with the same shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Identity and score columns.
pub const TEST: &str = "test";
pub const TEST_NAME: &str = "test_name";
pub const SCALE: &str = "scale";
pub const RAW_SCORE: &str = "raw_score";
pub const SCORE: &str = "score";
pub const PERCENTILE: &str = "percentile";

/// Classification attributes used as grouping keys.
pub const DOMAIN: &str = "domain";
pub const SUBDOMAIN: &str = "subdomain";
pub const NARROW: &str = "narrow";
pub const PASS: &str = "pass";
pub const VERBAL: &str = "verbal";
pub const TIMED: &str = "timed";

pub const TEST_TYPE: &str = "test_type";
pub const SCORE_TYPE: &str = "score_type";

/// Lineage column added by the reconciler.
pub const SOURCE_FILENAME: &str = "source_filename";

/// Derived standardized score.
pub const Z: &str = "z";

/// Columns every reconciled schema carries, in canonical order.
pub const RECOGNIZED_COLUMNS: &[&str] = &[
    TEST, TEST_NAME, SCALE, RAW_SCORE, SCORE, PERCENTILE, DOMAIN, SUBDOMAIN, NARROW, PASS,
    VERBAL, TIMED, TEST_TYPE, SCORE_TYPE,
];

/// Columns parsed as floating point numbers.
pub const NUMERIC_COLUMNS: &[&str] = &[RAW_SCORE, SCORE, PERCENTILE];

/// Storage kind of a reconciled column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text, stored as a nullable string.
    Text,
    /// Parsed as a nullable 64-bit float; unparseable cells become null.
    Numeric,
}

/// Returns the storage kind for a column name.
pub fn column_kind(name: &str) -> ColumnKind {
    if NUMERIC_COLUMNS.contains(&name) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// Whether a column holds `Float64` values anywhere in the pipeline: the
/// numeric source columns, `z`, and the per-group `z_mean_*`/`z_sd_*`
/// statistics.
pub fn is_numeric_column(name: &str) -> bool {
    column_kind(name) == ColumnKind::Numeric
        || name == Z
        || name.starts_with("z_mean_")
        || name.starts_with("z_sd_")
}

/// Name of the per-group mean column for a grouping key.
pub fn z_mean_column(key: &str) -> String {
    format!("z_mean_{key}")
}

/// Name of the per-group sample standard deviation column for a grouping key.
pub fn z_sd_column(key: &str) -> String {
    format!("z_sd_{key}")
}

/// A single column of the reconciled schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// The union of columns across all source files of one ingestion run.
///
/// Column order is the order of first appearance across files, followed by
/// any recognized column that no file carried, followed by
/// [`SOURCE_FILENAME`]. Names are compared case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledSchema {
    columns: Vec<ColumnSpec>,
}

impl ReconciledSchema {
    /// Builds the schema from each file's header row, in file order.
    pub fn from_headers<I, H, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut columns = Vec::new();
        for header in headers {
            for name in header {
                let name = name.as_ref();
                if name.is_empty() || name == SOURCE_FILENAME {
                    continue;
                }
                if seen.insert(name.to_string()) {
                    columns.push(ColumnSpec {
                        name: name.to_string(),
                        kind: column_kind(name),
                    });
                }
            }
        }
        for name in RECOGNIZED_COLUMNS {
            if seen.insert((*name).to_string()) {
                columns.push(ColumnSpec {
                    name: (*name).to_string(),
                    kind: column_kind(name),
                });
            }
        }
        columns.push(ColumnSpec {
            name: SOURCE_FILENAME.to_string(),
            kind: ColumnKind::Text,
        });
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }
}
