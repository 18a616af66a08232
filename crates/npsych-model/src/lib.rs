//! Shared data model for the neuropsych score pipeline.
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here: the recognized score columns and their kinds, the reconciled schema
//! built once per ingestion run, the measurement categories carried in the
//! `test_type` column, and the four output dataset partitions.

pub mod columns;
pub mod dataset;
pub mod error;
pub mod lookup;
pub mod output;
pub mod test_type;
pub mod values;

pub use columns::{
    ColumnKind, ColumnSpec, NUMERIC_COLUMNS, PERCENTILE, RECOGNIZED_COLUMNS, ReconciledSchema,
    SCALE, SCORE_TYPE, SOURCE_FILENAME, TEST_TYPE, Z, column_kind, is_numeric_column,
    z_mean_column, z_sd_column,
};
pub use dataset::{Dataset, DatasetKind, GroupingKeys};
pub use error::{ModelError, Result};
pub use lookup::ScoreTypeLookup;
pub use output::{OutputFormat, OutputMode};
pub use test_type::TestType;
pub use values::{cell_text, format_numeric, parse_f64};
