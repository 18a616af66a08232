//! Score normalization.
//!
//! - **zscore**: percentile to z conversion with boundary substitution
//! - **classify**: test-type partitions
//! - **dedupe**: exact duplicate removal ignoring lineage
//! - **score_types**: `score_type` fill from a scale lookup
//! - **aggregate**: windowed z mean and sample SD per grouping key
//! - **stats**: per-group statistics lookup
//! - **datasets**: the whole normalize pass producing every dataset

pub mod aggregate;
pub mod classify;
pub mod datasets;
pub mod dedupe;
pub mod error;
pub mod score_types;
pub mod stats;
pub mod zscore;

pub use aggregate::attach_group_stats;
pub use classify::{count_unclassified, partition};
pub use datasets::{DatasetBundle, NormalizeOptions, NormalizeReport, normalize};
pub use dedupe::dedupe_records;
pub use error::{Result, TransformError};
pub use score_types::apply_score_types;
pub use stats::{GroupStatistics, ZStats};
pub use zscore::{
    LOWER_BOUNDARY_SUBSTITUTE, OutOfRangePolicy, UPPER_BOUNDARY_SUBSTITUTE, ZScoreReport,
    derive_z_scores, inverse_normal_cdf, percentile_to_z,
};
