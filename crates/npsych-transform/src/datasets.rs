//! Builds the four output datasets from a reconciled frame.

use std::time::Instant;

use npsych_model::{Dataset, DatasetKind, GroupingKeys, ScoreTypeLookup};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::aggregate::attach_group_stats;
use crate::classify::{count_unclassified, partition};
use crate::dedupe::dedupe_records;
use crate::error::Result;
use crate::score_types::apply_score_types;
use crate::zscore::{OutOfRangePolicy, ZScoreReport, derive_z_scores};

/// Inputs to [`normalize`] that come from configuration.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub grouping: GroupingKeys,
    pub out_of_range: OutOfRangePolicy,
    pub score_types: ScoreTypeLookup,
}

/// Counters gathered while normalizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub duplicates_removed: usize,
    pub score_types_filled: usize,
    pub unclassified: usize,
    pub z: ZScoreReport,
}

/// The datasets of one run, in [`DatasetKind::ALL`] order.
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub datasets: Vec<Dataset>,
    pub report: NormalizeReport,
}

impl DatasetBundle {
    pub fn get(&self, kind: DatasetKind) -> Option<&Dataset> {
        self.datasets.iter().find(|dataset| dataset.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.iter()
    }
}

/// Dedupes, fills score types, derives `z`, partitions by test type and
/// attaches grouped statistics to each partition independently.
pub fn normalize(mut frame: DataFrame, options: &NormalizeOptions) -> Result<DatasetBundle> {
    let start = Instant::now();
    let mut report = NormalizeReport {
        duplicates_removed: dedupe_records(&mut frame)?,
        score_types_filled: apply_score_types(&mut frame, &options.score_types)?,
        ..NormalizeReport::default()
    };
    report.z = derive_z_scores(&mut frame, options.out_of_range)?;
    report.unclassified = count_unclassified(&frame)?;

    let mut datasets = Vec::with_capacity(DatasetKind::ALL.len());
    for kind in DatasetKind::ALL {
        let mut data = partition(&frame, kind)?;
        let applied = attach_group_stats(&mut data, options.grouping.for_dataset(kind))?;
        debug!(
            dataset = %kind,
            record_count = data.height(),
            grouping_keys = ?applied,
            "dataset built"
        );
        datasets.push(Dataset::new(kind, data));
    }

    info!(
        record_count = frame.height(),
        duplicates_removed = report.duplicates_removed,
        unclassified = report.unclassified,
        z_converted = report.z.converted,
        z_nullified = report.z.nullified,
        duration_ms = start.elapsed().as_millis(),
        "normalization complete"
    );
    Ok(DatasetBundle { datasets, report })
}
