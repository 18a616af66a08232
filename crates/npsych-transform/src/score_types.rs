//! Fills missing `score_type` cells from a scale lookup.

use npsych_model::{SCALE, SCORE_TYPE, ScoreTypeLookup};
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;

/// Sets `score_type` on rows where it is null and the lookup knows the
/// row's `scale`. Existing values are never overwritten.
///
/// Returns the number of cells filled.
pub fn apply_score_types(df: &mut DataFrame, lookup: &ScoreTypeLookup) -> Result<usize> {
    if lookup.is_empty() || df.column(SCALE).is_err() {
        return Ok(0);
    }
    let height = df.height();
    let scales = df.column(SCALE)?.str()?;
    let current: Vec<Option<String>> = match df.column(SCORE_TYPE) {
        Ok(column) => column
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect(),
        Err(_) => vec![None; height],
    };

    let mut filled = 0usize;
    let values: Vec<Option<String>> = current
        .into_iter()
        .zip(scales.into_iter())
        .map(|(existing, scale)| match (existing, scale) {
            (Some(existing), _) => Some(existing),
            (None, Some(scale)) => {
                let found = lookup.get(scale).map(str::to_string);
                if found.is_some() {
                    filled += 1;
                }
                found
            }
            (None, None) => None,
        })
        .collect();

    df.with_column(Series::new(SCORE_TYPE.into(), values))?;
    debug!(filled, "score types filled from lookup");
    Ok(filled)
}
