//! Percentile to standard-normal z conversion.
//!
//! Percentiles are read as cumulative probabilities (`p / 100`) and mapped
//! through the inverse normal CDF. Inputs are clamped to `[0.5, 99.5]`, so a
//! percentile of 0 reads as 0.5 and 100 as 99.5. Every in-range input has a
//! finite z and the mapping stays monotone across the boundaries.

use npsych_model::{PERCENTILE, SOURCE_FILENAME, Z};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TransformError};

/// Percentiles below this (including 0) are read as this value.
pub const LOWER_BOUNDARY_SUBSTITUTE: f64 = 0.5;

/// Percentiles above this (including 100) are read as this value.
pub const UPPER_BOUNDARY_SUBSTITUTE: f64 = 99.5;

const MEDIAN: f64 = 50.0;

// Acklam's rational approximation coefficients.
const A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const TAIL_SPLIT: f64 = 0.024_25;

/// What to do with a percentile outside `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Fail the run.
    #[default]
    Reject,
    /// Store a null z, count it, and keep going.
    Nullify,
}

/// Counts from one [`derive_z_scores`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZScoreReport {
    pub converted: usize,
    pub missing: usize,
    pub nullified: usize,
}

/// Converts a percentile to a z-score.
///
/// `None` stays `None`. Values outside `[0, 100]` (or NaN) are rejected.
pub fn percentile_to_z(percentile: Option<f64>) -> Result<Option<f64>> {
    let Some(p) = percentile else {
        return Ok(None);
    };
    if p.is_nan() || !(0.0..=100.0).contains(&p) {
        return Err(TransformError::PercentileOutOfRange {
            value: p,
            row: None,
            source_filename: None,
        });
    }
    Ok(Some(z_for_valid(p)))
}

fn z_for_valid(p: f64) -> f64 {
    if p == MEDIAN {
        return 0.0;
    }
    let p = p.clamp(LOWER_BOUNDARY_SUBSTITUTE, UPPER_BOUNDARY_SUBSTITUTE);
    inverse_normal_cdf(p / 100.0)
}

/// Inverse of the standard normal CDF for `q` in the open interval (0, 1).
///
/// The upper tail is computed by reflection so the result is odd around 0.5.
pub fn inverse_normal_cdf(q: f64) -> f64 {
    if q > 0.5 {
        return -inverse_normal_cdf(1.0 - q);
    }
    if q < TAIL_SPLIT {
        let t = (-2.0 * q.ln()).sqrt();
        let num = ((((C[0] * t + C[1]) * t + C[2]) * t + C[3]) * t + C[4]) * t + C[5];
        let den = (((D[0] * t + D[1]) * t + D[2]) * t + D[3]) * t + 1.0;
        return num / den;
    }
    let r = q - 0.5;
    let s = r * r;
    let num = (((((A[0] * s + A[1]) * s + A[2]) * s + A[3]) * s + A[4]) * s + A[5]) * r;
    let den = ((((B[0] * s + B[1]) * s + B[2]) * s + B[3]) * s + B[4]) * s + 1.0;
    num / den
}

/// Appends (or replaces) the `z` column derived from `percentile`.
///
/// A frame without a `percentile` column gets an all-null `z`.
pub fn derive_z_scores(df: &mut DataFrame, policy: OutOfRangePolicy) -> Result<ZScoreReport> {
    let height = df.height();
    let mut report = ZScoreReport::default();

    if df.column(PERCENTILE).is_err() {
        debug!("no percentile column; z left null");
        report.missing = height;
        let z: Vec<Option<f64>> = vec![None; height];
        df.with_column(Series::new(Z.into(), z))?;
        return Ok(report);
    }
    let percentile = df.column(PERCENTILE)?.cast(&DataType::Float64)?;
    let percentile = percentile.f64()?;
    let sources = df
        .column(SOURCE_FILENAME)
        .ok()
        .and_then(|column| column.str().ok().cloned());

    let mut z: Vec<Option<f64>> = Vec::with_capacity(height);
    for (idx, value) in percentile.into_iter().enumerate() {
        match percentile_to_z(value) {
            Ok(Some(converted)) => {
                report.converted += 1;
                z.push(Some(converted));
            }
            Ok(None) => {
                report.missing += 1;
                z.push(None);
            }
            Err(TransformError::PercentileOutOfRange { value, .. }) => {
                let source_filename = sources
                    .as_ref()
                    .and_then(|column| column.get(idx))
                    .map(str::to_string);
                match policy {
                    OutOfRangePolicy::Reject => {
                        return Err(TransformError::PercentileOutOfRange {
                            value,
                            row: Some(idx),
                            source_filename,
                        });
                    }
                    OutOfRangePolicy::Nullify => {
                        warn!(
                            row = idx,
                            source_filename = source_filename.as_deref().unwrap_or("unknown"),
                            "percentile out of range; z set to null"
                        );
                        report.nullified += 1;
                        z.push(None);
                    }
                }
            }
            Err(other) => return Err(other),
        }
    }

    df.with_column(Series::new(Z.into(), z))?;
    debug!(
        converted = report.converted,
        missing = report.missing,
        nullified = report.nullified,
        "z scores derived"
    );
    Ok(report)
}
