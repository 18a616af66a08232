//! Grouped z statistics attached to every row.
//!
//! For each grouping key `g` the frame gains `z_mean_g` and `z_sd_g`,
//! computed over the rows that share the same non-null `g`. Null `z`
//! values are ignored; rows with a null key get null statistics.

use npsych_model::{Z, z_mean_column, z_sd_column};
use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};

/// Smallest group size with a defined sample standard deviation.
const MIN_SD_OBSERVATIONS: u32 = 2;

fn group_stat_exprs(key: &str) -> [Expr; 2] {
    let has_key = col(key).is_not_null();
    let observations = col(Z).count().over([col(key)]);

    let mean = when(has_key.clone())
        .then(col(Z).mean().over([col(key)]))
        .otherwise(lit(NULL))
        .cast(DataType::Float64)
        .alias(z_mean_column(key));
    let sd = when(has_key.and(observations.gt_eq(lit(MIN_SD_OBSERVATIONS))))
        .then(col(Z).std(1).over([col(key)]))
        .otherwise(lit(NULL))
        .cast(DataType::Float64)
        .alias(z_sd_column(key));
    [mean, sd]
}

/// Attaches `z_mean_<key>` / `z_sd_<key>` for each key present in `df`.
///
/// Keys absent from the frame are skipped. Returns the keys applied.
pub fn attach_group_stats(df: &mut DataFrame, keys: &[String]) -> Result<Vec<String>> {
    if df.column(Z).is_err() {
        return Err(TransformError::MissingColumn {
            column: Z.to_string(),
        });
    }

    let mut applied = Vec::new();
    let mut exprs = Vec::new();
    for key in keys {
        if df.column(key).is_err() {
            debug!(key = %key, "grouping key not in frame; skipped");
            continue;
        }
        exprs.extend(group_stat_exprs(key));
        applied.push(key.clone());
    }
    if exprs.is_empty() {
        return Ok(applied);
    }

    *df = df.clone().lazy().with_columns(exprs).collect()?;
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn test_mean_and_sample_sd_per_group() {
        let mut df = df!(
            "domain" => [Some("Memory"), Some("Memory"), Some("Memory"), Some("Speed"), None],
            "z" => [Some(1.0), Some(2.0), Some(3.0), Some(-1.0), Some(0.5)],
        )
        .unwrap();
        let applied = attach_group_stats(&mut df, &keys(&["domain"])).unwrap();
        assert_eq!(applied, vec!["domain"]);

        let mean = df.column("z_mean_domain").unwrap().f64().unwrap();
        let sd = df.column("z_sd_domain").unwrap().f64().unwrap();
        for idx in 0..3 {
            assert!((mean.get(idx).unwrap() - 2.0).abs() < 1e-12);
            assert!((sd.get(idx).unwrap() - 1.0).abs() < 1e-12);
        }
        assert!((mean.get(3).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(sd.get(3), None);
        assert_eq!(mean.get(4), None);
        assert_eq!(sd.get(4), None);
    }

    #[test]
    fn test_null_z_rows_still_receive_group_stats() {
        let mut df = df!(
            "domain" => ["Memory", "Memory", "Memory"],
            "z" => [Some(1.0), None, Some(-1.0)],
        )
        .unwrap();
        attach_group_stats(&mut df, &keys(&["domain"])).unwrap();
        let mean = df.column("z_mean_domain").unwrap().f64().unwrap();
        let sd = df.column("z_sd_domain").unwrap().f64().unwrap();
        assert!((mean.get(1).unwrap()).abs() < 1e-12);
        assert!((sd.get(1).unwrap() - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation_with_null_rows_has_null_sd() {
        let mut df = df!(
            "domain" => ["Memory", "Memory", "Speed", "Speed"],
            "z" => [Some(1.0), None, Some(0.5), Some(1.5)],
        )
        .unwrap();
        attach_group_stats(&mut df, &keys(&["domain"])).unwrap();
        let mean = df.column("z_mean_domain").unwrap().f64().unwrap();
        let sd = df.column("z_sd_domain").unwrap().f64().unwrap();
        assert_eq!(mean.get(0), Some(1.0));
        assert_eq!(mean.get(1), Some(1.0));
        assert_eq!(sd.get(0), None);
        assert_eq!(sd.get(1), None);
        assert!((sd.get(2).unwrap() - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_group_without_observations_has_null_mean() {
        let mut df = df!(
            "domain" => ["Memory", "Memory"],
            "z" => [None::<f64>, None],
        )
        .unwrap();
        attach_group_stats(&mut df, &keys(&["domain"])).unwrap();
        assert_eq!(df.column("z_mean_domain").unwrap().null_count(), 2);
        assert_eq!(df.column("z_sd_domain").unwrap().null_count(), 2);
    }

    #[test]
    fn test_absent_keys_are_skipped() {
        let mut df = df!(
            "domain" => ["Memory"],
            "z" => [0.0],
        )
        .unwrap();
        let applied = attach_group_stats(&mut df, &keys(&["domain", "narrow"])).unwrap();
        assert_eq!(applied, vec!["domain"]);
        assert!(df.column("z_mean_narrow").is_err());
    }

    #[test]
    fn test_missing_z_column_is_an_error() {
        let mut df = df!("domain" => ["Memory"]).unwrap();
        let err = attach_group_stats(&mut df, &keys(&["domain"])).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { .. }));
    }
}
