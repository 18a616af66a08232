//! Lookup of per-group z statistics for downstream reporting.

use std::collections::HashMap;

use npsych_model::{Z, z_mean_column, z_sd_column};
use polars::prelude::*;

use crate::error::Result;

/// Aggregate z values for one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZStats {
    pub mean: Option<f64>,
    pub sd: Option<f64>,
    /// Non-null z observations in the group.
    pub count: usize,
}

/// `(grouping key, group value) -> ZStats`, read from a frame that has been
/// through [`attach_group_stats`](crate::attach_group_stats).
#[derive(Debug, Clone, Default)]
pub struct GroupStatistics {
    groups: HashMap<(String, String), ZStats>,
}

impl GroupStatistics {
    /// Collects statistics for every key that has its `z_mean_<key>` column.
    pub fn from_frame(df: &DataFrame, keys: &[String]) -> Result<Self> {
        let mut groups = HashMap::new();
        let z = df.column(Z).ok().map(|column| column.f64()).transpose()?;

        for key in keys {
            let (Ok(values), Ok(means), Ok(sds)) = (
                df.column(key),
                df.column(&z_mean_column(key)),
                df.column(&z_sd_column(key)),
            ) else {
                continue;
            };
            let values = values.str()?;
            let means = means.f64()?;
            let sds = sds.f64()?;

            for idx in 0..df.height() {
                let Some(value) = values.get(idx) else {
                    continue;
                };
                let observed = z.is_some_and(|z| z.get(idx).is_some());
                let entry = groups
                    .entry((key.clone(), value.to_string()))
                    .or_insert(ZStats {
                        mean: means.get(idx),
                        sd: sds.get(idx),
                        count: 0,
                    });
                if observed {
                    entry.count += 1;
                }
            }
        }
        Ok(Self { groups })
    }

    /// Statistics for the group where `key == value`.
    pub fn get(&self, value: &str, key: &str) -> Option<&ZStats> {
        self.groups.get(&(key.to_string(), value.to_string()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
