//! Pipeline configuration loaded from a TOML file.
//!
//! ```toml
//! [grouping]
//! neurocog = ["domain", "subdomain", "narrow", "pass", "verbal", "timed"]
//!
//! [percentile]
//! out_of_range = "nullify"
//!
//! [output]
//! format = "parquet"
//!
//! [score_types]
//! "WISC-V FSIQ" = "standard_score"
//! ```
//!
//! Every section is optional; absent values keep their defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use npsych_model::{GroupingKeys, OutputMode, ScoreTypeLookup};
use npsych_transform::{NormalizeOptions, OutOfRangePolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PercentileConfig {
    pub out_of_range: OutOfRangePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub grouping: GroupingKeys,
    pub percentile: PercentileConfig,
    pub output: OutputConfig,
    /// Scale name to score type, used to fill missing `score_type` cells.
    pub score_types: BTreeMap<String, String>,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            grouping: self.grouping.clone(),
            out_of_range: self.percentile.out_of_range,
            score_types: ScoreTypeLookup::from_map(&self.score_types),
        }
    }
}
