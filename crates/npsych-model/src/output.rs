//! Output formats and the caller-selected output mode.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetKind;
use crate::error::ModelError;

/// A persisted artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Row-oriented delimited text.
    Csv,
    /// Primary columnar binary.
    Parquet,
    /// Secondary columnar binary (Arrow IPC file).
    Feather,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Csv,
        OutputFormat::Parquet,
        OutputFormat::Feather,
    ];

    /// Extension written by the persistence writer.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Feather => "feather",
        }
    }

    /// Maps a file extension to a format. `arrow` is read as feather.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            "feather" | "arrow" => Some(Self::Feather),
            _ => None,
        }
    }

    /// Read precedence when one dataset exists in several formats.
    ///
    /// Lower ranks win: typed columnar formats come before text.
    pub const fn read_rank(self) -> u8 {
        match self {
            Self::Parquet => 0,
            Self::Feather => 1,
            Self::Csv => 2,
        }
    }

    pub fn artifact_path(self, output_dir: &std::path::Path, dataset: DatasetKind) -> PathBuf {
        output_dir.join(format!("{}.{}", dataset.name(), self.extension()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_extension(value.trim()).ok_or_else(|| ModelError::UnknownFormat(value.to_string()))
    }
}

/// Which formats a run should write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Csv,
    Parquet,
    Feather,
    #[default]
    All,
}

impl OutputMode {
    pub fn single(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => Self::Csv,
            OutputFormat::Parquet => Self::Parquet,
            OutputFormat::Feather => Self::Feather,
        }
    }

    pub fn formats(self) -> Vec<OutputFormat> {
        match self {
            Self::Csv => vec![OutputFormat::Csv],
            Self::Parquet => vec![OutputFormat::Parquet],
            Self::Feather => vec![OutputFormat::Feather],
            Self::All => OutputFormat::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(OutputFormat::from_extension("PARQUET"), Some(OutputFormat::Parquet));
        assert_eq!(OutputFormat::from_extension("arrow"), Some(OutputFormat::Feather));
        assert_eq!(OutputFormat::from_extension("json"), None);
    }

    #[test]
    fn test_read_precedence() {
        let mut formats = OutputFormat::ALL.to_vec();
        formats.sort_by_key(|format| format.read_rank());
        assert_eq!(
            formats,
            vec![OutputFormat::Parquet, OutputFormat::Feather, OutputFormat::Csv]
        );
    }

    #[test]
    fn test_mode_formats() {
        assert_eq!(OutputMode::All.formats().len(), 3);
        assert_eq!(OutputMode::single(OutputFormat::Csv).formats(), vec![OutputFormat::Csv]);
    }

    #[test]
    fn test_artifact_path() {
        let path = OutputFormat::Feather.artifact_path(std::path::Path::new("out"), DatasetKind::Validity);
        assert_eq!(path, std::path::Path::new("out").join("validity.feather"));
    }
}
