//! Output dataset partitions and their grouping keys.

use std::fmt;
use std::str::FromStr;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::columns::{DOMAIN, NARROW, PASS, SUBDOMAIN, TIMED, VERBAL};
use crate::error::ModelError;
use crate::test_type::TestType;

/// One of the four named partitions produced by every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Every record, deduplicated.
    Neuropsych,
    /// Cognitive test records.
    Neurocog,
    /// Rating scale records.
    Neurobehav,
    /// Performance and symptom validity records.
    Validity,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Neuropsych,
        DatasetKind::Neurocog,
        DatasetKind::Neurobehav,
        DatasetKind::Validity,
    ];

    /// Artifact base name and query relation name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Neuropsych => "neuropsych",
            Self::Neurocog => "neurocog",
            Self::Neurobehav => "neurobehav",
            Self::Validity => "validity",
        }
    }

    /// Test types admitted into this partition.
    ///
    /// `None` means the partition is not filtered by test type.
    pub fn test_types(self) -> Option<&'static [TestType]> {
        match self {
            Self::Neuropsych => None,
            Self::Neurocog => Some(&[TestType::NpsychTest]),
            Self::Neurobehav => Some(&[TestType::RatingScale]),
            Self::Validity => Some(&[
                TestType::PerformanceValidity,
                TestType::SymptomValidity,
            ]),
        }
    }

    /// Returns true if `stem` names one of the dataset partitions.
    pub fn is_dataset_name(stem: &str) -> bool {
        Self::ALL.iter().any(|kind| kind.name() == stem)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ModelError::UnknownDataset(value.to_string()))
    }
}

/// A dataset partition and its rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub data: DataFrame,
}

impl Dataset {
    pub fn new(kind: DatasetKind, data: DataFrame) -> Self {
        Self { kind, data }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }
}

/// Grouping keys used by the windowed aggregator, per dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingKeys {
    pub neuropsych: Vec<String>,
    pub neurocog: Vec<String>,
    pub neurobehav: Vec<String>,
    pub validity: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

impl Default for GroupingKeys {
    fn default() -> Self {
        let broad = [DOMAIN, SUBDOMAIN, NARROW];
        Self {
            neuropsych: keys(&broad),
            neurocog: keys(&[DOMAIN, SUBDOMAIN, NARROW, PASS, VERBAL, TIMED]),
            neurobehav: keys(&broad),
            validity: keys(&broad),
        }
    }
}

impl GroupingKeys {
    pub fn for_dataset(&self, kind: DatasetKind) -> &[String] {
        match kind {
            DatasetKind::Neuropsych => &self.neuropsych,
            DatasetKind::Neurocog => &self.neurocog,
            DatasetKind::Neurobehav => &self.neurobehav,
            DatasetKind::Validity => &self.validity,
        }
    }
}
