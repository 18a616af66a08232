//! Measurement categories carried in the `test_type` column.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    NpsychTest,
    RatingScale,
    PerformanceValidity,
    SymptomValidity,
}

impl TestType {
    pub const ALL: [TestType; 4] = [
        TestType::NpsychTest,
        TestType::RatingScale,
        TestType::PerformanceValidity,
        TestType::SymptomValidity,
    ];

    /// The exact marker string found in source files.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::NpsychTest => "npsych_test",
            Self::RatingScale => "rating_scale",
            Self::PerformanceValidity => "performance_validity",
            Self::SymptomValidity => "symptom_validity",
        }
    }

    /// Parses a marker value. Matching is exact; anything else is unclassified.
    pub fn from_marker(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == value)
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_round_trip() {
        for kind in TestType::ALL {
            assert_eq!(TestType::from_marker(kind.marker()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_marker_is_unclassified() {
        assert_eq!(TestType::from_marker("questionnaire"), None);
        assert_eq!(TestType::from_marker("NPSYCH_TEST"), None);
        assert_eq!(TestType::from_marker(""), None);
    }
}
