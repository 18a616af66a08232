//! Score classification into dataset partitions.

use npsych_model::{DatasetKind, TEST_TYPE, TestType};
use polars::prelude::*;

use crate::error::Result;

fn test_type_filter(types: &[TestType]) -> Option<Expr> {
    types
        .iter()
        .map(|test_type| col(TEST_TYPE).eq(lit(test_type.marker())))
        .reduce(|acc, expr| acc.or(expr))
}

/// Rows of `df` that belong to `kind`.
///
/// `neuropsych` takes every row. The other partitions match `test_type`
/// exactly; null or unrecognized markers match nothing.
pub fn partition(df: &DataFrame, kind: DatasetKind) -> Result<DataFrame> {
    let Some(types) = kind.test_types() else {
        return Ok(df.clone());
    };
    if df.column(TEST_TYPE).is_err() {
        return Ok(df.clear());
    }
    let Some(predicate) = test_type_filter(types) else {
        return Ok(df.clear());
    };
    Ok(df.clone().lazy().filter(predicate).collect()?)
}

/// Number of rows whose `test_type` is null or not a known marker.
pub fn count_unclassified(df: &DataFrame) -> Result<usize> {
    let Ok(column) = df.column(TEST_TYPE) else {
        return Ok(df.height());
    };
    let values = column.str()?;
    Ok(values
        .into_iter()
        .filter(|value| value.and_then(TestType::from_marker).is_none())
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "scale" => ["FSIQ", "Anxiety", "TOMM", "SIMS", "Unknown", "Blank"],
            "test_type" => [
                Some("npsych_test"),
                Some("rating_scale"),
                Some("performance_validity"),
                Some("symptom_validity"),
                Some("questionnaire"),
                None,
            ],
        )
        .unwrap()
    }

    fn scales(df: &DataFrame) -> Vec<String> {
        df.column("scale")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_partitions() {
        let df = sample();
        assert_eq!(partition(&df, DatasetKind::Neuropsych).unwrap().height(), 6);
        assert_eq!(
            scales(&partition(&df, DatasetKind::Neurocog).unwrap()),
            vec!["FSIQ"]
        );
        assert_eq!(
            scales(&partition(&df, DatasetKind::Neurobehav).unwrap()),
            vec!["Anxiety"]
        );
        assert_eq!(
            scales(&partition(&df, DatasetKind::Validity).unwrap()),
            vec!["TOMM", "SIMS"]
        );
    }

    #[test]
    fn test_unclassified_rows_stay_in_neuropsych_only() {
        let df = sample();
        assert_eq!(count_unclassified(&df).unwrap(), 2);
        let classified: usize = [
            DatasetKind::Neurocog,
            DatasetKind::Neurobehav,
            DatasetKind::Validity,
        ]
        .into_iter()
        .map(|kind| partition(&df, kind).unwrap().height())
        .sum();
        assert_eq!(classified, 4);
    }

    #[test]
    fn test_partition_keeps_schema() {
        let df = sample();
        let validity = partition(&df, DatasetKind::Validity).unwrap();
        assert_eq!(validity.get_column_names(), df.get_column_names());
    }

    #[test]
    fn test_partition_without_test_type_column() {
        let df = df!("scale" => ["FSIQ"]).unwrap();
        let neurocog = partition(&df, DatasetKind::Neurocog).unwrap();
        assert_eq!(neurocog.height(), 0);
        assert_eq!(neurocog.width(), 1);
        assert_eq!(count_unclassified(&df).unwrap(), 1);
    }
}
