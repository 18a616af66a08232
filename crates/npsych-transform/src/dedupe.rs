//! Exact duplicate removal for the combined dataset.

use std::collections::HashSet;

use npsych_model::{SOURCE_FILENAME, cell_text};
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;

/// Drops rows identical to an earlier row in every column except
/// `source_filename`. The first occurrence is kept and order is preserved.
///
/// Returns the number of rows removed.
pub fn dedupe_records(df: &mut DataFrame) -> Result<usize> {
    let height = df.height();
    if height == 0 {
        return Ok(0);
    }
    let key_columns: Vec<&Column> = df
        .get_columns()
        .iter()
        .filter(|column| column.name().as_str() != SOURCE_FILENAME)
        .collect();
    if key_columns.is_empty() {
        return Ok(0);
    }

    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(height);
    let mut keep = Vec::with_capacity(height);
    for idx in 0..height {
        let mut composite = Vec::with_capacity(key_columns.len());
        for column in &key_columns {
            composite.push(cell_text(column.get(idx)?));
        }
        keep.push(seen.insert(composite));
    }

    let removed = keep.iter().filter(|kept| !**kept).count();
    if removed > 0 {
        let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
        *df = df.filter(&mask)?;
        debug!(removed, remaining = df.height(), "duplicate records dropped");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_across_files_collapse() {
        let mut df = df!(
            "scale" => ["FSIQ", "FSIQ", "VCI"],
            "percentile" => [Some(50.0), Some(50.0), Some(63.0)],
            "source_filename" => ["a.csv", "b.csv", "a.csv"],
        )
        .unwrap();
        let removed = dedupe_records(&mut df).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(df.height(), 2);
        let source = df.column("source_filename").unwrap().str().unwrap();
        assert_eq!(source.get(0), Some("a.csv"));
    }

    #[test]
    fn test_null_differs_from_value() {
        let mut df = df!(
            "scale" => ["FSIQ", "FSIQ"],
            "domain" => [None, Some("")],
        )
        .unwrap();
        assert_eq!(dedupe_records(&mut df).unwrap(), 0);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_identical_nulls_are_duplicates() {
        let mut df = df!(
            "scale" => ["FSIQ", "FSIQ"],
            "percentile" => [None::<f64>, None],
        )
        .unwrap();
        assert_eq!(dedupe_records(&mut df).unwrap(), 1);
    }

    #[test]
    fn test_empty_frame() {
        let mut df = df!("scale" => Vec::<String>::new()).unwrap();
        assert_eq!(dedupe_records(&mut df).unwrap(), 0);
    }
}
