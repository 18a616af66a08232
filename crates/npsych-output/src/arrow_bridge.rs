//! Conversion from a Polars frame to an arrow-rs record batch.
//!
//! Used by the fallback writers, which go through arrow-rs instead of the
//! Polars-native writers.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType as ArrowDataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use polars::prelude::{Column, DataFrame, DataType, PolarsResult};

use crate::error::{PersistenceError, Result};

const BRIDGE: &str = "arrow-bridge";

fn float_array(column: &Column) -> PolarsResult<ArrayRef> {
    let values: Float64Array = column.f64()?.into_iter().collect();
    Ok(Arc::new(values))
}

fn string_array(column: &Column) -> PolarsResult<ArrayRef> {
    let values: StringArray = column.str()?.into_iter().collect();
    Ok(Arc::new(values))
}

fn convert_column(column: &Column) -> PolarsResult<(Field, ArrayRef)> {
    let name = column.name().as_str();
    match column.dtype() {
        DataType::Float64 => Ok((Field::new(name, ArrowDataType::Float64, true), float_array(column)?)),
        DataType::Float32 | DataType::Int32 | DataType::Int64 | DataType::UInt32 | DataType::UInt64 => {
            let cast = column.cast(&DataType::Float64)?;
            Ok((Field::new(name, ArrowDataType::Float64, true), float_array(&cast)?))
        }
        DataType::String => Ok((Field::new(name, ArrowDataType::Utf8, true), string_array(column)?)),
        _ => {
            let cast = column.cast(&DataType::String)?;
            Ok((Field::new(name, ArrowDataType::Utf8, true), string_array(&cast)?))
        }
    }
}

/// Builds a single record batch holding every row of `df`.
///
/// Floats stay `Float64`, other integer types widen to `Float64`, and
/// anything else is written as `Utf8`.
pub fn to_record_batch(df: &DataFrame) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(df.width());
    let mut arrays = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let (field, array) = convert_column(column).map_err(|e| PersistenceError::writer(BRIDGE, e))?;
        fields.push(field);
        arrays.push(array);
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .map_err(|e| PersistenceError::writer(BRIDGE, e))
}

#[cfg(test)]
mod tests {
    use arrow::array::Array;
    use arrow::datatypes::DataType as ArrowDataType;
    use polars::df;

    use super::to_record_batch;

    #[test]
    fn test_types_and_nulls_survive() {
        let df = df!(
            "scale" => [Some("FSIQ"), None],
            "z" => [Some(0.0), None],
        )
        .unwrap();
        let batch = to_record_batch(&df).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).data_type(), &ArrowDataType::Utf8);
        assert_eq!(batch.schema().field(1).data_type(), &ArrowDataType::Float64);
        assert_eq!(batch.column(0).null_count(), 1);
        assert_eq!(batch.column(1).null_count(), 1);
    }

    #[test]
    fn test_empty_frame_keeps_columns() {
        let df = df!(
            "scale" => Vec::<String>::new(),
            "z" => Vec::<f64>::new(),
        )
        .unwrap();
        let batch = to_record_batch(&df).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 2);
    }
}
