//! Utilities for working with Arrow arrays.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, StringArray};
use arrow::compute::kernels::cast::cast;
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{Result, StatsError};

/// Get a column from a record batch as `Utf8`
///
/// Columns of other types are converted with arrow's cast kernel, except
/// booleans, which become the SINAN flag codes `"1"` (yes) and `"2"` (no).
///
/// # Arguments
///
/// * `batch` - The record batch containing the column
/// * `column_name` - The name of the column to extract
///
/// # Returns
///
/// * `Ok(Some(ArrayRef))` - The column as a `Utf8` array
/// * `Ok(None)` - If the column is not in the batch
/// * `Err(StatsError)` - If the column cannot be represented as text
pub fn utf8_column(batch: &RecordBatch, column_name: &str) -> Result<Option<ArrayRef>> {
    let Some(column) = batch.column_by_name(column_name) else {
        return Ok(None);
    };

    let actual_type = column.data_type();
    if actual_type == &DataType::Utf8 {
        return Ok(Some(Arc::clone(column)));
    }

    debug!("Converting column '{column_name}' from {actual_type:?} to Utf8");

    if actual_type == &DataType::Boolean {
        let flags = downcast_array::<BooleanArray>(column, column_name, "Boolean")?;
        let text: StringArray = flags
            .iter()
            .map(|v| v.map(|yes| if yes { "1" } else { "2" }))
            .collect();
        return Ok(Some(Arc::new(text)));
    }

    Ok(Some(cast(column, &DataType::Utf8)?))
}

/// Downcast a column to a specific array type with clear error messages
///
/// # Type Parameters
///
/// * `A` - The target array type to downcast to
///
/// # Arguments
///
/// * `array` - The array reference to downcast
/// * `column_name` - The name of the column (for error messages)
/// * `expected_type_name` - A human-readable name of the expected type (for error messages)
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        StatsError::Arrow(ArrowError::CastError(format!(
            "column '{column_name}' could not be read as {expected_type_name}"
        )))
    })
}
