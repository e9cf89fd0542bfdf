use ndarray::{ArrayD, IxDyn};

use crate::error::FastRnnError;

/// Copies `array` into a new array of `shape`, keeping row-major element order.
///
/// Works for any memory layout, including transposed views.
pub fn reshape_array(
    array: &ArrayD<f64>,
    shape: &[usize],
    operation: &str,
) -> Result<ArrayD<f64>, FastRnnError> {
    let numel: usize = shape.iter().product();
    if numel != array.len() {
        return Err(FastRnnError::ShapeMismatch {
            expected: shape.to_vec(),
            actual: array.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    if array.shape() == shape {
        return Ok(array.clone());
    }
    let flat: Vec<f64> = array.iter().copied().collect();
    Ok(ArrayD::from_shape_vec(IxDyn(shape), flat)?)
}

/// Index of the last axis, or an error for rank-0 data.
pub(crate) fn last_axis(shape: &[usize], operation: &str) -> Result<usize, FastRnnError> {
    if shape.is_empty() {
        return Err(FastRnnError::DimensionMismatch {
            expected: 1,
            actual: 0,
            operation: operation.to_string(),
        });
    }
    Ok(shape.len() - 1)
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
