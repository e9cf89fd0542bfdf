use ndarray::ArrayD;

use crate::tensor::{from_vec, Tensor};

/// Checks that an array has the expected shape and row-major data within tolerance.
/// Panics on the first differing element.
pub fn check_array_near(
    actual: &ArrayD<f64>,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");
    assert_eq!(actual.len(), expected_data.len(), "Data length mismatch");

    for (i, (a, e)) in actual.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Checks that a tensor's data has the expected shape and values within tolerance.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    check_array_near(&actual.data(), expected_shape, expected_data, tolerance);
}

/// Checks a tensor's accumulated gradient the same way.
pub fn check_grad_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    check_array_near(&actual.grad(), expected_shape, expected_data, tolerance);
}

/// Helper to create a leaf tensor for testing purposes.
pub fn create_test_tensor(data: Vec<f64>, shape: &[usize]) -> Tensor {
    from_vec(data, shape).expect("Failed to create test tensor")
}

/// Upstream gradient of ones for `shape`.
pub fn ones_grad(shape: &[usize]) -> ArrayD<f64> {
    ArrayD::ones(ndarray::IxDyn(shape))
}
