use std::rc::Rc;

use ndarray::ArrayD;

use crate::error::FastRnnError;
use crate::tensor::utils::reshape_array;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Shape-changing accessors.
///
/// Each method returns a *new* value holding a copy of the rearranged data that
/// keeps the same producer and label as `self`. The gradient buffer of the new value
/// is fresh. When the engine reaches such an alias it reshapes the alias gradient
/// back to the producer's output shape, so gradients still reach the producer.
/// Do not call `backward` separately on both the original and an alias: that would
/// push the same contribution through the producer twice.
impl Tensor {
    /// Returns a value with the same elements (row-major order) in a new shape.
    ///
    /// # Errors
    /// `FastRnnError::ShapeMismatch` if the element counts differ.
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor, FastRnnError> {
        let reshaped = reshape_array(&self.data(), shape, "reshape")?;
        Ok(self.alias(reshaped))
    }

    /// Returns a value with all axes reversed (matrix transpose for 2-D data).
    pub fn transpose(&self) -> Tensor {
        let transposed = self.data().t().to_owned();
        self.alias(transposed)
    }

    /// Returns a value with axes reordered according to `axes`.
    ///
    /// # Errors
    /// `FastRnnError::DimensionMismatch` if `axes` does not name every axis exactly once.
    pub fn permute(&self, axes: &[usize]) -> Result<Tensor, FastRnnError> {
        let ndim = self.ndim();
        let mut seen = vec![false; ndim];
        for &axis in axes {
            if axis >= ndim || seen[axis] {
                return Err(FastRnnError::DimensionMismatch {
                    expected: ndim,
                    actual: axes.len(),
                    operation: "permute".to_string(),
                });
            }
            seen[axis] = true;
        }
        if axes.len() != ndim {
            return Err(FastRnnError::DimensionMismatch {
                expected: ndim,
                actual: axes.len(),
                operation: "permute".to_string(),
            });
        }
        let permuted = self.data().view().permuted_axes(axes.to_vec()).to_owned();
        Ok(self.alias(permuted))
    }

    fn alias(&self, data: ArrayD<f64>) -> Tensor {
        let guard = self.read_data();
        let mut alias_data = TensorData::new(data, guard.name.clone());
        alias_data.grad_fn = guard.grad_fn.clone();
        Tensor {
            data: Rc::new(std::cell::RefCell::new(alias_data)),
        }
    }
}

#[cfg(test)]
#[path = "view_methods_test.rs"]
mod tests;
