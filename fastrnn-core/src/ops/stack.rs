use ndarray::{concatenate, ArrayD, Axis};

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::apply;
use crate::tensor::utils::last_axis;
use crate::tensor::Tensor;

fn concat_pair(a: &Tensor, b: &Tensor, axis: Axis, operation: &str) -> Result<ArrayD<f64>, FastRnnError> {
    let a = a.data();
    let b = b.data();
    if a.ndim() != b.ndim() {
        return Err(FastRnnError::DimensionMismatch {
            expected: a.ndim(),
            actual: b.ndim(),
            operation: operation.to_string(),
        });
    }
    let mut expected = a.shape().to_vec();
    expected[axis.index()] = b.shape()[axis.index()];
    if expected != b.shape() {
        return Err(FastRnnError::ShapeMismatch {
            expected,
            actual: b.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    let joined = concatenate(axis, &[a.view(), b.view()])?;
    Ok(joined)
}

fn split_pair(grad: &ArrayD<f64>, axis: Axis, at: usize) -> Vec<Option<ArrayD<f64>>> {
    let (first, second) = grad.view().split_at(axis, at);
    vec![Some(first.to_owned()), Some(second.to_owned())]
}

// --- Horizontal concatenation ---

/// Joins two values along their last axis.
#[derive(Debug)]
pub struct HStackFn {
    a: Tensor,
    b: Tensor,
}

impl HStackFn {
    pub fn new(a: &Tensor, b: &Tensor) -> Self {
        HStackFn {
            a: a.clone(),
            b: b.clone(),
        }
    }
}

impl Function for HStackFn {
    fn name(&self) -> &'static str {
        "hstack"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let axis = last_axis(&self.a.shape(), "hstack")?;
        concat_pair(&self.a, &self.b, Axis(axis), "hstack")
    }

    /// Splits the gradient at the width of the first input.
    ///
    /// # Errors
    /// `SplitMismatch` if the gradient width differs from the combined input width.
    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let a_shape = self.a.shape();
        let axis = last_axis(&a_shape, "hstack backward")?;
        let a_width = a_shape[axis];
        let expected = a_width + self.b.shape()[axis];
        let actual = grad_output.shape().get(axis).copied().unwrap_or(0);
        if grad_output.ndim() != a_shape.len() || actual != expected {
            return Err(FastRnnError::SplitMismatch { expected, actual });
        }
        Ok(split_pair(grad_output, Axis(axis), a_width))
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Concatenates `a` and `b` along the last axis.
///
/// # Errors
/// - `DimensionMismatch` if the ranks differ or the inputs are rank 0.
/// - `ShapeMismatch` if any other axis differs.
pub fn hstack_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(HStackFn::new(a, b))
}

// --- Vertical concatenation ---

/// Joins two values along their first axis.
#[derive(Debug)]
pub struct VStackFn {
    a: Tensor,
    b: Tensor,
}

impl VStackFn {
    pub fn new(a: &Tensor, b: &Tensor) -> Self {
        VStackFn {
            a: a.clone(),
            b: b.clone(),
        }
    }
}

impl Function for VStackFn {
    fn name(&self) -> &'static str {
        "vstack"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        last_axis(&self.a.shape(), "vstack")?;
        concat_pair(&self.a, &self.b, Axis(0), "vstack")
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let a_rows = self.a.shape()[0];
        let mut expected = self.a.shape();
        expected[0] += self.b.shape()[0];
        if grad_output.shape() != expected.as_slice() {
            return Err(FastRnnError::ShapeMismatch {
                expected,
                actual: grad_output.shape().to_vec(),
                operation: "vstack backward".to_string(),
            });
        }
        Ok(split_pair(grad_output, Axis(0), a_rows))
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Concatenates `a` and `b` along the first axis.
pub fn vstack_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(VStackFn::new(a, b))
}

#[cfg(test)]
#[path = "stack_test.rs"]
mod tests;
