use ndarray::ArrayD;

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::apply;
use crate::tensor::broadcast_utils::{broadcast_shapes, reduce_to_shape};
use crate::tensor::Tensor;

// --- Operation Structure ---

#[derive(Debug)]
pub struct AddFn {
    a: Tensor,
    b: Tensor,
}

impl AddFn {
    pub fn new(a: &Tensor, b: &Tensor) -> Self {
        AddFn {
            a: a.clone(),
            b: b.clone(),
        }
    }
}

// --- Function Implementation ---

impl Function for AddFn {
    fn name(&self) -> &'static str {
        "add"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let a = self.a.data();
        let b = self.b.data();
        broadcast_shapes(a.shape(), b.shape())?;
        let sum = &*a + &*b;
        Ok(sum)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let grad_a = reduce_to_shape(grad_output, &self.a.shape())?;
        let grad_b = reduce_to_shape(grad_output, &self.b.shape())?;
        Ok(vec![Some(grad_a), Some(grad_b)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

// --- Forward Operation ---

/// Elementwise `a + b` with broadcasting.
///
/// # Errors
/// `BroadcastError` if the shapes are not broadcast-compatible.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(AddFn::new(a, b))
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
