use ndarray::ArrayD;

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::apply;
use crate::tensor::broadcast_utils::{broadcast_shapes, reduce_to_shape};
use crate::tensor::Tensor;

// --- Operation Structure ---

#[derive(Debug)]
pub struct MulFn {
    a: Tensor,
    b: Tensor,
}

impl MulFn {
    pub fn new(a: &Tensor, b: &Tensor) -> Self {
        MulFn {
            a: a.clone(),
            b: b.clone(),
        }
    }
}

// --- Function Implementation ---

impl Function for MulFn {
    fn name(&self) -> &'static str {
        "mul"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let a = self.a.data();
        let b = self.b.data();
        broadcast_shapes(a.shape(), b.shape())?;
        let product = &*a * &*b;
        Ok(product)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        // grad_a = grad_output * b, grad_b = grad_output * a
        let grad_a_unreduced = grad_output * &*self.b.data();
        let grad_a = reduce_to_shape(&grad_a_unreduced, &self.a.shape())?;

        let grad_b_unreduced = grad_output * &*self.a.data();
        let grad_b = reduce_to_shape(&grad_b_unreduced, &self.b.shape())?;

        Ok(vec![Some(grad_a), Some(grad_b)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

// --- Forward Operation ---

/// Elementwise `a * b` with broadcasting.
///
/// # Errors
/// `BroadcastError` if the shapes are not broadcast-compatible.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(MulFn::new(a, b))
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
