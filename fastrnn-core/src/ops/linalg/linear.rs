use ndarray::{ArrayD, Ix2};

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::{apply, data_as};
use crate::tensor::broadcast_utils::{broadcast_shapes, reduce_to_shape};
use crate::tensor::Tensor;

// --- Operation Structure ---

/// Affine map `x·W + b` with `x: [n, k]`, `W: [k, m]` and a bias broadcastable to `[n, m]`.
#[derive(Debug)]
pub struct LinearFn {
    x: Tensor,
    weights: Tensor,
    bias: Tensor,
}

impl LinearFn {
    pub fn new(x: &Tensor, weights: &Tensor, bias: &Tensor) -> Self {
        LinearFn {
            x: x.clone(),
            weights: weights.clone(),
            bias: bias.clone(),
        }
    }
}

// --- Function Implementation ---

impl Function for LinearFn {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let x = data_as::<Ix2>(&self.x, "linear (input rank)")?;
        let w = data_as::<Ix2>(&self.weights, "linear (weights rank)")?;
        if x.ncols() != w.nrows() {
            return Err(FastRnnError::ShapeMismatch {
                expected: vec![x.nrows(), w.nrows()],
                actual: x.shape().to_vec(),
                operation: "linear (inner dim)".to_string(),
            });
        }

        let output_shape = vec![x.nrows(), w.ncols()];
        let bias = self.bias.data().clone();
        let broadcast = broadcast_shapes(bias.shape(), &output_shape)?;
        if broadcast != output_shape {
            return Err(FastRnnError::BroadcastError {
                shape1: bias.shape().to_vec(),
                shape2: output_shape,
            });
        }

        Ok(x.dot(&w).into_dyn() + &bias)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let grad = grad_output.clone().into_dimensionality::<Ix2>()?;
        let x = data_as::<Ix2>(&self.x, "linear backward")?;
        let w = data_as::<Ix2>(&self.weights, "linear backward")?;

        // dx = grad·Wᵗ, dW = xᵗ·grad, db = grad summed over broadcast axes
        let grad_x = grad.dot(&w.t()).into_dyn();
        let grad_w = x.t().dot(&grad).into_dyn();
        let grad_b = reduce_to_shape(&grad.into_dyn(), &self.bias.shape())?;

        Ok(vec![Some(grad_x), Some(grad_w), Some(grad_b)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.weights.clone(), self.bias.clone()]
    }
}

// --- Forward Operation ---

/// Computes `x·W + b` and records it in the graph.
///
/// # Errors
/// - `DimensionMismatch` if `x` or `W` is not 2-D.
/// - `ShapeMismatch` if the inner dimensions differ.
/// - `BroadcastError` if the bias cannot be broadcast to `[n, m]`.
pub fn linear_op(x: &Tensor, weights: &Tensor, bias: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(LinearFn::new(x, weights, bias))
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
