use ndarray::{ArrayD, Axis};

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::activation::cached;
use crate::ops::apply;
use crate::tensor::utils::last_axis;
use crate::tensor::Tensor;

/// Softmax over the last axis, with the row maximum subtracted before exponentiation.
///
/// # Errors
/// `DimensionMismatch` for rank-0 input.
pub fn softmax_rows(x: &ArrayD<f64>) -> Result<ArrayD<f64>, FastRnnError> {
    let axis = Axis(last_axis(x.shape(), "softmax")?);
    let max = x
        .fold_axis(axis, f64::NEG_INFINITY, |&acc, &v| acc.max(v))
        .insert_axis(axis);
    let exp = (x - &max).mapv(f64::exp);
    let sum = exp.sum_axis(axis).insert_axis(axis);
    Ok(exp / &sum)
}

/// Last-axis softmax.
///
/// The backward pass applies each row's Jacobian `diag(a) - a·aᵗ` to the matching
/// gradient row, which reduces to `a * (g - Σ a·g)`, so batched inputs are handled
/// row by row.
#[derive(Debug)]
pub struct SoftmaxFn {
    x: Tensor,
    output: Option<ArrayD<f64>>,
}

impl SoftmaxFn {
    pub fn new(x: &Tensor) -> Self {
        SoftmaxFn {
            x: x.clone(),
            output: None,
        }
    }
}

impl Function for SoftmaxFn {
    fn name(&self) -> &'static str {
        "softmax"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let output = softmax_rows(&self.x.data())?;
        self.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let a = cached(&self.output, "softmax")?;
        let axis = Axis(last_axis(a.shape(), "softmax backward")?);
        let dot = (a * grad_output).sum_axis(axis).insert_axis(axis);
        let grad_x = a * &(grad_output - &dot);
        Ok(vec![Some(grad_x)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }
}

pub fn softmax_op(x: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(SoftmaxFn::new(x))
}

#[cfg(test)]
#[path = "softmax_test.rs"]
mod tests;
