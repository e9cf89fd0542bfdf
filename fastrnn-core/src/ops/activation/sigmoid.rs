use ndarray::ArrayD;

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::activation::cached;
use crate::ops::apply;
use crate::tensor::Tensor;

/// Elementwise logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: &ArrayD<f64>) -> ArrayD<f64> {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

#[derive(Debug)]
pub struct SigmoidFn {
    x: Tensor,
    output: Option<ArrayD<f64>>,
}

impl SigmoidFn {
    pub fn new(x: &Tensor) -> Self {
        SigmoidFn {
            x: x.clone(),
            output: None,
        }
    }
}

impl Function for SigmoidFn {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let output = sigmoid(&self.x.data());
        self.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        // grad * a * (1 - a)
        let a = cached(&self.output, "sigmoid")?;
        let local = a.mapv(|v| v * (1.0 - v));
        Ok(vec![Some(grad_output * &local)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }
}

pub fn sigmoid_op(x: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(SigmoidFn::new(x))
}

#[cfg(test)]
#[path = "sigmoid_test.rs"]
mod tests;
