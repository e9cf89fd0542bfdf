use ndarray::ArrayD;

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::activation::cached;
use crate::ops::apply;
use crate::tensor::Tensor;

/// Elementwise hyperbolic tangent.
pub fn tanh(x: &ArrayD<f64>) -> ArrayD<f64> {
    x.mapv(f64::tanh)
}

#[derive(Debug)]
pub struct TanhFn {
    x: Tensor,
    output: Option<ArrayD<f64>>,
}

impl TanhFn {
    pub fn new(x: &Tensor) -> Self {
        TanhFn {
            x: x.clone(),
            output: None,
        }
    }
}

impl Function for TanhFn {
    fn name(&self) -> &'static str {
        "tanh"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let output = tanh(&self.x.data());
        self.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let a = cached(&self.output, "tanh")?;
        let local = a.mapv(|v| 1.0 - v * v);
        Ok(vec![Some(grad_output * &local)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }
}

pub fn tanh_op(x: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(TanhFn::new(x))
}

#[cfg(test)]
#[path = "tanh_test.rs"]
mod tests;
