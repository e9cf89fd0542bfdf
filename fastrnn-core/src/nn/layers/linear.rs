use rand::Rng;

use crate::error::FastRnnError;
use crate::nn::init::wandb_with_rng;
use crate::nn::module::{expect_inputs, Module, ModuleCore};
use crate::ops::linear_op;
use crate::tensor::Tensor;

/// Applies an affine transformation to the incoming data: `y = x·W + b`.
///
/// `W` ("weights") is `[in_dim, out_dim]` and `b` ("bias") is `[1, out_dim]`, both
/// drawn from `N(0, 0.1)`.
#[derive(Debug)]
pub struct LinearLayer {
    core: ModuleCore,
    weights: Tensor,
    bias: Tensor,
}

impl LinearLayer {
    pub fn new(in_dim: usize, out_dim: usize) -> Result<Self, FastRnnError> {
        Self::with_rng(in_dim, out_dim, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(in_dim: usize, out_dim: usize, rng: &mut R) -> Result<Self, FastRnnError> {
        let (weights, bias) = wandb_with_rng(in_dim, out_dim, rng)?;
        let mut layer = LinearLayer {
            core: ModuleCore::new(),
            weights: weights.clone(),
            bias: bias.clone(),
        };
        layer.register_parameters(vec![weights.into(), bias.into()])?;
        Ok(layer)
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    /// `x: [n, in_dim]` to `[n, out_dim]`.
    pub fn call(&self, x: &Tensor) -> Result<Tensor, FastRnnError> {
        linear_op(x, &self.weights, &self.bias)
    }
}

impl Module for LinearLayer {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
        let inputs = expect_inputs("LinearLayer", inputs, 1)?;
        self.call(&inputs[0])
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
