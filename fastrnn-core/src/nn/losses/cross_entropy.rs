use crate::error::FastRnnError;
use crate::nn::module::{expect_inputs, Module, ModuleCore};
use crate::ops::{nll_op, DEFAULT_NLL_EPS};
use crate::tensor::Tensor;

/// Cross-entropy between raw scores and integer targets.
///
/// The softmax is folded into the loss: pass the raw scores, not probabilities.
/// The result is a scalar; call `backward(None)` on it to start training.
#[derive(Debug)]
pub struct CrossEntropyLoss {
    core: ModuleCore,
    eps: f64,
}

impl Default for CrossEntropyLoss {
    fn default() -> Self {
        CrossEntropyLoss::with_eps(DEFAULT_NLL_EPS)
    }
}

impl CrossEntropyLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eps(eps: f64) -> Self {
        CrossEntropyLoss {
            core: ModuleCore::new(),
            eps,
        }
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// `output: [.., C]` raw scores, `target`: one class index per score row.
    pub fn call(&self, output: &Tensor, target: &Tensor) -> Result<Tensor, FastRnnError> {
        nll_op(output, target, self.eps)
    }
}

impl Module for CrossEntropyLoss {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
        let inputs = expect_inputs("CrossEntropyLoss", inputs, 2)?;
        self.call(&inputs[0], &inputs[1])
    }
}
