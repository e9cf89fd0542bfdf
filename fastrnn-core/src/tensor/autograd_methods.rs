use ndarray::{ArrayD, IxDyn};

use crate::autograd::graph::run_backward;
use crate::error::FastRnnError;
use crate::tensor::Tensor;

impl Tensor {
    /// Performs the backward pass starting from this tensor.
    ///
    /// # Arguments
    /// * `gradient`: upstream gradient for this tensor.
    ///   - `Some(g)`: `g` must have exactly this tensor's shape. It is added to the
    ///     gradient buffer, the backward counter is incremented, and `g` is pushed
    ///     through the producer graph.
    ///   - `None`: used on a terminal loss. The backward counter is incremented and an
    ///     upstream of ones is pushed through the producer graph; the loss operation
    ///     carries the actual derivative. The tensor's own buffer is not touched.
    ///
    /// # Errors
    /// Returns `FastRnnError::ShapeMismatch` if `g` has the wrong shape; nothing is
    /// accumulated in that case. Errors raised by operations during propagation are
    /// returned as-is.
    pub fn backward(&self, gradient: Option<&ArrayD<f64>>) -> Result<(), FastRnnError> {
        match gradient {
            Some(grad) => {
                self.accumulate_grad(grad, "backward")?;
                if self.grad_fn().is_some() {
                    run_backward(self, grad.clone())?;
                }
            }
            None => {
                self.write_data().backward_calls += 1;
                if self.grad_fn().is_some() {
                    let seed = ArrayD::ones(IxDyn(&self.shape()));
                    run_backward(self, seed)?;
                }
            }
        }
        Ok(())
    }

    /// Resets the gradient buffer to zeros and both call counters to zero.
    /// Does not touch the producer or any input.
    pub fn zero_grad(&self) {
        let mut guard = self.write_data();
        guard.grad.fill(0.0);
        guard.forward_calls = 0;
        guard.backward_calls = 0;
    }

    /// Adds one gradient contribution to the buffer and counts it.
    pub(crate) fn accumulate_grad(
        &self,
        grad: &ArrayD<f64>,
        operation: &str,
    ) -> Result<(), FastRnnError> {
        let mut guard = self.write_data();
        if guard.grad.shape() != grad.shape() {
            return Err(FastRnnError::ShapeMismatch {
                expected: guard.grad.shape().to_vec(),
                actual: grad.shape().to_vec(),
                operation: operation.to_string(),
            });
        }
        guard.grad += grad;
        guard.backward_calls += 1;
        Ok(())
    }

    /// Counts one operation invocation that consumed this tensor.
    pub(crate) fn record_forward_call(&self) {
        self.write_data().forward_calls += 1;
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
