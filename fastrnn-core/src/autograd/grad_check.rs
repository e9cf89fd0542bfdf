use approx::relative_eq;
use ndarray::ArrayD;
use thiserror::Error;

use crate::error::FastRnnError;
use crate::tensor::Tensor;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug)]
pub enum GradCheckError {
    #[error("Gradient check failed for input tensor at index {input_index}, element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(FastRnnError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(FastRnnError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(FastRnnError),
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Gradient check input tensor must be a leaf node (no grad_fn). Input index: {input_index}")]
    InputNotLeaf { input_index: usize },
    #[error("Output gradient shape {actual:?} does not match function output shape {expected:?}")]
    OutputShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

impl From<FastRnnError> for GradCheckError {
    fn from(err: FastRnnError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks analytical gradients against numerical gradients using central finite differences.
///
/// The scalar being differentiated is `sum(func(inputs) * output_grad)`, so the
/// analytical side is obtained with `func(inputs).backward(Some(output_grad))`.
/// Every input must be a leaf; its gradient buffer and counters are reset first.
/// Input data is restored after each perturbation.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &ArrayD<f64>,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, FastRnnError>,
{
    for (i, input) in inputs.iter().enumerate() {
        if !input.is_leaf() {
            return Err(GradCheckError::InputNotLeaf { input_index: i });
        }
        input.zero_grad();
    }

    // --- 1. Analytical gradients ---
    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;
    if output.shape() != output_grad.shape() {
        return Err(GradCheckError::OutputShapeMismatch {
            expected: output.shape(),
            actual: output_grad.shape().to_vec(),
        });
    }
    output
        .backward(Some(output_grad))
        .map_err(GradCheckError::BackwardPassError)?;
    let analytical: Vec<ArrayD<f64>> = inputs.iter().map(|t| t.grad().clone()).collect();

    // --- 2. Numerical gradients, one element at a time ---
    for (i, input) in inputs.iter().enumerate() {
        let original = input.data().clone();
        for (elem_idx, analytical_grad) in analytical[i].iter().copied().enumerate() {
            let loss_plus = perturbed_loss(&func, inputs, input, &original, elem_idx, epsilon, output_grad)?;
            let loss_minus = perturbed_loss(&func, inputs, input, &original, elem_idx, -epsilon, output_grad)?;
            input.set_data(original.clone())?;

            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                    loss_plus,
                    loss_minus,
                });
            }
            if !relative_eq!(
                analytical_grad,
                numerical_grad,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: elem_idx,
                    analytical_grad,
                    numerical_grad,
                    difference: (analytical_grad - numerical_grad).abs(),
                });
            }
        }
    }
    Ok(())
}

/// Evaluates `sum(func(inputs) * output_grad)` with one element of `input` shifted by `delta`.
fn perturbed_loss<F>(
    func: &F,
    inputs: &[Tensor],
    input: &Tensor,
    original: &ArrayD<f64>,
    elem_idx: usize,
    delta: f64,
    output_grad: &ArrayD<f64>,
) -> Result<f64, GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, FastRnnError>,
{
    let mut shifted = original.clone();
    if let Some(value) = shifted.iter_mut().nth(elem_idx) {
        *value += delta;
    }
    input.set_data(shifted)?;
    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;
    let data = output.data();
    let loss: f64 = data.iter().zip(output_grad.iter()).map(|(o, g)| o * g).sum();
    Ok(loss)
}
