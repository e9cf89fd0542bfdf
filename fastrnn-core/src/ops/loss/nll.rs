use ndarray::{Array2, ArrayD, IxDyn};

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::activation::softmax_rows;
use crate::ops::apply;
use crate::ops::encoding::one_hot_rows;
use crate::tensor::utils::{last_axis, reshape_array};
use crate::tensor::Tensor;

/// Added to the probabilities before taking the logarithm.
pub const DEFAULT_NLL_EPS: f64 = 1e-15;

// --- Operation Structure ---

/// Negative log-likelihood of integer targets under the softmax of raw scores.
///
/// `y_hat` holds raw scores whose last axis is the class axis (typically
/// `[seq, batch, C]`); `y` holds one class index per score row (typically `[seq, batch]`).
/// The loss is the mean over rows of `-log(softmax(y_hat)[target] + eps)`.
///
/// The backward pass does not go through a separate softmax: the gradient on `y_hat` is
/// `(softmax(y_hat) - onehot(y)) / rows`, scaled by the upstream scalar. Do not feed the
/// output of a standalone softmax into this op, the probabilities are computed here.
#[derive(Debug)]
pub struct NllFn {
    y_hat: Tensor,
    y: Tensor,
    eps: f64,
    probs: Option<Array2<f64>>,
    targets: Option<Array2<f64>>,
}

impl NllFn {
    pub fn new(y_hat: &Tensor, y: &Tensor, eps: f64) -> Self {
        NllFn {
            y_hat: y_hat.clone(),
            y: y.clone(),
            eps,
            probs: None,
            targets: None,
        }
    }

    /// Softmax probabilities computed by the last forward pass, one row per target.
    pub fn probs(&self) -> Option<&Array2<f64>> {
        self.probs.as_ref()
    }
}

// --- Function Implementation ---

impl Function for NllFn {
    fn name(&self) -> &'static str {
        "nll"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let scores_shape = self.y_hat.shape();
        let classes = scores_shape[last_axis(&scores_shape, "nll")?];
        let rows = self.y.size();
        if rows == 0 || rows * classes != self.y_hat.size() {
            return Err(FastRnnError::ShapeMismatch {
                expected: vec![rows, classes],
                actual: scores_shape,
                operation: "nll".to_string(),
            });
        }

        let scores = reshape_array(&self.y_hat.data(), &[rows, classes], "nll")?;
        let probs = softmax_rows(&scores)?.into_dimensionality::<ndarray::Ix2>()?;
        let indices: Vec<usize> = self.y.astype_usize()?.iter().copied().collect();
        let targets = one_hot_rows(&indices, classes, "nll")?;

        let eps = self.eps;
        let log_likelihood: f64 = (&targets * &probs.mapv(|p| (p + eps).ln())).sum();
        let loss = -log_likelihood / rows as f64;

        self.probs = Some(probs);
        self.targets = Some(targets);
        Ok(ArrayD::from_elem(IxDyn(&[]), loss))
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let (Some(probs), Some(targets)) = (&self.probs, &self.targets) else {
            return Err(FastRnnError::InternalError(
                "nll: backward before forward".to_string(),
            ));
        };
        let upstream = grad_output.sum();
        let rows = probs.nrows() as f64;
        let grad = (probs - targets) * (upstream / rows);
        let grad_y_hat = reshape_array(&grad.into_dyn(), &self.y_hat.shape(), "nll backward")?;
        Ok(vec![Some(grad_y_hat), None])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.y_hat.clone(), self.y.clone()]
    }
}

// --- Forward Operation ---

/// Mean negative log-likelihood of `y` under `softmax(y_hat)`, as a rank-0 value.
///
/// # Errors
/// - `ShapeMismatch` if `y` does not hold exactly one target per score row.
/// - `IndexOutOfBounds` if a target is negative or not below the class count.
pub fn nll_op(y_hat: &Tensor, y: &Tensor, eps: f64) -> Result<Tensor, FastRnnError> {
    apply(NllFn::new(y_hat, y, eps))
}

#[cfg(test)]
#[path = "nll_test.rs"]
mod tests;
