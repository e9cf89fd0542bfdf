// src/ops/activation/mod.rs

//! # Activation Functions
//!
//! Non-linearities of the engine. Each op caches its forward output and derives its
//! local gradient from it.
//!
//! - [`sigmoid_op`]: logistic function `1 / (1 + e^-x)`.
//! - [`tanh_op`]: hyperbolic tangent.
//! - [`softmax_op`]: numerically stable softmax over the last axis.
//!
//! The plain array versions ([`sigmoid`], [`tanh`], [`softmax_rows`]) are exposed for
//! callers that need the numbers without a graph.

pub mod sigmoid;
pub mod softmax;
pub mod tanh;

pub use sigmoid::{sigmoid, sigmoid_op, SigmoidFn};
pub use softmax::{softmax_op, softmax_rows, SoftmaxFn};
pub use tanh::{tanh, tanh_op, TanhFn};

use ndarray::ArrayD;

use crate::error::FastRnnError;

pub(crate) fn cached<'a>(
    output: &'a Option<ArrayD<f64>>,
    operation: &str,
) -> Result<&'a ArrayD<f64>, FastRnnError> {
    output
        .as_ref()
        .ok_or_else(|| FastRnnError::InternalError(format!("{operation}: backward before forward")))
}
