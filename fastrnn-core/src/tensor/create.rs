// src/tensor/create.rs

use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::FastRnnError;
use crate::tensor::Tensor;

/// Creates a new leaf tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Tensor {
    Tensor::new(ArrayD::zeros(IxDyn(shape)))
}

/// Creates a new leaf tensor from flat row-major data and a shape.
///
/// # Errors
/// `FastRnnError::Layout` if the data length does not match the shape.
pub fn from_vec(data_vec: Vec<f64>, shape: &[usize]) -> Result<Tensor, FastRnnError> {
    Ok(Tensor::new(ArrayD::from_shape_vec(IxDyn(shape), data_vec)?))
}

/// Creates a rank-0 leaf tensor.
pub fn scalar(value: f64) -> Tensor {
    Tensor::new(ArrayD::from_elem(IxDyn(&[]), value))
}

/// Draws an array of `shape` from a zero-mean normal distribution with standard deviation `std`.
pub fn normal_array<R: Rng + ?Sized>(
    shape: &[usize],
    std: f64,
    rng: &mut R,
) -> Result<ArrayD<f64>, FastRnnError> {
    let normal = Normal::new(0.0, std)
        .map_err(|e| FastRnnError::InternalError(format!("invalid normal distribution: {e}")))?;
    Ok(ArrayD::from_shape_simple_fn(IxDyn(shape), || normal.sample(rng)))
}

impl Tensor {
    /// Creates a leaf tensor with entries drawn from `N(0, std)`.
    pub fn randn_with_rng<R: Rng + ?Sized>(
        shape: &[usize],
        std: f64,
        rng: &mut R,
    ) -> Result<Tensor, FastRnnError> {
        Ok(Tensor::new(normal_array(shape, std, rng)?))
    }
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
