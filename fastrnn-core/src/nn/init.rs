//! Parameter initializers.

use rand::Rng;

use crate::error::FastRnnError;
use crate::tensor::create::normal_array;
use crate::tensor::Tensor;

/// Standard deviation of the normal initializers.
pub const DEFAULT_INIT_STD: f64 = 0.1;

/// Overwrites every weight in place with `N(0, 1) * sqrt(2 / (fan_in + fan_out))`,
/// where `fan_in` and `fan_out` are the last two dimensions.
///
/// # Errors
/// `DimensionMismatch` if any weight has fewer than two dimensions. Nothing is
/// overwritten in that case.
pub fn xavier_(weights: &[Tensor]) -> Result<(), FastRnnError> {
    xavier_with_rng(weights, &mut rand::thread_rng())
}

pub fn xavier_with_rng<R: Rng + ?Sized>(weights: &[Tensor], rng: &mut R) -> Result<(), FastRnnError> {
    for weight in weights {
        if weight.ndim() < 2 {
            return Err(FastRnnError::DimensionMismatch {
                expected: 2,
                actual: weight.ndim(),
                operation: "xavier_".to_string(),
            });
        }
    }
    for weight in weights {
        let shape = weight.shape();
        let (fan_in, fan_out) = (shape[shape.len() - 2], shape[shape.len() - 1]);
        let scale = (2.0 / (fan_in + fan_out) as f64).sqrt();
        let values = normal_array(&shape, 1.0, rng)? * scale;
        weight.set_data(values)?;
    }
    Ok(())
}

/// A labelled weight `[in_dim, out_dim]` ("weights") and bias `[1, out_dim]` ("bias"),
/// both drawn from `N(0, DEFAULT_INIT_STD)`.
pub fn wandb(in_dim: usize, out_dim: usize) -> Result<(Tensor, Tensor), FastRnnError> {
    wandb_with_rng(in_dim, out_dim, &mut rand::thread_rng())
}

pub fn wandb_with_rng<R: Rng + ?Sized>(
    in_dim: usize,
    out_dim: usize,
    rng: &mut R,
) -> Result<(Tensor, Tensor), FastRnnError> {
    let weights = normal_with_rng(&[in_dim, out_dim], DEFAULT_INIT_STD, "weights", rng)?;
    let bias = normal_with_rng(&[1, out_dim], DEFAULT_INIT_STD, "bias", rng)?;
    Ok((weights, bias))
}

/// A labelled leaf drawn from `N(0, std)`.
pub fn normal_with_rng<R: Rng + ?Sized>(
    shape: &[usize],
    std: f64,
    label: &str,
    rng: &mut R,
) -> Result<Tensor, FastRnnError> {
    Ok(Tensor::named(normal_array(shape, std, rng)?, label))
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
