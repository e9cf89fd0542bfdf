//! A small reverse-mode autodiff engine for recurrent language models.
//!
//! Values ([`Tensor`]) record the operation that produced them; `backward` walks that
//! graph and accumulates gradients, counting every forward use and every gradient
//! contribution per value. Trainable containers ([`nn::Module`]) own parameters and
//! persist them as JSON state dicts.

pub mod autograd;
pub mod error;
pub mod model;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

// Re-export the main types so they are reachable as `fastrnn_core::Tensor`
pub use error::FastRnnError;
pub use tensor::Tensor;
// Re-export the array crate used in the public API
pub use ndarray;
