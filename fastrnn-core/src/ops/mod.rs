//! # Operation catalog (`ops`)
//!
//! Every differentiable primitive of the engine lives here, grouped by family.
//!
//! ## Structure:
//!
//! - **`Fn` structs:** each operation is a struct implementing
//!   [`Function`](crate::autograd::Function). It holds its input values and whatever it
//!   caches during `forward` (activations, probabilities) for use in `backward`.
//! - **`_op` functions:** each operation has a shorthand (`linear_op`, `sigmoid_op`, ...)
//!   that builds a fresh instance and runs it through [`apply`].
//! - **[`apply`]:** the single invocation path. It evaluates the forward pass, counts one
//!   forward call on every input value and attaches the graph node to the output.
//!
//! ## Submodules:
//!
//! - [`activation`]: sigmoid, tanh and last-axis softmax.
//! - [`arithmetic`]: broadcasting elementwise add and multiply.
//! - [`encoding`]: one-hot encoding of integer class data.
//! - [`indexing`]: embedding lookup and row selection.
//! - [`linalg`]: the affine map `x·W + b`.
//! - [`loss`]: negative log-likelihood over softmax scores.
//! - [`stack`]: horizontal and vertical concatenation.

use std::rc::Rc;

use log::trace;

use crate::autograd::{Function, Node};
use crate::error::FastRnnError;
use crate::tensor::Tensor;

pub mod activation;
pub mod arithmetic;
pub mod encoding;
pub mod indexing;
pub mod linalg;
pub mod loss;
pub mod stack;

pub use activation::{sigmoid, sigmoid_op, softmax_op, softmax_rows, tanh, tanh_op};
pub use arithmetic::{add_op, mul_op};
pub use encoding::one_hot_encoder;
pub use indexing::{embedding_op, row_op};
pub use linalg::linear_op;
pub use loss::{nll_op, DEFAULT_NLL_EPS};
pub use stack::{hstack_op, vstack_op};

/// Evaluates `op` and records it in the graph.
///
/// After a successful forward pass every input value gets one more forward call,
/// then the output is created with a node that owns `op` and remembers the output
/// shape. A failing forward pass leaves all counters untouched.
pub fn apply<F: Function + 'static>(mut op: F) -> Result<Tensor, FastRnnError> {
    let output = op.forward()?;
    let inputs = op.inputs();
    for input in &inputs {
        input.record_forward_call();
    }
    let name = op.name();
    trace!("{}: {} inputs -> {:?}", name, inputs.len(), output.shape());
    let node = Rc::new(Node::new(Box::new(op), output.shape().to_vec()));
    Ok(Tensor::from_node(output, node, Some(name.to_string())))
}

/// Clones the data of `tensor` into a fixed-rank array.
///
/// # Errors
/// `FastRnnError::DimensionMismatch` naming `operation` if the rank differs from `D`'s.
pub(crate) fn data_as<D: ndarray::Dimension>(
    tensor: &Tensor,
    operation: &str,
) -> Result<ndarray::Array<f64, D>, FastRnnError> {
    let data = tensor.data().clone();
    let ndim = data.ndim();
    data.into_dimensionality::<D>()
        .map_err(|_| FastRnnError::DimensionMismatch {
            expected: D::NDIM.unwrap_or(ndim),
            actual: ndim,
            operation: operation.to_string(),
        })
}
