// src/tensor_data.rs
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::Rc;

use ndarray::ArrayD;

use crate::autograd::Node;

/// Internal storage and autograd metadata for a Tensor.
///
/// This struct holds the numeric array, its gradient buffer, the graph node that
/// produced it, and the call counters used to audit fan-out during backward.
/// It is wrapped in `Rc<RefCell<TensorData>>` by the `Tensor` struct so that every
/// operation holding the same value observes and accumulates into one buffer.
pub struct TensorData {
    /// The numeric array.
    pub(crate) data: ArrayD<f64>,
    /// Accumulated gradient, always the same shape as `data`.
    pub(crate) grad: ArrayD<f64>,
    /// The node of the operation that computed this value. `None` for leaves
    /// (parameters and raw inputs).
    pub(crate) grad_fn: Option<Rc<Node>>,
    /// Number of operation invocations that consumed this value.
    pub(crate) forward_calls: usize,
    /// Number of gradient contributions this value has received.
    pub(crate) backward_calls: usize,
    /// Diagnostic label. Also the key of the value inside a state dict.
    pub(crate) name: Option<String>,
}

impl TensorData {
    /// Creates a leaf record with a zeroed gradient buffer.
    pub(crate) fn new(data: ArrayD<f64>, name: Option<String>) -> Self {
        let grad = ArrayD::zeros(data.raw_dim());
        TensorData {
            data,
            grad,
            grad_fn: None,
            forward_calls: 0,
            backward_calls: 0,
            name,
        }
    }

    pub(crate) fn numel(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

// Manual implementation of Debug: the node is summarised by its op name.
impl Debug for TensorData {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TensorData")
            .field("shape", &self.data.shape())
            .field("name", &self.name)
            .field("grad_fn", &self.grad_fn.as_ref().map(|node| node.name()))
            .field("forward_calls", &self.forward_calls)
            .field("backward_calls", &self.backward_calls)
            .finish()
    }
}
