// src/tensor/traits.rs

use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::tensor::Tensor;

impl Clone for Tensor {
    /// Clones the Tensor. This is a shallow clone that increases the reference count
    /// of the underlying shared data. Gradients accumulated through one clone are
    /// visible through all others.
    fn clone(&self) -> Self {
        Tensor {
            data: Rc::clone(&self.data),
        }
    }
}

impl Debug for Tensor {
    /// Shows shape, label, producer and counters; the array itself is left to `Display`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        write!(
            f,
            "Tensor(shape={:?}, name={:?}, grad_fn={:?}, calls={}/{})",
            td.shape(),
            td.name,
            td.grad_fn.as_ref().map(|node| node.name()),
            td.forward_calls,
            td.backward_calls
        )
    }
}

impl Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.read_data().data)
    }
}
