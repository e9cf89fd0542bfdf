// src/tensor/mod.rs

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use ndarray::ArrayD;
use num_traits::ToPrimitive;

use crate::autograd::graph::NodeId;
use crate::autograd::Node;
use crate::error::FastRnnError;
use crate::tensor_data::TensorData;

mod autograd_methods;
mod traits;
pub mod create; // Make the create module public
mod view_methods;

pub mod broadcast_utils;
pub mod utils;

pub use create::{from_vec, scalar, zeros};

/// Represents a multi-dimensional value taking part in the autograd graph.
///
/// `Tensor` uses `Rc<RefCell<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** every operation that consumes a value holds a cheap
///     clone of the same handle, so a weight reused across time steps is one object.
/// 2.  **Interior Mutability:** the gradient buffer and call counters are updated
///     through shared references during the backward pass.
///
/// The engine is single-threaded; `RefCell` borrows are released before
/// any call that could re-enter the same value.
pub struct Tensor {
    pub(crate) data: Rc<RefCell<TensorData>>,
}

impl Tensor {
    /// Creates a new leaf tensor from an array. The gradient buffer starts at zero.
    pub fn new(data: ArrayD<f64>) -> Self {
        Tensor {
            data: Rc::new(RefCell::new(TensorData::new(data, None))),
        }
    }

    /// Creates a new labelled leaf tensor.
    pub fn named(data: ArrayD<f64>, name: impl Into<String>) -> Self {
        Tensor {
            data: Rc::new(RefCell::new(TensorData::new(data, Some(name.into())))),
        }
    }

    /// Creates a tensor produced by `node`.
    pub(crate) fn from_node(data: ArrayD<f64>, node: Rc<Node>, name: Option<String>) -> Self {
        let mut tensor_data = TensorData::new(data, name);
        tensor_data.grad_fn = Some(node);
        Tensor {
            data: Rc::new(RefCell::new(tensor_data)),
        }
    }

    /// Borrows the internal `TensorData` immutably.
    /// Panics if the value is currently borrowed mutably.
    pub fn read_data(&self) -> Ref<'_, TensorData> {
        self.data.borrow()
    }

    /// Borrows the internal `TensorData` mutably.
    /// Panics if the value is currently borrowed.
    pub fn write_data(&self) -> RefMut<'_, TensorData> {
        self.data.borrow_mut()
    }

    /// Borrows the numeric array.
    pub fn data(&self) -> Ref<'_, ArrayD<f64>> {
        Ref::map(self.data.borrow(), |td| &td.data)
    }

    /// Borrows the accumulated gradient.
    pub fn grad(&self) -> Ref<'_, ArrayD<f64>> {
        Ref::map(self.data.borrow(), |td| &td.grad)
    }

    /// Mutably borrows the numeric array. The shape must not change while borrowed.
    pub fn data_mut(&self) -> RefMut<'_, ArrayD<f64>> {
        RefMut::map(self.data.borrow_mut(), |td| &mut td.data)
    }

    /// Replaces the numeric array in place. The new array must keep the current shape,
    /// so the gradient buffer stays valid.
    pub fn set_data(&self, data: ArrayD<f64>) -> Result<(), FastRnnError> {
        let mut guard = self.write_data();
        if guard.shape() != data.shape() {
            return Err(FastRnnError::ShapeMismatch {
                expected: guard.shape().to_vec(),
                actual: data.shape().to_vec(),
                operation: "set_data".to_string(),
            });
        }
        guard.data = data;
        Ok(())
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape().to_vec()
    }

    /// Returns the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.read_data().data.ndim()
    }

    /// Returns the number of elements in the tensor.
    pub fn size(&self) -> usize {
        self.read_data().numel()
    }

    /// Returns the diagnostic label, if any.
    pub fn name(&self) -> Option<String> {
        self.read_data().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.write_data().name = Some(name.into());
    }

    /// Returns the node of the operation that produced this tensor.
    pub fn grad_fn(&self) -> Option<Rc<Node>> {
        self.read_data().grad_fn.clone()
    }

    /// A leaf has no producer: parameters and raw inputs.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// How many operation invocations consumed this tensor since the last `zero_grad`.
    pub fn forward_calls(&self) -> usize {
        self.read_data().forward_calls
    }

    /// How many gradient contributions this tensor received since the last `zero_grad`.
    pub fn backward_calls(&self) -> usize {
        self.read_data().backward_calls
    }

    /// True once every consumer has pushed its gradient back, i.e. the gradient buffer
    /// holds the complete sum over all fan-out branches.
    pub fn calls_balanced(&self) -> bool {
        let guard = self.read_data();
        guard.forward_calls == guard.backward_calls
    }

    /// Returns the single element of a one-element tensor.
    pub fn item(&self) -> Result<f64, FastRnnError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(FastRnnError::ShapeMismatch {
                expected: vec![1],
                actual: guard.shape().to_vec(),
                operation: "item".to_string(),
            });
        }
        guard
            .data
            .iter()
            .next()
            .copied()
            .ok_or_else(|| FastRnnError::InternalError("one-element tensor without data".to_string()))
    }

    /// Converts the data to integer indices, truncating toward zero.
    /// Negative or non-finite values are rejected.
    pub fn astype_usize(&self) -> Result<ArrayD<usize>, FastRnnError> {
        let guard = self.read_data();
        let mut indices = Vec::with_capacity(guard.numel());
        for &value in guard.data.iter() {
            let index = value.trunc().to_usize().ok_or(FastRnnError::IndexOutOfBounds {
                index: value as i64,
                bound: usize::MAX,
                operation: "astype_usize".to_string(),
            })?;
            indices.push(index);
        }
        Ok(ArrayD::from_shape_vec(guard.data.raw_dim(), indices)?)
    }

    /// Checks whether two handles point to the same value.
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Stable identity of this value inside the graph.
    pub(crate) fn node_id(&self) -> NodeId {
        Rc::as_ptr(&self.data)
    }
}
