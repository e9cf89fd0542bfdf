//! Reverse-mode automatic differentiation.
//!
//! Values record the [`Node`] that produced them. A backward pass sorts the graph
//! reachable from the starting value and walks it in reverse, accumulating every
//! contribution into the gradient buffers of the values it reaches.

pub mod backward_op;
pub mod grad_check;
pub(crate) mod graph;

pub use backward_op::{Function, Node};
pub use grad_check::{check_grad, GradCheckError};
