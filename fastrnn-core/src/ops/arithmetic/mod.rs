// src/ops/arithmetic/mod.rs

//! Elementwise arithmetic with NumPy-style broadcasting.
//!
//! The backward pass of every op here sums the gradient over the broadcast axes, so
//! each input receives a gradient of its own shape.

pub mod add;
pub mod mul;

pub use add::{add_op, AddFn};
pub use mul::{mul_op, MulFn};
