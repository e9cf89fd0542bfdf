// src/ops/loss/mod.rs

//! # Loss Functions
//!
//! Terminal operations producing a scalar. A loss is the usual starting point of
//! `backward(None)`: its backward formula already contains the derivative of the
//! scalar with respect to itself.

pub mod nll;

pub use nll::{nll_op, NllFn, DEFAULT_NLL_EPS};
