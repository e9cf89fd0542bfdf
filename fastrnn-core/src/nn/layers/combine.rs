//! Parameter-free layers that combine or select values.

use crate::error::FastRnnError;
use crate::nn::module::{expect_inputs, Module, ModuleCore};
use crate::ops::{add_op, hstack_op, mul_op, row_op, vstack_op};
use crate::tensor::Tensor;

macro_rules! binary_layer {
    ($(#[$doc:meta])* $name:ident, $op:path) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            core: ModuleCore,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn call(&self, x1: &Tensor, x2: &Tensor) -> Result<Tensor, FastRnnError> {
                $op(x1, x2)
            }
        }

        impl Module for $name {
            fn core(&self) -> &ModuleCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut ModuleCore {
                &mut self.core
            }

            fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
                let inputs = expect_inputs(stringify!($name), inputs, 2)?;
                self.call(&inputs[0], &inputs[1])
            }
        }
    };
}

binary_layer!(
    /// Concatenation along the last axis.
    HStack,
    hstack_op
);
binary_layer!(
    /// Concatenation along the first axis.
    VStack,
    vstack_op
);
binary_layer!(
    /// Elementwise product with broadcasting.
    Multiply,
    mul_op
);
binary_layer!(
    /// Elementwise sum with broadcasting.
    Sum,
    add_op
);

/// Selects one entry along the first axis.
#[derive(Debug, Default)]
pub struct Row {
    core: ModuleCore,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call(&self, x: &Tensor, index: usize) -> Result<Tensor, FastRnnError> {
        row_op(x, index)
    }
}

impl Module for Row {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    /// `inputs = [x, index]`, the index being a one-element value.
    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
        let inputs = expect_inputs("Row", inputs, 2)?;
        let index = inputs[1].astype_usize()?;
        match index.iter().next() {
            Some(&i) if index.len() == 1 => self.call(&inputs[0], i),
            _ => Err(FastRnnError::ShapeMismatch {
                expected: vec![1],
                actual: index.shape().to_vec(),
                operation: "Row::forward".to_string(),
            }),
        }
    }
}
