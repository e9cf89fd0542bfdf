use crate::error::FastRnnError;
use crate::nn::module::{expect_inputs, Module, ModuleCore};
use crate::ops::{sigmoid_op, softmax_op, tanh_op};
use crate::tensor::Tensor;

macro_rules! activation_layer {
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

            pub fn call(&self, x: &Tensor) -> Result<Tensor, FastRnnError> {
                $op(x)
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
                let inputs = expect_inputs(stringify!($name), inputs, 1)?;
                self.call(&inputs[0])
            }
        }
    };
}

activation_layer!(
    /// Elementwise logistic function.
    SigmoidLayer,
    sigmoid_op
);
activation_layer!(
    /// Elementwise hyperbolic tangent.
    TanhLayer,
    tanh_op
);
activation_layer!(
    /// Softmax over the last axis. Not meant to feed [`crate::nn::CrossEntropyLoss`],
    /// which applies its own softmax to raw scores.
    SoftmaxLayer,
    softmax_op
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{check_tensor_near, create_test_tensor};

    #[test]
    fn test_activation_layers_have_no_parameters() {
        assert_eq!(SigmoidLayer::new().size(), 0);
        assert!(TanhLayer::new().parameters().is_empty());
        assert!(SoftmaxLayer::new().snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_activation_layers_forward() {
        let x = create_test_tensor(vec![0.0, 0.0], &[1, 2]);
        check_tensor_near(&SigmoidLayer::new().forward(&[x.clone()]).unwrap(), &[1, 2], &[0.5, 0.5], 1e-12);
        check_tensor_near(&TanhLayer::new().forward(&[x.clone()]).unwrap(), &[1, 2], &[0.0, 0.0], 1e-12);
        check_tensor_near(&SoftmaxLayer::new().forward(&[x]).unwrap(), &[1, 2], &[0.5, 0.5], 1e-12);
    }

    #[test]
    fn test_activation_layer_arity() {
        assert!(matches!(
            TanhLayer::new().forward(&[]),
            Err(FastRnnError::DimensionMismatch { expected: 1, actual: 0, .. })
        ));
    }
}
