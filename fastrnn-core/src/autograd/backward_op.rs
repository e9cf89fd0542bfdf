use std::fmt::Debug;

use ndarray::ArrayD;

use crate::error::FastRnnError;
use crate::tensor::Tensor;

/// One differentiable primitive.
///
/// An instance is created fresh for every invocation, evaluated once through
/// [`crate::ops::apply`], and then kept alive only by the graph node attached to
/// its output value until that output is dropped.
pub trait Function: Debug {
    /// Short name of the primitive, also used as the label of its output value.
    fn name(&self) -> &'static str;

    /// Computes the forward result. May cache activations needed by `backward`.
    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError>;

    /// Computes the gradients with respect to the inputs, given the gradient of the
    /// output (`grad_output`, same shape as the forward result).
    ///
    /// # Returns
    /// One entry per element of [`Function::inputs`], in the same order. `None` marks
    /// an input that does not receive a gradient (e.g. lookup indices). Each `Some`
    /// gradient has exactly the shape of the corresponding input.
    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError>;

    /// Every value held by this invocation. All of them are counted as consumed by
    /// one forward call; the graph traversal follows them backwards.
    fn inputs(&self) -> Vec<Tensor>;
}

/// A node of the computation graph: an evaluated [`Function`] plus the shape of the
/// output it produced.
///
/// The recorded shape lets the engine route gradients arriving through reshaped or
/// transposed aliases of the output back into the operation.
#[derive(Debug)]
pub struct Node {
    op: Box<dyn Function>,
    output_shape: Vec<usize>,
}

impl Node {
    pub(crate) fn new(op: Box<dyn Function>, output_shape: Vec<usize>) -> Self {
        Node { op, output_shape }
    }

    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    pub fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    /// The input values of the operation, i.e. the incoming edges of this node.
    pub fn inputs(&self) -> Vec<Tensor> {
        self.op.inputs()
    }

    pub fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        self.op.backward(grad_output)
    }
}
