use rand::Rng;

use crate::error::FastRnnError;
use crate::nn::init::{normal_with_rng, DEFAULT_INIT_STD};
use crate::nn::module::{expect_inputs, Module, ModuleCore};
use crate::ops::embedding_op;
use crate::tensor::Tensor;

/// A lookup table `E: [vocab_size, emb_size]` ("E") drawn from `N(0, 0.1)`.
#[derive(Debug)]
pub struct Embedding {
    core: ModuleCore,
    table: Tensor,
}

impl Embedding {
    pub fn new(vocab_size: usize, emb_size: usize) -> Result<Self, FastRnnError> {
        Self::with_rng(vocab_size, emb_size, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(vocab_size: usize, emb_size: usize, rng: &mut R) -> Result<Self, FastRnnError> {
        let table = normal_with_rng(&[vocab_size, emb_size], DEFAULT_INIT_STD, "E", rng)?;
        let mut embedding = Embedding {
            core: ModuleCore::new(),
            table: table.clone(),
        };
        embedding.register_parameters(vec![table.into()])?;
        Ok(embedding)
    }

    pub fn table(&self) -> &Tensor {
        &self.table
    }

    /// Integer indices of any shape to `indices.shape + [emb_size]`.
    pub fn call(&self, indices: &Tensor) -> Result<Tensor, FastRnnError> {
        embedding_op(indices, &self.table)
    }
}

impl Module for Embedding {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
        let inputs = expect_inputs("Embedding", inputs, 1)?;
        self.call(&inputs[0])
    }
}
