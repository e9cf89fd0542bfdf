use ndarray::{Array2, Array3};

use crate::error::FastRnnError;
use crate::tensor::Tensor;

/// One indicator row per class index: `[indices.len(), vocab]`.
///
/// # Errors
/// `IndexOutOfBounds` if an index is not below `vocab`.
pub(crate) fn one_hot_rows(indices: &[usize], vocab: usize, operation: &str) -> Result<Array2<f64>, FastRnnError> {
    let mut encoded = Array2::zeros((indices.len(), vocab));
    for (row, &class) in indices.iter().enumerate() {
        if class >= vocab {
            return Err(FastRnnError::IndexOutOfBounds {
                index: class as i64,
                bound: vocab,
                operation: operation.to_string(),
            });
        }
        encoded[[row, class]] = 1.0;
    }
    Ok(encoded)
}

/// Encodes integer class data of shape `[seq, batch]` as a `[seq, batch, vocab]`
/// indicator value. The result is a new leaf.
///
/// # Errors
/// - `DimensionMismatch` if `inputs` is not 2-D.
/// - `IndexOutOfBounds` for negative indices or indices not below `vocab`.
pub fn one_hot_encoder(inputs: &Tensor, vocab: usize) -> Result<Tensor, FastRnnError> {
    let shape = inputs.shape();
    if shape.len() != 2 {
        return Err(FastRnnError::DimensionMismatch {
            expected: 2,
            actual: shape.len(),
            operation: "one_hot_encoder".to_string(),
        });
    }
    let (seq_len, batch_size) = (shape[0], shape[1]);
    let indices: Vec<usize> = inputs.astype_usize()?.iter().copied().collect();
    let encoded = one_hot_rows(&indices, vocab, "one_hot_encoder")?;
    let encoded: Array3<f64> = encoded.into_shape((seq_len, batch_size, vocab))?;
    Ok(Tensor::new(encoded.into_dyn()))
}
