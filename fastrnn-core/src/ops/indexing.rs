use ndarray::{ArrayD, Axis, Ix2, IxDyn};

use crate::autograd::Function;
use crate::error::FastRnnError;
use crate::ops::{apply, data_as};
use crate::tensor::utils::reshape_array;
use crate::tensor::Tensor;

// --- Embedding ---

/// Table lookup: gathers rows of `E: [V, d]` at the integer positions held in `indices`.
///
/// The output has shape `indices.shape + [d]`. Indices are counted as an input but
/// never receive a gradient.
#[derive(Debug)]
pub struct EmbeddingFn {
    indices: Tensor,
    table: Tensor,
}

impl EmbeddingFn {
    pub fn new(indices: &Tensor, table: &Tensor) -> Self {
        EmbeddingFn {
            indices: indices.clone(),
            table: table.clone(),
        }
    }

    fn checked_indices(&self, vocab: usize) -> Result<Vec<usize>, FastRnnError> {
        let indices = self.indices.astype_usize()?;
        indices
            .iter()
            .map(|&i| {
                if i < vocab {
                    Ok(i)
                } else {
                    Err(FastRnnError::IndexOutOfBounds {
                        index: i as i64,
                        bound: vocab,
                        operation: "embedding".to_string(),
                    })
                }
            })
            .collect()
    }
}

impl Function for EmbeddingFn {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let table = data_as::<Ix2>(&self.table, "embedding (table rank)")?;
        let (vocab, dim) = table.dim();
        let indices = self.checked_indices(vocab)?;

        let mut values = Vec::with_capacity(indices.len() * dim);
        for &i in &indices {
            values.extend(table.row(i).iter().copied());
        }
        let mut output_shape = self.indices.shape();
        output_shape.push(dim);
        Ok(ArrayD::from_shape_vec(IxDyn(&output_shape), values)?)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let table_shape = self.table.shape();
        let (vocab, dim) = (table_shape[0], table_shape[1]);
        let indices = self.checked_indices(vocab)?;
        let grad = reshape_array(grad_output, &[indices.len(), dim], "embedding backward")?
            .into_dimensionality::<Ix2>()?;

        // Scatter-add: repeated indices sum their rows.
        let mut grad_table = ndarray::Array2::<f64>::zeros((vocab, dim));
        for (row, &i) in indices.iter().enumerate() {
            let mut target = grad_table.row_mut(i);
            target += &grad.row(row);
        }
        Ok(vec![None, Some(grad_table.into_dyn())])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.indices.clone(), self.table.clone()]
    }
}

/// Looks up the rows of `table` named by `indices`.
///
/// # Errors
/// - `DimensionMismatch` if `table` is not 2-D.
/// - `IndexOutOfBounds` if an index is negative, not finite or not below the table height.
pub fn embedding_op(indices: &Tensor, table: &Tensor) -> Result<Tensor, FastRnnError> {
    apply(EmbeddingFn::new(indices, table))
}

// --- Row select ---

/// Extracts entry `index` along the first axis.
#[derive(Debug)]
pub struct RowFn {
    x: Tensor,
    index: usize,
}

impl RowFn {
    pub fn new(x: &Tensor, index: usize) -> Self {
        RowFn { x: x.clone(), index }
    }
}

impl Function for RowFn {
    fn name(&self) -> &'static str {
        "row"
    }

    fn forward(&mut self) -> Result<ArrayD<f64>, FastRnnError> {
        let data = self.x.data();
        if data.ndim() == 0 {
            return Err(FastRnnError::DimensionMismatch {
                expected: 1,
                actual: 0,
                operation: "row".to_string(),
            });
        }
        let rows = data.shape()[0];
        if self.index >= rows {
            return Err(FastRnnError::IndexOutOfBounds {
                index: self.index as i64,
                bound: rows,
                operation: "row".to_string(),
            });
        }
        let row = data.index_axis(Axis(0), self.index).to_owned();
        Ok(row)
    }

    fn backward(&self, grad_output: &ArrayD<f64>) -> Result<Vec<Option<ArrayD<f64>>>, FastRnnError> {
        let mut grad_x = ArrayD::zeros(IxDyn(&self.x.shape()));
        grad_x.index_axis_mut(Axis(0), self.index).assign(grad_output);
        Ok(vec![Some(grad_x)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }
}

/// Selects row `index` of `x`.
///
/// # Errors
/// - `DimensionMismatch` for rank-0 input.
/// - `IndexOutOfBounds` if `index` is not below the first dimension.
pub fn row_op(x: &Tensor, index: usize) -> Result<Tensor, FastRnnError> {
    apply(RowFn::new(x, index))
}

#[cfg(test)]
#[path = "indexing_test.rs"]
mod tests;
