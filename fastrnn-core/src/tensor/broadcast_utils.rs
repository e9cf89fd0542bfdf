// src/tensor/broadcast_utils.rs

use ndarray::{ArrayD, Axis};

use crate::error::FastRnnError;
use crate::tensor::utils::reshape_array;

/// Computes the NumPy-style broadcast shape of two shapes.
///
/// Shapes are aligned from the trailing dimension; a dimension of size 1 stretches
/// to match the other one.
pub fn broadcast_shapes(shape1: &[usize], shape2: &[usize]) -> Result<Vec<usize>, FastRnnError> {
    let ndim = shape1.len().max(shape2.len());
    let mut result = vec![1usize; ndim];
    for i in 0..ndim {
        let d1 = dim_from_end(shape1, ndim - 1 - i);
        let d2 = dim_from_end(shape2, ndim - 1 - i);
        result[i] = match (d1, d2) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(FastRnnError::BroadcastError {
                    shape1: shape1.to_vec(),
                    shape2: shape2.to_vec(),
                })
            }
        };
    }
    Ok(result)
}

fn dim_from_end(shape: &[usize], offset: usize) -> usize {
    if offset < shape.len() {
        shape[shape.len() - 1 - offset]
    } else {
        1
    }
}

/// Sums `grad` over the axes that were broadcast so that it matches `target_shape`.
///
/// This is the backward counterpart of broadcasting: every input element that was
/// stretched over several output positions collects the gradient of all of them.
pub fn reduce_to_shape(
    grad: &ArrayD<f64>,
    target_shape: &[usize],
) -> Result<ArrayD<f64>, FastRnnError> {
    if grad.shape() == target_shape {
        return Ok(grad.clone());
    }
    let expanded = broadcast_shapes(grad.shape(), target_shape)?;
    if expanded != grad.shape() {
        return Err(FastRnnError::BroadcastError {
            shape1: grad.shape().to_vec(),
            shape2: target_shape.to_vec(),
        });
    }

    let mut reduced = grad.clone();
    // Leading axes that the target does not have at all.
    while reduced.ndim() > target_shape.len() {
        reduced = reduced.sum_axis(Axis(0));
    }
    // Axes of size 1 in the target that were stretched.
    for (axis, &dim) in target_shape.iter().enumerate() {
        if dim == 1 && reduced.shape()[axis] != 1 {
            reduced = reduced.sum_axis(Axis(axis)).insert_axis(Axis(axis));
        }
    }
    reshape_array(&reduced, target_shape, "reduce_to_shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, ArrayD, IxDyn};

    #[test]
    fn test_broadcast_shapes() {
        assert_eq!(broadcast_shapes(&[2, 3], &[1, 3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[3], &[4, 1]).unwrap(), vec![4, 3]);
        assert_eq!(broadcast_shapes(&[], &[2, 2]).unwrap(), vec![2, 2]);
        assert!(matches!(
            broadcast_shapes(&[2, 3], &[3, 2]),
            Err(FastRnnError::BroadcastError { .. })
        ));
    }

    #[test]
    fn test_reduce_to_shape_sums_stretched_axes() {
        let grad = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();
        let row = reduce_to_shape(&grad, &[1, 3]).unwrap();
        assert_eq!(row, arr2(&[[5.0, 7.0, 9.0]]).into_dyn());

        let flat = reduce_to_shape(&grad, &[3]).unwrap();
        assert_eq!(flat.as_slice().unwrap(), &[5.0, 7.0, 9.0]);

        let col = reduce_to_shape(&grad, &[2, 1]).unwrap();
        assert_eq!(col, arr2(&[[6.0], [15.0]]).into_dyn());

        let total = reduce_to_shape(&grad, &[]).unwrap();
        assert_eq!(total, ArrayD::from_elem(IxDyn(&[]), 21.0));
    }

    #[test]
    fn test_reduce_to_shape_rejects_unrelated_shape() {
        let grad = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
        assert!(reduce_to_shape(&grad, &[4]).is_err());
    }
}
