use super::*;
use crate::error::FastRnnError;
use crate::utils::testing::{check_array_near, check_grad_near, check_tensor_near, create_test_tensor};
use ndarray::arr2;

#[test]
fn test_hstack_forward() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = create_test_tensor(vec![7.0, 8.0, 9.0, 10.0], &[2, 2]);
    let output = hstack_op(&a, &b).unwrap();
    check_tensor_near(
        &output,
        &[2, 5],
        &[1.0, 2.0, 3.0, 7.0, 8.0, 4.0, 5.0, 6.0, 9.0, 10.0],
        0.0,
    );
}

#[test]
fn test_hstack_backward_splits_at_first_width() {
    let a = create_test_tensor(vec![0.0; 6], &[2, 3]);
    let b = create_test_tensor(vec![0.0; 4], &[2, 2]);
    let output = hstack_op(&a, &b).unwrap();
    let upstream = arr2(&[[1.0, 2.0, 3.0, 4.0, 5.0], [6.0, 7.0, 8.0, 9.0, 10.0]]).into_dyn();
    output.backward(Some(&upstream)).unwrap();
    check_grad_near(&a, &[2, 3], &[1.0, 2.0, 3.0, 6.0, 7.0, 8.0], 0.0);
    check_grad_near(&b, &[2, 2], &[4.0, 5.0, 9.0, 10.0], 0.0);
}

#[test]
fn test_hstack_backward_width_mismatch() {
    let a = create_test_tensor(vec![0.0; 6], &[2, 3]);
    let b = create_test_tensor(vec![0.0; 4], &[2, 2]);
    let mut op = HStackFn::new(&a, &b);
    op.forward().unwrap();

    let too_narrow = arr2(&[[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]).into_dyn();
    match op.backward(&too_narrow) {
        Err(FastRnnError::SplitMismatch { expected, actual }) => {
            assert_eq!(expected, 5);
            assert_eq!(actual, 4);
        }
        other => panic!("Expected SplitMismatch, got {:?}", other),
    }

    let exact = arr2(&[[1.0, 2.0, 3.0, 4.0, 5.0], [6.0, 7.0, 8.0, 9.0, 10.0]]).into_dyn();
    let grads = op.backward(&exact).unwrap();
    assert_eq!(grads.len(), 2);
    check_array_near(grads[0].as_ref().unwrap(), &[2, 3], &[1.0, 2.0, 3.0, 6.0, 7.0, 8.0], 0.0);
    check_array_near(grads[1].as_ref().unwrap(), &[2, 2], &[4.0, 5.0, 9.0, 10.0], 0.0);
}

#[test]
fn test_hstack_row_count_mismatch() {
    let a = create_test_tensor(vec![0.0; 6], &[2, 3]);
    let b = create_test_tensor(vec![0.0; 3], &[3, 1]);
    assert!(matches!(
        hstack_op(&a, &b),
        Err(FastRnnError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_hstack_rank_mismatch() {
    let a = create_test_tensor(vec![0.0; 6], &[2, 3]);
    let b = create_test_tensor(vec![0.0; 2], &[2]);
    assert!(matches!(
        hstack_op(&a, &b),
        Err(FastRnnError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_vstack_forward_and_backward() {
    let a = create_test_tensor(vec![1.0, 2.0], &[1, 2]);
    let b = create_test_tensor(vec![3.0, 4.0, 5.0, 6.0], &[2, 2]);
    let output = vstack_op(&a, &b).unwrap();
    check_tensor_near(&output, &[3, 2], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 0.0);

    let upstream = arr2(&[[1.0, -1.0], [2.0, -2.0], [3.0, -3.0]]).into_dyn();
    output.backward(Some(&upstream)).unwrap();
    check_grad_near(&a, &[1, 2], &[1.0, -1.0], 0.0);
    check_grad_near(&b, &[2, 2], &[2.0, -2.0, 3.0, -3.0], 0.0);
}

#[test]
fn test_vstack_column_mismatch() {
    let a = create_test_tensor(vec![1.0, 2.0], &[1, 2]);
    let b = create_test_tensor(vec![3.0, 4.0, 5.0], &[1, 3]);
    assert!(matches!(
        vstack_op(&a, &b),
        Err(FastRnnError::ShapeMismatch { .. })
    ));
}
