use super::*;
use crate::autograd::grad_check::check_grad;
use crate::error::FastRnnError;
use crate::utils::testing::{check_grad_near, check_tensor_near, create_test_tensor, ones_grad};

#[test]
fn test_mul_forward() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = create_test_tensor(vec![5.0, 6.0, 7.0, 8.0], &[2, 2]);
    let output = mul_op(&a, &b).unwrap();
    check_tensor_near(&output, &[2, 2], &[5.0, 12.0, 21.0, 32.0], 0.0);
}

#[test]
fn test_mul_backward() {
    let a = create_test_tensor(vec![1.0, 2.0], &[2]);
    let b = create_test_tensor(vec![3.0, 4.0], &[2]);
    let output = mul_op(&a, &b).unwrap();
    output.backward(Some(&ndarray::arr1(&[1.0, 10.0]).into_dyn())).unwrap();
    check_grad_near(&a, &[2], &[3.0, 40.0], 0.0);
    check_grad_near(&b, &[2], &[1.0, 20.0], 0.0);
}

#[test]
fn test_mul_same_value_twice() {
    // x * x: both input slots point at x, so x collects 2x.
    let x = create_test_tensor(vec![3.0, -2.0], &[2]);
    let output = mul_op(&x, &x).unwrap();
    output.backward(Some(&ones_grad(&[2]))).unwrap();
    check_grad_near(&x, &[2], &[6.0, -4.0], 0.0);
    assert_eq!(x.forward_calls(), 2);
    assert_eq!(x.backward_calls(), 2);
}

#[test]
fn test_mul_broadcast_backward() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = create_test_tensor(vec![2.0], &[1, 1]);
    let output = mul_op(&a, &b).unwrap();
    output.backward(Some(&ones_grad(&[2, 3]))).unwrap();
    check_grad_near(&a, &[2, 3], &[2.0; 6], 0.0);
    check_grad_near(&b, &[1, 1], &[21.0], 0.0);
}

#[test]
fn test_mul_incompatible_shapes() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = create_test_tensor(vec![1.0, 2.0, 3.0], &[3]);
    assert!(matches!(
        mul_op(&a, &b),
        Err(FastRnnError::BroadcastError { .. })
    ));
}

#[test]
fn test_mul_grad_check() {
    let a = create_test_tensor(vec![0.5, -1.5, 2.0, 0.25, 1.0, -0.75], &[3, 2]);
    let b = create_test_tensor(vec![1.25, -0.5], &[2]);
    let upstream = ndarray::arr2(&[[1.0, -1.0], [2.0, 0.5], [-3.0, 1.5]]).into_dyn();
    let func = |inputs: &[Tensor]| mul_op(&inputs[0], &inputs[1]);
    check_grad(func, &[a, b], &upstream, 1e-6, 1e-6)
        .unwrap_or_else(|e| panic!("Mul grad check failed: {:?}", e));
}
