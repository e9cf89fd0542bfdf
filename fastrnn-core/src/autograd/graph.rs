use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use ndarray::ArrayD;

use crate::error::FastRnnError;
use crate::tensor::utils::reshape_array;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Identity of a value in the graph: the address of its shared `TensorData`.
/// Stable for as long as any handle to the value is alive.
pub(crate) type NodeId = *const RefCell<TensorData>;

/// Topologically sorts every value reachable from `root` through producer edges.
///
/// Inputs come before the values computed from them; `root` is last.
/// The depth-first search keeps an explicit stack, so long unrolled sequences do not
/// grow the call stack.
pub(crate) fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sorted = Vec::new();
    // (value, children already pushed)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((tensor, expanded)) = stack.pop() {
        if expanded {
            sorted.push(tensor);
            continue;
        }
        if !visited.insert(tensor.node_id()) {
            continue;
        }
        let grad_fn = tensor.grad_fn();
        stack.push((tensor, true));
        if let Some(node) = grad_fn {
            for input in node.inputs().into_iter().rev() {
                if !visited.contains(&input.node_id()) {
                    stack.push((input, false));
                }
            }
        }
    }
    sorted
}

/// Propagates `seed` (the gradient of `root`) to every value reachable from `root`.
///
/// Values are visited in reverse topological order. Every gradient contribution a
/// value receives is added to its buffer and counted at once. The summed
/// contributions then pass through the value's producer exactly once, after all of
/// them have arrived. `root` itself is not accumulated here; the caller decides that.
pub(crate) fn run_backward(root: &Tensor, seed: ArrayD<f64>) -> Result<(), FastRnnError> {
    let order = topological_sort(root);
    debug!(
        "backward from {:?}: {} values in graph",
        root.name(),
        order.len()
    );

    let mut pending: HashMap<NodeId, ArrayD<f64>> = HashMap::new();
    pending.insert(root.node_id(), seed);

    for tensor in order.iter().rev() {
        let Some(upstream) = pending.remove(&tensor.node_id()) else {
            continue;
        };
        let Some(node) = tensor.grad_fn() else {
            continue;
        };
        trace!("backward through {} for {:?}", node.name(), tensor.name());

        let upstream = reshape_array(&upstream, node.output_shape(), node.name())?;
        let input_grads = node.backward(&upstream)?;
        let inputs = node.inputs();
        if input_grads.len() != inputs.len() {
            return Err(FastRnnError::InternalError(format!(
                "{} returned {} gradients for {} inputs",
                node.name(),
                input_grads.len(),
                inputs.len()
            )));
        }

        for (input, grad) in inputs.iter().zip(input_grads) {
            let Some(grad) = grad else {
                continue;
            };
            input.accumulate_grad(&grad, node.name())?;
            match pending.entry(input.node_id()) {
                Entry::Occupied(mut entry) => *entry.get_mut() += &grad,
                Entry::Vacant(entry) => {
                    entry.insert(grad);
                }
            }
        }
    }

    for tensor in order.iter().filter(|t| !t.calls_balanced()) {
        debug!(
            "{:?}: {} forward calls, {} backward calls after backward pass",
            tensor.name(),
            tensor.forward_calls(),
            tensor.backward_calls()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add_op, mul_op, sigmoid_op};
    use crate::tensor::from_vec;

    #[test]
    fn test_topological_sort_orders_inputs_first() {
        let a = from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let b = from_vec(vec![3.0, 4.0], &[2]).unwrap();
        let c = mul_op(&a, &b).unwrap();
        let d = add_op(&c, &a).unwrap();

        let order = topological_sort(&d);
        assert_eq!(order.len(), 4);
        let position = |t: &Tensor| order.iter().position(|o| o.ptr_eq(t)).unwrap();
        assert!(position(&a) < position(&c));
        assert!(position(&b) < position(&c));
        assert!(position(&c) < position(&d));
        assert_eq!(position(&d), 3);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let x = from_vec(vec![0.5], &[1]).unwrap();
        let mut h = x.clone();
        for _ in 0..2_000 {
            h = sigmoid_op(&h).unwrap();
        }
        h.backward(Some(&ndarray::arr1(&[1.0]).into_dyn())).unwrap();
        assert_eq!(x.backward_calls(), 1);
        assert!(x.grad()[[0]].is_finite());
    }
}
