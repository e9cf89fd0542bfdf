use super::*;
use crate::nn::init::wandb_with_rng;
use crate::ops::{add_op, linear_op};
use crate::utils::testing::create_test_tensor;
use ndarray::arr2;
use rand::rngs::StdRng;
use rand::SeedableRng;

// Mock modules for the tests

#[derive(Debug)]
struct MockLeaf {
    core: ModuleCore,
    weights: Tensor,
    bias: Tensor,
}

impl MockLeaf {
    fn new(seed: u64) -> Self {
        let (weights, bias) = wandb_with_rng(2, 3, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut leaf = MockLeaf {
            core: ModuleCore::new(),
            weights: weights.clone(),
            bias: bias.clone(),
        };
        leaf.register_parameters(vec![weights.into(), bias.into()]).unwrap();
        leaf
    }
}

impl Module for MockLeaf {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
        let inputs = expect_inputs("MockLeaf", inputs, 1)?;
        linear_op(&inputs[0], &self.weights, &self.bias)
    }
}

#[derive(Debug)]
struct MockPair {
    core: ModuleCore,
    first: MockLeaf,
    second: MockLeaf,
}

impl MockPair {
    fn new(seed: u64) -> Self {
        let first = MockLeaf::new(seed);
        let second = MockLeaf::new(seed + 1);
        let mut pair = MockPair {
            core: ModuleCore::new(),
            first,
            second,
        };
        let items = vec![ParamItem::from_module(&pair.first), ParamItem::from_module(&pair.second)];
        pair.register_parameters(items).unwrap();
        pair
    }
}

impl Module for MockPair {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        vec![
            ("first".to_string(), &self.first as &dyn Module),
            ("second".to_string(), &self.second as &dyn Module),
        ]
    }

    fn named_children_mut(&mut self) -> Vec<(String, &mut dyn Module)> {
        vec![
            ("first".to_string(), &mut self.first as &mut dyn Module),
            ("second".to_string(), &mut self.second as &mut dyn Module),
        ]
    }
}

#[derive(Debug)]
struct MockOuter {
    core: ModuleCore,
    pair: MockPair,
}

impl MockOuter {
    fn new() -> Self {
        let pair = MockPair::new(10);
        let mut outer = MockOuter {
            core: ModuleCore::new(),
            pair,
        };
        let items = vec![ParamItem::from_module(&outer.pair)];
        outer.register_parameters(items).unwrap();
        outer
    }
}

impl Module for MockOuter {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        vec![("pair".to_string(), &self.pair as &dyn Module)]
    }

    fn named_children_mut(&mut self) -> Vec<(String, &mut dyn Module)> {
        vec![("pair".to_string(), &mut self.pair as &mut dyn Module)]
    }
}

#[derive(Debug, Default)]
struct Bare {
    core: ModuleCore,
}

impl Module for Bare {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }
}

// --- Registry ---

#[test]
fn test_register_parameter_appends() {
    let mut module = Bare::default();
    module.register_parameter(create_test_tensor(vec![1.0, 2.0], &[2])).unwrap();
    module.register_parameter(create_test_tensor(vec![0.0; 6], &[2, 3])).unwrap();
    assert_eq!(module.parameters().len(), 2);
    assert_eq!(module.size(), 8);
    // No snapshot refresh for single registration.
    assert!(module.state_dict().is_empty());
}

#[test]
fn test_register_parameters_flattens_children() {
    let pair = MockPair::new(0);
    assert_eq!(pair.parameters().len(), 4);
    assert!(pair.parameters()[0].ptr_eq(&pair.first.weights));
    assert!(pair.parameters()[3].ptr_eq(&pair.second.bias));
    assert_eq!(pair.size(), 2 * (6 + 3));
    assert_eq!(pair.state_dict().len(), 4);
}

#[test]
fn test_register_non_leaf_is_type_kind() {
    let mut module = Bare::default();
    let a = create_test_tensor(vec![1.0], &[1]);
    let computed = add_op(&a, &a).unwrap();
    let result = module.register_parameters(vec![a.clone().into(), computed.into()]);
    assert!(matches!(result, Err(FastRnnError::TypeKind { .. })));
    assert!(module.parameters().is_empty());

    let computed = add_op(&a, &a).unwrap();
    assert!(matches!(
        module.register_parameter(computed),
        Err(FastRnnError::TypeKind { .. })
    ));
}

#[test]
fn test_default_forward_is_not_implemented() {
    let module = Bare::default();
    match module.forward(&[]) {
        Err(FastRnnError::NotImplemented { module, method }) => {
            assert_eq!(module, "Bare");
            assert_eq!(method, "forward");
        }
        other => panic!("Expected NotImplemented, got {:?}", other),
    }
}

#[test]
fn test_forward_arity_is_checked() {
    let leaf = MockLeaf::new(0);
    let x = create_test_tensor(vec![1.0, 2.0], &[1, 2]);
    assert!(matches!(
        leaf.forward(&[x.clone(), x]),
        Err(FastRnnError::DimensionMismatch { expected: 1, actual: 2, .. })
    ));
}

#[test]
fn test_zero_grad_resets_all_parameters() {
    let leaf = MockLeaf::new(0);
    let x = create_test_tensor(vec![1.0, 2.0], &[1, 2]);
    let y = leaf.forward(&[x]).unwrap();
    y.backward(Some(&ndarray::ArrayD::ones(ndarray::IxDyn(&[1, 3])))).unwrap();
    assert_eq!(leaf.weights.backward_calls(), 1);

    leaf.zero_grad();
    for p in leaf.parameters() {
        assert!(p.grad().iter().all(|&g| g == 0.0));
        assert_eq!(p.forward_calls(), 0);
        assert_eq!(p.backward_calls(), 0);
    }
}

// --- Mode ---

#[test]
fn test_train_eval_reach_direct_children_only() {
    let mut outer = MockOuter::new();
    assert!(outer.is_training());
    outer.eval();
    assert!(!outer.is_training());
    assert!(!outer.pair.is_training());
    assert!(outer.pair.first.is_training());

    outer.pair.eval();
    assert!(!outer.pair.first.is_training());
    assert!(!outer.pair.second.is_training());
    outer.train();
    assert!(outer.pair.is_training());
    assert!(!outer.pair.first.is_training());
}

// --- State dict ---

#[test]
fn test_snapshot_keys_children_by_name() {
    let pair = MockPair::new(0);
    let state = pair.snapshot().unwrap();
    let keys: Vec<(String, String)> = state.iter().map(|e| (e.module.clone(), e.label.clone())).collect();
    assert_eq!(
        keys,
        vec![
            ("first".to_string(), "weights".to_string()),
            ("first".to_string(), "bias".to_string()),
            ("second".to_string(), "weights".to_string()),
            ("second".to_string(), "bias".to_string()),
        ]
    );
    assert_eq!(state.get("first", "weights"), Some(&*pair.first.weights.data()));
}

#[test]
fn test_snapshot_nested_children_use_dotted_paths() {
    let outer = MockOuter::new();
    let state = outer.snapshot().unwrap();
    assert_eq!(state.len(), 4);
    assert!(state.contains("pair.first", "weights"));
    assert!(state.contains("pair.second", "bias"));
}

#[test]
fn test_snapshot_of_leaf_uses_module_name() {
    let leaf = MockLeaf::new(0);
    let state = leaf.snapshot().unwrap();
    assert!(state.contains("MockLeaf", "weights"));
    assert!(state.contains("MockLeaf", "bias"));
}

#[test]
fn test_unlabelled_parameters_get_positional_labels() {
    let mut module = Bare::default();
    let items = vec![
        create_test_tensor(vec![1.0], &[1]).into(),
        create_test_tensor(vec![2.0], &[1]).into(),
    ];
    module.register_parameters(items).unwrap();
    assert!(module.state_dict().contains("Bare", "param_0"));
    assert!(module.state_dict().contains("Bare", "param_1"));
}

#[test]
fn test_duplicate_labels_are_rejected() {
    let mut module = Bare::default();
    let a = Tensor::named(arr2(&[[1.0]]).into_dyn(), "w");
    let b = Tensor::named(arr2(&[[2.0]]).into_dyn(), "w");
    match module.register_parameters(vec![a.into(), b.into()]) {
        Err(FastRnnError::DuplicateParameterLabel { module, label }) => {
            assert_eq!(module, "Bare");
            assert_eq!(label, "w");
        }
        other => panic!("Expected DuplicateParameterLabel, got {:?}", other),
    }
    assert!(module.parameters().is_empty());
    assert_eq!(module.size(), 0);

    // The module stays usable after the rejected call.
    module.update_state_dict().unwrap();
    let c = Tensor::named(arr2(&[[3.0]]).into_dyn(), "w");
    module.register_parameters(vec![c.into()]).unwrap();
    assert_eq!(module.parameters().len(), 1);
    assert!(module.state_dict().contains("Bare", "w"));
}

#[test]
fn test_load_state_dict_overwrites_parameters() {
    let source = MockPair::new(1);
    let mut target = MockPair::new(2);
    assert_ne!(*source.first.weights.data(), *target.first.weights.data());

    target.load_state_dict(source.snapshot().unwrap()).unwrap();
    for (s, t) in source.parameters().iter().zip(target.parameters()) {
        assert_eq!(*s.data(), *t.data());
        assert!(!s.ptr_eq(&t));
    }
}

#[test]
fn test_load_missing_entry_fails_without_writing() {
    let source = MockPair::new(1);
    let mut target = MockPair::new(2);
    let before = target.first.weights.data().clone();

    let mut partial = StateDict::new();
    for entry in source.snapshot().unwrap().iter().filter(|e| e.label != "bias") {
        partial.push(entry.module.clone(), entry.label.clone(), entry.values.clone());
    }
    match target.load_state_dict(partial) {
        Err(FastRnnError::MissingStateEntry { module, label }) => {
            assert_eq!(module, "first");
            assert_eq!(label, "bias");
        }
        other => panic!("Expected MissingStateEntry, got {:?}", other),
    }
    assert_eq!(*target.first.weights.data(), before);
}

#[test]
fn test_load_unexpected_entry_fails() {
    let source = MockPair::new(1);
    let mut target = MockPair::new(2);
    let before = target.second.bias.data().clone();
    let mut state = source.snapshot().unwrap();
    state.push("third", "weights", arr2(&[[0.0]]).into_dyn());
    assert!(matches!(
        target.load_state_dict(state),
        Err(FastRnnError::UnexpectedStateEntry { .. })
    ));
    assert_eq!(*target.second.bias.data(), before);
}

#[test]
fn test_load_shape_mismatch_fails() {
    let mut target = MockPair::new(2);
    let mut state = target.snapshot().unwrap();
    let mut replacement = StateDict::new();
    replacement.push("second", "bias", arr2(&[[1.0, 2.0]]).into_dyn());
    state.extend(replacement);
    assert!(matches!(
        target.load_state_dict(state),
        Err(FastRnnError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_save_and_load_round_trip() {
    let path = std::env::temp_dir().join(format!("fastrnn-module-test-{}.json", std::process::id()));
    let mut source = MockPair::new(3);
    let written = source.save(Some(&path)).unwrap();
    assert_eq!(written, path);

    let mut target = MockPair::new(4);
    target.load(&path).unwrap();
    for (s, t) in source.parameters().iter().zip(target.parameters()) {
        assert_eq!(*s.data(), *t.data());
    }
    for entry in source.state_dict() {
        assert_eq!(target.state_dict().get(&entry.module, &entry.label), Some(&entry.values));
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_load_missing_file_is_io_error() {
    let mut target = MockPair::new(4);
    let path = std::env::temp_dir().join("fastrnn-module-test-does-not-exist.json");
    assert!(matches!(target.load(&path), Err(FastRnnError::Io(_))));
}

#[test]
fn test_empty_parameter_round_trips_through_file() {
    let path = std::env::temp_dir().join(format!("fastrnn-module-empty-{}.json", std::process::id()));
    let mut source = Bare::default();
    let empty = Tensor::named(ndarray::Array2::<f64>::zeros((0, 3)).into_dyn(), "w");
    let full = Tensor::named(arr2(&[[1.0, 2.0]]).into_dyn(), "b");
    source.register_parameters(vec![empty.into(), full.into()]).unwrap();
    source.save(Some(&path)).unwrap();

    let mut target = Bare::default();
    let empty = Tensor::named(ndarray::Array2::<f64>::zeros((0, 3)).into_dyn(), "w");
    let full = Tensor::named(arr2(&[[0.0, 0.0]]).into_dyn(), "b");
    target.register_parameters(vec![empty.clone().into(), full.clone().into()]).unwrap();
    target.load(&path).unwrap();
    assert_eq!(empty.shape(), vec![0, 3]);
    assert_eq!(*full.data(), arr2(&[[1.0, 2.0]]).into_dyn());
    std::fs::remove_file(&path).unwrap();
}
