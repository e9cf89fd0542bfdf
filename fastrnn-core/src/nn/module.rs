use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::{ArrayD, IxDyn};

use crate::error::FastRnnError;
use crate::nn::state_dict::{default_checkpoint_path, StateDict};
use crate::tensor::Tensor;

/// Per-module bookkeeping shared by every [`Module`] implementation.
#[derive(Debug)]
pub struct ModuleCore {
    parameters: Vec<Tensor>,
    state_dict: StateDict,
    training: bool,
}

impl Default for ModuleCore {
    fn default() -> Self {
        ModuleCore {
            parameters: Vec::new(),
            state_dict: StateDict::new(),
            training: true,
        }
    }
}

impl ModuleCore {
    pub fn new() -> Self {
        ModuleCore::default()
    }
}

/// One element accepted by [`Module::register_parameters`].
#[derive(Debug, Clone)]
pub enum ParamItem {
    /// A raw trainable value.
    Tensor(Tensor),
    /// The parameters of a child module, flattened in order.
    Module(Vec<Tensor>),
}

impl ParamItem {
    pub fn from_module(module: &dyn Module) -> Self {
        ParamItem::Module(module.parameters())
    }
}

impl From<Tensor> for ParamItem {
    fn from(tensor: Tensor) -> Self {
        ParamItem::Tensor(tensor)
    }
}

impl From<&Tensor> for ParamItem {
    fn from(tensor: &Tensor) -> Self {
        ParamItem::Tensor(tensor.clone())
    }
}

/// A parameter together with the state dict key it is stored under.
#[derive(Debug, Clone)]
pub struct ParameterSlot {
    pub module: String,
    pub label: String,
    pub tensor: Tensor,
}

/// The base trait for all neural network modules (layers, losses, containers).
///
/// An implementation owns a [`ModuleCore`] and lists its direct children explicitly
/// through [`Module::named_children`]. Everything else (parameter registry, state
/// snapshots, persistence, train/eval mode) is provided on top of those two.
pub trait Module: std::fmt::Debug {
    fn core(&self) -> &ModuleCore;

    fn core_mut(&mut self) -> &mut ModuleCore;

    /// Name used for this module's own parameters in a state dict when it is the root.
    fn module_name(&self) -> String {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_string()
    }

    /// Returns the direct child modules along with their names, in a fixed order.
    /// Modules without children keep the default.
    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        Vec::new()
    }

    /// Mutable counterpart of [`Module::named_children`], same names and order.
    fn named_children_mut(&mut self) -> Vec<(String, &mut dyn Module)> {
        Vec::new()
    }

    /// Performs a forward pass of the module.
    ///
    /// # Errors
    /// `NotImplemented` unless the module overrides it.
    fn forward(&self, _inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
        Err(FastRnnError::NotImplemented {
            module: self.module_name(),
            method: "forward".to_string(),
        })
    }

    // --- Parameter registry ---

    /// All registered parameters, including the flattened parameters of children.
    fn parameters(&self) -> Vec<Tensor> {
        self.core().parameters.clone()
    }

    /// Appends one parameter.
    ///
    /// # Errors
    /// `TypeKind` if `param` has a producer: computed values are not trainable.
    fn register_parameter(&mut self, param: Tensor) -> Result<(), FastRnnError> {
        check_trainable(&param)?;
        debug!("{}: register parameter {:?}", self.module_name(), param.name());
        self.core_mut().parameters.push(param);
        Ok(())
    }

    /// Appends raw values and the parameters of child modules, in order, then refreshes
    /// the state dict. Nothing is registered if any element is rejected.
    fn register_parameters(&mut self, items: Vec<ParamItem>) -> Result<(), FastRnnError> {
        let mut flat = Vec::new();
        for item in items {
            match item {
                ParamItem::Tensor(tensor) => flat.push(tensor),
                ParamItem::Module(params) => flat.extend(params),
            }
        }
        for param in &flat {
            check_trainable(param)?;
        }
        debug!("{}: register {} parameters", self.module_name(), flat.len());
        let kept = self.core().parameters.len();
        self.core_mut().parameters.extend(flat);
        if let Err(e) = self.update_state_dict() {
            self.core_mut().parameters.truncate(kept);
            return Err(e);
        }
        Ok(())
    }

    /// Total element count across all registered parameters.
    fn size(&self) -> usize {
        self.parameters().iter().map(Tensor::size).sum()
    }

    /// Resets the gradient and call counters of every registered parameter.
    fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }

    // --- State dict ---

    /// Every parameter this module would store, keyed by module path and label.
    ///
    /// Direct children are stored under their name, grandchildren under
    /// `child.grandchild`. Parameters owned by `path` itself (registered here but not
    /// by any child) are stored under `path`. Unlabelled parameters get `param_<i>`,
    /// `i` being their position among this module's own parameters.
    ///
    /// # Errors
    /// `DuplicateParameterLabel` if two parameters of one module share a label.
    fn parameter_slots(&self, path: &str) -> Result<Vec<ParameterSlot>, FastRnnError> {
        let children = self.named_children();
        let child_params: Vec<Tensor> = children.iter().flat_map(|(_, c)| c.parameters()).collect();

        let mut slots: Vec<ParameterSlot> = Vec::new();
        let own = self
            .parameters()
            .into_iter()
            .filter(|p| !child_params.iter().any(|c| c.ptr_eq(p)));
        for (index, tensor) in own.enumerate() {
            let label = tensor.name().unwrap_or_else(|| format!("param_{index}"));
            if slots.iter().any(|s| s.label == label) {
                return Err(FastRnnError::DuplicateParameterLabel {
                    module: path.to_string(),
                    label,
                });
            }
            slots.push(ParameterSlot {
                module: path.to_string(),
                label,
                tensor,
            });
        }

        for (name, child) in children {
            if child.parameters().is_empty() {
                continue;
            }
            let child_path = if path.is_empty() { name } else { format!("{path}.{name}") };
            slots.extend(child.parameter_slots(&child_path)?);
        }
        Ok(slots)
    }

    /// [`Module::parameter_slots`] of the whole tree. This module's own parameters are
    /// keyed by [`Module::module_name`].
    fn named_slots(&self) -> Result<Vec<ParameterSlot>, FastRnnError> {
        let own_path = self.module_name();
        let mut slots = self.parameter_slots("").map_err(|e| match e {
            FastRnnError::DuplicateParameterLabel { module, label } if module.is_empty() => {
                FastRnnError::DuplicateParameterLabel {
                    module: own_path.clone(),
                    label,
                }
            }
            other => other,
        })?;
        for slot in slots.iter_mut().filter(|s| s.module.is_empty()) {
            slot.module = own_path.clone();
        }
        Ok(slots)
    }

    /// Copies the current parameter values into a fresh [`StateDict`].
    fn snapshot(&self) -> Result<StateDict, FastRnnError> {
        let mut state = StateDict::new();
        for slot in self.named_slots()? {
            state.push(slot.module, slot.label, slot.tensor.data().clone());
        }
        Ok(state)
    }

    /// Refreshes the stored state dict from the live parameters.
    fn update_state_dict(&mut self) -> Result<(), FastRnnError> {
        let state = self.snapshot()?;
        self.core_mut().state_dict = state;
        Ok(())
    }

    /// The state dict as of the last refresh or load.
    fn state_dict(&self) -> &StateDict {
        &self.core().state_dict
    }

    /// Overwrites every live parameter with the stored state dict.
    ///
    /// The state dict must match the live module exactly: every live parameter needs an
    /// entry of the same shape and every entry needs a live parameter. Everything is
    /// checked before the first parameter is written.
    ///
    /// # Errors
    /// `MissingStateEntry`, `UnexpectedStateEntry` or `ShapeMismatch`.
    fn update_parameters_from_state_dict(&mut self) -> Result<(), FastRnnError> {
        let slots = self.named_slots()?;
        let stored = self.state_dict();

        let mut updates = Vec::with_capacity(slots.len());
        for slot in &slots {
            let values = stored.get(&slot.module, &slot.label).ok_or_else(|| {
                FastRnnError::MissingStateEntry {
                    module: slot.module.clone(),
                    label: slot.label.clone(),
                }
            })?;
            let live_shape = slot.tensor.shape();
            if values.is_empty() && slot.tensor.size() == 0 {
                // JSON keeps no inner dimensions for empty arrays.
                updates.push((&slot.tensor, ArrayD::zeros(IxDyn(&live_shape))));
                continue;
            }
            if values.shape() != live_shape.as_slice() {
                return Err(FastRnnError::ShapeMismatch {
                    expected: live_shape,
                    actual: values.shape().to_vec(),
                    operation: format!("load {}.{}", slot.module, slot.label),
                });
            }
            updates.push((&slot.tensor, values.clone()));
        }
        if let Some(extra) = stored
            .iter()
            .find(|e| !slots.iter().any(|s| s.module == e.module && s.label == e.label))
        {
            return Err(FastRnnError::UnexpectedStateEntry {
                module: extra.module.clone(),
                label: extra.label.clone(),
            });
        }

        for (tensor, values) in updates {
            tensor.set_data(values)?;
        }
        Ok(())
    }

    /// Replaces the stored state dict with `state` and applies it.
    fn load_state_dict(&mut self, state: StateDict) -> Result<(), FastRnnError> {
        self.core_mut().state_dict = state;
        self.update_parameters_from_state_dict()
    }

    // --- Persistence ---

    /// Refreshes the state dict and writes it as pretty-printed JSON.
    ///
    /// Without a path the file is named after the current time,
    /// `YYYYMMDD-HHMMSS.json`. The timestamp is UTC, not local time, so names do not
    /// depend on the host time zone. Returns the path written.
    fn save(&mut self, path: Option<&Path>) -> Result<PathBuf, FastRnnError> {
        self.update_state_dict()?;
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_checkpoint_path);
        let text = self.state_dict().to_json_string_pretty()?;
        fs::write(&path, text)?;
        debug!(
            "{}: saved {} parameters to {}",
            self.module_name(),
            self.state_dict().len(),
            path.display()
        );
        Ok(path)
    }

    /// Reads a JSON state dict written by [`Module::save`] and applies it.
    fn load(&mut self, path: &Path) -> Result<(), FastRnnError> {
        let text = fs::read_to_string(path)?;
        let state = StateDict::from_json_str(&text)?;
        debug!(
            "{}: loading {} parameters from {}",
            self.module_name(),
            state.len(),
            path.display()
        );
        self.load_state_dict(state)
    }

    // --- Mode ---

    /// Sets the mode flag of this module and of its direct children.
    fn set_mode(&mut self, training: bool) {
        debug!("{}: training = {}", self.module_name(), training);
        self.core_mut().training = training;
        for (_, child) in self.named_children_mut() {
            child.core_mut().training = training;
        }
    }

    fn train(&mut self) {
        self.set_mode(true);
    }

    fn eval(&mut self) {
        self.set_mode(false);
    }

    fn is_training(&self) -> bool {
        self.core().training
    }
}

fn check_trainable(param: &Tensor) -> Result<(), FastRnnError> {
    if param.is_leaf() {
        Ok(())
    } else {
        Err(FastRnnError::TypeKind {
            message: format!(
                "{:?} is the output of an operation, only leaf values can be parameters",
                param.name()
            ),
        })
    }
}

/// Checks the number of inputs handed to a slice-based `forward`.
pub(crate) fn expect_inputs<'a>(
    module: &str,
    inputs: &'a [Tensor],
    count: usize,
) -> Result<&'a [Tensor], FastRnnError> {
    if inputs.len() != count {
        return Err(FastRnnError::DimensionMismatch {
            expected: count,
            actual: inputs.len(),
            operation: format!("{module}::forward"),
        });
    }
    Ok(inputs)
}

#[cfg(test)]
#[path = "module_test.rs"]
mod tests;
