use log::debug;

use crate::error::FastRnnError;
use crate::nn::module::{expect_inputs, Module, ModuleCore, ParamItem};
use crate::tensor::Tensor;

/// An ordered, named chain of single-input modules.
///
/// Each child's parameters are registered on the container when it is added, so the
/// state dict of a `Sequential` holds one entry group per child name.
#[derive(Debug, Default)]
pub struct Sequential {
    core: ModuleCore,
    modules: Vec<(String, Box<dyn Module>)>,
}

impl Sequential {
    pub fn new() -> Self {
        Sequential::default()
    }

    /// Appends `module` under `name` and registers its parameters.
    ///
    /// # Errors
    /// `DuplicateModuleName` if `name` is taken, `DuplicateParameterLabel` if the
    /// child's own state cannot be keyed. Nothing is added in either case.
    pub fn add_module(&mut self, name: impl Into<String>, module: Box<dyn Module>) -> Result<(), FastRnnError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(FastRnnError::DuplicateModuleName { name });
        }
        module.named_slots()?;
        let params = ParamItem::from_module(module.as_ref());
        debug!("Sequential: add module '{}' ({})", name, module.module_name());
        self.modules.push((name, module));
        if let Err(e) = self.register_parameters(vec![params]) {
            self.modules.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Builder form of [`Sequential::add_module`].
    pub fn with(mut self, name: impl Into<String>, module: Box<dyn Module>) -> Result<Self, FastRnnError> {
        self.add_module(name, module)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Module> {
        self.modules
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Feeds `input` through every child in order.
    pub fn call(&self, input: &Tensor) -> Result<Tensor, FastRnnError> {
        let mut current = input.clone();
        for (_, module) in &self.modules {
            current = module.forward(std::slice::from_ref(&current))?;
        }
        Ok(current)
    }
}

impl Module for Sequential {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        self.modules
            .iter()
            .map(|(name, module)| (name.clone(), module.as_ref()))
            .collect()
    }

    fn named_children_mut(&mut self) -> Vec<(String, &mut dyn Module)> {
        self.modules
            .iter_mut()
            .map(|(name, module)| (name.clone(), module.as_mut() as &mut dyn Module))
            .collect()
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Tensor, FastRnnError> {
        let inputs = expect_inputs("Sequential", inputs, 1)?;
        self.call(&inputs[0])
    }
}

#[cfg(test)]
#[path = "sequential_test.rs"]
mod tests;
