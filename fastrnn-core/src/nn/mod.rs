// src/nn/mod.rs
// Trainable containers, layers and losses built on top of the autograd ops.

pub mod init;
pub mod layers;
pub mod losses;
pub mod module; // Trait Module
pub mod state_dict;

// Re-export common items
pub use layers::{
    Embedding, HStack, LinearLayer, Multiply, Row, SigmoidLayer, SoftmaxLayer, Sum, TanhLayer,
    VStack,
};
pub use losses::CrossEntropyLoss;
pub use module::{Module, ModuleCore, ParamItem, ParameterSlot};
pub use state_dict::{StateDict, StateEntry};
