// src/nn/layers/mod.rs

pub mod activation;
pub mod combine;
pub mod embedding;
pub mod linear;

// Re-export key layer structs
pub use activation::{SigmoidLayer, SoftmaxLayer, TanhLayer};
pub use combine::{HStack, Multiply, Row, Sum, VStack};
pub use embedding::Embedding;
pub use linear::LinearLayer;
