use thiserror::Error;

/// Custom error type for the fastrnn autograd engine and module layer.
#[derive(Error, Debug)]
pub enum FastRnnError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    /// Raised by the horizontal concatenation backward when the gradient width
    /// disagrees with the combined width of its inputs.
    #[error("Split mismatch: gradient width {actual} does not match combined input width {expected}")]
    SplitMismatch { expected: usize, actual: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual} during operation {operation}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis of size {bound} during operation {operation}")]
    IndexOutOfBounds {
        index: i64,
        bound: usize,
        operation: String,
    },

    #[error("Unsupported parameter kind: {message}")]
    TypeKind { message: String },

    #[error("{method} is not implemented for module {module}")]
    NotImplemented { module: String, method: String },

    #[error("State dict has no entry for parameter '{label}' of module '{module}'")]
    MissingStateEntry { module: String, label: String },

    #[error("State dict entry '{module}.{label}' has no matching live parameter")]
    UnexpectedStateEntry { module: String, label: String },

    #[error("Module '{module}' registers more than one parameter labelled '{label}'")]
    DuplicateParameterLabel { module: String, label: String },

    #[error("Container already holds a module named '{name}'")]
    DuplicateModuleName { name: String },

    #[error("Invalid state dict format: {0}")]
    InvalidStateFormat(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Layout(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
