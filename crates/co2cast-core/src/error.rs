use thiserror::Error;

/// Failure to obtain a usable model. Fatal to the gateway for the rest of the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Model artifact not found: {0}")]
    NotFound(String),

    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed model artifact: {0}")]
    Malformed(String),

    #[error("Unsupported artifact format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Remote artifact unreachable: {0}")]
    Remote(String),

    #[error("Model does not match the feature schema: {0}")]
    Schema(String),
}

/// Failure of a single prediction. Local to one submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Feature shape mismatch: expected {expected} columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("Feature column mismatch at position {position}: expected '{expected}', got '{actual}'")]
    ColumnName {
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model returned a non-finite value: {0}")]
    NonFinite(f64),

    #[error("Model exposes {actual} importance weights for {expected} features")]
    ImportanceShape { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("'{value}' is not a number for {key}")]
    NotNumeric { key: String, value: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Expected {expected} values, got {actual}")]
    ValueCount { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Feature schema is empty")]
    Empty,

    #[error("Feature key at position {0} is empty")]
    EmptyKey(usize),

    #[error("Duplicate feature key: {0}")]
    DuplicateKey(String),
}

/// Everything that can end a submission in the `Failed` phase.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Failed to load model: {0}")]
    GatewayUnavailable(LoadError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictionError),
}

#[derive(Error, Debug)]
pub enum Co2castError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Co2castError>;
