// ============================================================
// Error Types
// ============================================================
// Typed errors for the model and evaluation path. The
// application and CLI layers wrap these in anyhow with context;
// library code returns them directly so callers (and tests) can
// match on the failure kind.
//
// Every variant here is fatal for an evaluation run: there is
// no retry and no partial result.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid model or evaluation configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min:   usize,
        value: usize,
    },

    #[error("sa_div ({sa_div}) must not exceed filter_num ({filter_num})")]
    DivisorTooLarge { sa_div: usize, filter_num: usize },

    #[error("{field} must be a probability in [0, 1), got {value}")]
    InvalidDropout { field: &'static str, value: f64 },
}

/// Errors raised while loading a checkpoint or running inference.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("checkpoint not found at '{}'", path.display())]
    CheckpointMissing { path: PathBuf },

    #[error("cannot read checkpoint '{}': {message}", path.display())]
    CheckpointCorrupt { path: PathBuf, message: String },

    #[error("checkpoint parameter '{name}' has shape {found:?}, live model expects {expected:?}")]
    ShapeMismatch {
        name:     String,
        expected: Vec<usize>,
        found:    Vec<usize>,
    },

    #[error("checkpoint parameter '{name}' has no counterpart in the live model")]
    UnexpectedParameter { name: String },

    #[error("live model parameter '{name}' is missing from the checkpoint")]
    MissingParameter { name: String },

    #[error("input batch has shape {found:?}, {reason}")]
    InputShape { found: [usize; 3], reason: String },

    #[error("evaluation needs an inference backend; call `.valid()` on an autodiff model first")]
    TrainingBackend,

    #[error("data loader produced no batches; loss and metrics are undefined")]
    EmptyLoader,

    #[error("cannot read tensor data back from the device: {0}")]
    TensorData(String),

    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EvalResult<T> = Result<T, EvalError>;
