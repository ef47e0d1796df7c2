// ============================================================
// Error taxonomy
// ============================================================
// Library layers (data, ml, infra) return SummarizerError so
// callers can tell a precondition violation from an I/O failure
// from a checkpoint that exists but cannot be used.
// The application and CLI layers wrap these in anyhow.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizerError {
    /// `init_model` has not been called yet
    #[error("Model is not initialized: call init_model with a preprocessor and vectorizer first")]
    NotInitialized,

    /// Weights are only meaningful after one applied training step
    #[error("Model weights are not materialized: run at least one training step before saving")]
    NotTrained,

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint not found at '{0}'")]
    NotFound(PathBuf),

    /// The checkpoint exists but is incomplete, corrupt or inconsistent
    #[error("Invalid checkpoint: {0}")]
    Format(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Tensor error: {0}")]
    Tensor(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SummarizerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// True for errors where the checkpoint was found but could not be used
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, SummarizerError>;
