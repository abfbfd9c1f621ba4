//! Error types for reductions.

use thiserror::Error;

/// Errors that can occur while computing statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid input size {len}: {reason}")]
    InvalidInputSize { len: usize, reason: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker {worker} failed: {reason}")]
    WorkerFailure { worker: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
