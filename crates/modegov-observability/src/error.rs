//! Observability errors

use thiserror::Error;

/// Errors from audit sinks and metric export.
#[derive(Error, Debug)]
pub enum ObservabilityError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("audit error: {0}")]
    Audit(String),

    #[error("metrics error: {0}")]
    Metrics(String),
}

pub type Result<T> = std::result::Result<T, ObservabilityError>;
