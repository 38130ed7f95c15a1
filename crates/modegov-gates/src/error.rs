//! Gate check errors

use thiserror::Error;

/// Errors from gate checks and their collaborators.
///
/// These never reach callers of preflight directly: the runner folds any
/// error into a blocking `Fail` verdict.
#[derive(Error, Debug, Clone)]
pub enum GateError {
    #[error("collaborator '{name}' failed: {reason}")]
    Collaborator { name: String, reason: String },

    #[error("gate '{gate}' misconfigured: {reason}")]
    Misconfigured { gate: String, reason: String },
}

impl GateError {
    pub fn collaborator(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
