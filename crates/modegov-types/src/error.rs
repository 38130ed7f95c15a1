//! Error taxonomy for the governance engine

use thiserror::Error;
use uuid::Uuid;

/// Why an override failed to satisfy validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    #[error("override reason too short: {actual} chars, minimum {minimum}")]
    ReasonTooShort { actual: usize, minimum: usize },

    #[error("override duration {actual}s outside allowed range [{min}s, {max}s]")]
    DurationOutOfBounds { actual: u64, min: u64, max: u64 },

    #[error("override {id} expired")]
    Expired { id: Uuid },

    #[error("override {id} already consumed")]
    AlreadyConsumed { id: Uuid },

    #[error("override {id} not found")]
    NotFound { id: Uuid },
}

/// Categorized errors returned to callers of the governance engine.
///
/// Internal collaborator errors are logged with full context; callers see
/// only the category plus operator-facing reasons. A `CommitFailed` always
/// means the pre-transition mode was restored before returning.
#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("mode change blocked by governance: {}", reasons.join("; "))]
    Blocked { reasons: Vec<String> },

    #[error("override invalid: {0}")]
    OverrideInvalid(#[from] OverrideError),

    #[error("commit step '{step}' failed: {reason} (mode rolled back)")]
    CommitFailed { step: String, reason: String },

    #[error("collaborator '{name}' failed: {reason}")]
    Collaborator { name: String, reason: String },

    #[error("audit sink error: {0}")]
    Audit(String),

    #[error("config store error: {0}")]
    Store(String),
}

impl GovernanceError {
    pub fn blocked(reasons: Vec<String>) -> Self {
        Self::Blocked { reasons }
    }

    pub fn commit_failed(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommitFailed {
            step: step.into(),
            reason: reason.into(),
        }
    }

    pub fn collaborator(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_error_lists_reasons() {
        let err = GovernanceError::blocked(vec![
            "bundle_trust: bundle quarantined".into(),
            "gateway: not reachable".into(),
        ]);
        let text = err.to_string();
        assert!(text.contains("quarantined"));
        assert!(text.contains("gateway"));
    }

    #[test]
    fn override_error_converts() {
        let id = Uuid::new_v4();
        let err: GovernanceError = OverrideError::Expired { id }.into();
        assert!(matches!(err, GovernanceError::OverrideInvalid(_)));
    }
}
