//! Gate-check verdict types
//!
//! These are ephemeral: produced fresh for every preflight call and
//! embedded into audit events, never persisted standalone.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::Mode;

/// Verdict of a single gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Fail,
    Warning,
    Skipped,
    NotApplicable,
}

/// Aggregated verdict across all checks of one preflight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pass,
    Fail,
    Warning,
}

/// Result of one gate check against a target mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCheckResult {
    /// Name of the gate that produced this result
    pub gate_name: String,

    /// Verdict
    pub status: GateStatus,

    /// Whether this gate is required for the target mode
    pub required: bool,

    /// Whether a failure of this gate blocks the transition
    pub blocking: bool,

    /// Human-readable reason for the verdict
    pub reason: String,

    /// Structured detail for operators
    #[serde(default)]
    pub detail: HashMap<String, serde_json::Value>,
}

impl GateCheckResult {
    pub fn pass(gate_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_status(gate_name, GateStatus::Pass, reason)
    }

    pub fn fail(gate_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_status(gate_name, GateStatus::Fail, reason)
    }

    pub fn warning(gate_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_status(gate_name, GateStatus::Warning, reason)
    }

    pub fn skipped(gate_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_status(gate_name, GateStatus::Skipped, reason)
    }

    pub fn not_applicable(gate_name: impl Into<String>) -> Self {
        Self::with_status(
            gate_name,
            GateStatus::NotApplicable,
            "not applicable for target mode",
        )
    }

    fn with_status(
        gate_name: impl Into<String>,
        status: GateStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            gate_name: gate_name.into(),
            status,
            required: false,
            blocking: false,
            reason: reason.into(),
            detail: HashMap::new(),
        }
    }

    /// Mark the gate as required for the target mode.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Mark a failure of this gate as blocking.
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Attach a structured detail value.
    pub fn detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.detail.insert(key.into(), v);
        }
        self
    }

    /// A failure of a required, blocking gate.
    pub fn is_blocking_failure(&self) -> bool {
        self.status == GateStatus::Fail && self.required && self.blocking
    }
}

/// Result of the read-only phase-1 evaluation of all applicable gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightResult {
    pub target_mode: Mode,
    pub current_mode: Mode,
    pub checks: Vec<GateCheckResult>,
    pub overall_status: OverallStatus,
    pub blocking_reasons: Vec<String>,
    pub warnings: Vec<String>,
    pub can_proceed: bool,
    pub override_required: bool,
    /// Correlation id for audit events emitted while handling this request.
    pub request_id: Uuid,
}

impl PreflightResult {
    /// Aggregate individual check results into a preflight verdict.
    ///
    /// Overall `Fail` iff any required+blocking check failed; else
    /// `Warning` if any check failed or warned; else `Pass`.
    pub fn aggregate(current_mode: Mode, target_mode: Mode, checks: Vec<GateCheckResult>) -> Self {
        let blocking_reasons: Vec<String> = checks
            .iter()
            .filter(|c| c.is_blocking_failure())
            .map(|c| format!("{}: {}", c.gate_name, c.reason))
            .collect();

        let warnings: Vec<String> = checks
            .iter()
            .filter(|c| {
                matches!(c.status, GateStatus::Warning)
                    || (c.status == GateStatus::Fail && !c.is_blocking_failure())
            })
            .map(|c| format!("{}: {}", c.gate_name, c.reason))
            .collect();

        let overall_status = if !blocking_reasons.is_empty() {
            OverallStatus::Fail
        } else if !warnings.is_empty() {
            OverallStatus::Warning
        } else {
            OverallStatus::Pass
        };

        let can_proceed = overall_status != OverallStatus::Fail;

        Self {
            target_mode,
            current_mode,
            checks,
            overall_status,
            blocking_reasons,
            warnings,
            can_proceed,
            override_required: !can_proceed,
            request_id: Uuid::new_v4(),
        }
    }

    /// Names of gates whose check failed (blocking or not).
    pub fn failed_gates(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| c.status == GateStatus::Fail)
            .map(|c| c.gate_name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(name: &str) -> GateCheckResult {
        GateCheckResult::pass(name, "ok").required(true).blocking(true)
    }

    #[test]
    fn all_pass_aggregates_to_pass() {
        let result = PreflightResult::aggregate(
            Mode::Online,
            Mode::Sovereign,
            vec![pass("a"), pass("b")],
        );
        assert_eq!(result.overall_status, OverallStatus::Pass);
        assert!(result.can_proceed);
        assert!(!result.override_required);
        assert!(result.blocking_reasons.is_empty());
    }

    #[test]
    fn required_blocking_failure_aggregates_to_fail() {
        let result = PreflightResult::aggregate(
            Mode::Online,
            Mode::Sovereign,
            vec![
                pass("a"),
                GateCheckResult::fail("b", "bundle quarantined")
                    .required(true)
                    .blocking(true),
            ],
        );
        assert_eq!(result.overall_status, OverallStatus::Fail);
        assert!(!result.can_proceed);
        assert!(result.override_required);
        assert_eq!(result.blocking_reasons.len(), 1);
        assert!(result.blocking_reasons[0].contains("quarantined"));
    }

    #[test]
    fn non_blocking_failure_aggregates_to_warning() {
        let result = PreflightResult::aggregate(
            Mode::Online,
            Mode::Offline,
            vec![
                pass("a"),
                GateCheckResult::fail("b", "probe flaky").required(false).blocking(false),
            ],
        );
        assert_eq!(result.overall_status, OverallStatus::Warning);
        assert!(result.can_proceed);
        assert!(!result.override_required);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn not_applicable_checks_do_not_affect_verdict() {
        let result = PreflightResult::aggregate(
            Mode::Sovereign,
            Mode::Online,
            vec![pass("a"), GateCheckResult::not_applicable("b")],
        );
        assert_eq!(result.overall_status, OverallStatus::Pass);
    }
}
