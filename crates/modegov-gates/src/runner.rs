//! Concurrent, fail-closed preflight runner

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use modegov_types::{GateCheckResult, Mode, PreflightResult};
use tracing::{debug, warn};

use crate::traits::GateCheck;

/// Default per-check timeout.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs all registered gate checks against a target mode.
///
/// Checks fan out concurrently and fan back in under a bounded per-check
/// timeout. A check that errors or times out resolves to a blocking
/// `Fail` so uncertainty can never approve a transition.
///
/// Running a preflight performs no side effects, so it doubles as the
/// dry-run entry point and as phase 1 of a mode change.
pub struct PreflightRunner {
    checks: Vec<Arc<dyn GateCheck>>,
    check_timeout: Duration,
}

impl PreflightRunner {
    pub fn new(check_timeout: Duration) -> Self {
        Self {
            checks: Vec::new(),
            check_timeout,
        }
    }

    /// Register a gate check.
    pub fn register(&mut self, check: Arc<dyn GateCheck>) {
        self.checks.push(check);
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run all applicable checks concurrently and aggregate the verdicts.
    pub async fn run(&self, current: Mode, target: Mode) -> PreflightResult {
        let futures = self
            .checks
            .iter()
            .map(|check| self.run_one(Arc::clone(check), current, target));

        let results = join_all(futures).await;

        debug!(
            current = %current,
            target = %target,
            checks = results.len(),
            "preflight evaluation complete"
        );

        PreflightResult::aggregate(current, target, results)
    }

    async fn run_one(
        &self,
        check: Arc<dyn GateCheck>,
        current: Mode,
        target: Mode,
    ) -> GateCheckResult {
        let name = check.name().to_string();

        if !check.applies_to(target) {
            return GateCheckResult::not_applicable(name);
        }

        let required = check.is_required(target);
        let blocking = check.is_blocking(target);

        match tokio::time::timeout(self.check_timeout, check.evaluate(current, target)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                // Fail-closed: collaborator errors block.
                warn!(gate = %name, error = %e, "gate check errored");
                GateCheckResult::fail(name, format!("check errored: {e}"))
                    .required(required)
                    .blocking(true)
            }
            Err(_) => {
                warn!(gate = %name, timeout = ?self.check_timeout, "gate check timed out");
                GateCheckResult::fail(
                    name,
                    format!("check timed out after {:?}", self.check_timeout),
                )
                .required(required)
                .blocking(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::StaticCheck;
    use modegov_types::{GateStatus, OverallStatus};

    fn runner_with(checks: Vec<StaticCheck>) -> PreflightRunner {
        let mut runner = PreflightRunner::new(Duration::from_millis(100));
        for check in checks {
            runner.register(Arc::new(check));
        }
        runner
    }

    #[tokio::test]
    async fn all_pass_yields_can_proceed() {
        let runner = runner_with(vec![
            StaticCheck::passing("a"),
            StaticCheck::passing("b"),
        ]);

        let result = runner.run(Mode::Online, Mode::Sovereign).await;
        assert_eq!(result.overall_status, OverallStatus::Pass);
        assert!(result.can_proceed);
        assert!(!result.override_required);
    }

    #[tokio::test]
    async fn failing_required_gate_blocks() {
        let runner = runner_with(vec![
            StaticCheck::passing("a"),
            StaticCheck::failing("b"),
        ]);

        let result = runner.run(Mode::Online, Mode::Sovereign).await;
        assert_eq!(result.overall_status, OverallStatus::Fail);
        assert!(!result.can_proceed);
        assert!(result.override_required);
    }

    #[tokio::test]
    async fn erroring_check_fails_closed() {
        let runner = runner_with(vec![StaticCheck::erroring("a")]);

        let result = runner.run(Mode::Online, Mode::Sovereign).await;
        assert_eq!(result.overall_status, OverallStatus::Fail);
        let check = &result.checks[0];
        assert_eq!(check.status, GateStatus::Fail);
        assert!(check.blocking);
        assert!(check.reason.contains("errored"));
    }

    #[tokio::test]
    async fn timed_out_check_fails_closed() {
        let runner = runner_with(vec![
            StaticCheck::passing("fast"),
            StaticCheck::passing("slow").with_delay(Duration::from_secs(10)),
        ]);

        let result = runner.run(Mode::Online, Mode::Sovereign).await;
        assert_eq!(result.overall_status, OverallStatus::Fail);

        let slow = result.checks.iter().find(|c| c.gate_name == "slow").unwrap();
        assert_eq!(slow.status, GateStatus::Fail);
        assert!(slow.blocking);
        assert!(slow.reason.contains("timed out"));
    }

    #[tokio::test]
    async fn non_applicable_check_is_skipped_not_failed() {
        let runner = runner_with(vec![
            StaticCheck::passing("a"),
            StaticCheck::passing("b").not_applicable(),
        ]);

        let result = runner.run(Mode::Sovereign, Mode::Online).await;
        assert_eq!(result.overall_status, OverallStatus::Pass);

        let b = result.checks.iter().find(|c| c.gate_name == "b").unwrap();
        assert_eq!(b.status, GateStatus::NotApplicable);
    }

    #[tokio::test]
    async fn checks_run_concurrently() {
        // Four checks, each sleeping 40ms, under a 100ms per-check
        // timeout: sequential execution would exceed it.
        let runner = runner_with(vec![
            StaticCheck::passing("a").with_delay(Duration::from_millis(40)),
            StaticCheck::passing("b").with_delay(Duration::from_millis(40)),
            StaticCheck::passing("c").with_delay(Duration::from_millis(40)),
            StaticCheck::passing("d").with_delay(Duration::from_millis(40)),
        ]);

        let started = std::time::Instant::now();
        let result = runner.run(Mode::Online, Mode::Sovereign).await;
        assert_eq!(result.overall_status, OverallStatus::Pass);
        assert!(started.elapsed() < Duration::from_millis(160));
    }
}
