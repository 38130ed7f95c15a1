//! Test doubles for collaborator interfaces and gate checks
//!
//! Used by this crate's tests and by the engine's integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use modegov_types::{GateCheckResult, GateStatus, Mode};

use crate::error::GateError;
use crate::traits::{BundleTrust, BundleTrustProvider, GateCheck, IsolationGatewayController, NetworkProbe};

/// Mock network probe with a fixed answer.
pub struct MockNetworkProbe {
    available: bool,
    fail: bool,
}

impl MockNetworkProbe {
    pub fn available() -> Self {
        Self {
            available: true,
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            fail: false,
        }
    }

    /// A probe whose query itself errors.
    pub fn failing() -> Self {
        Self {
            available: false,
            fail: true,
        }
    }
}

#[async_trait]
impl NetworkProbe for MockNetworkProbe {
    async fn is_available(&self) -> Result<bool, GateError> {
        if self.fail {
            return Err(GateError::collaborator("network_probe", "probe unreachable"));
        }
        Ok(self.available)
    }
}

/// Mock bundle trust provider with a fixed verdict.
pub struct MockBundleTrustProvider {
    trust: BundleTrust,
    fail: bool,
}

impl MockBundleTrustProvider {
    pub fn trusted() -> Self {
        Self {
            trust: BundleTrust {
                exists: true,
                quarantined: false,
                signature_valid: true,
            },
            fail: false,
        }
    }

    pub fn missing() -> Self {
        Self {
            trust: BundleTrust {
                exists: false,
                quarantined: false,
                signature_valid: false,
            },
            fail: false,
        }
    }

    pub fn quarantined() -> Self {
        Self {
            trust: BundleTrust {
                exists: true,
                quarantined: true,
                signature_valid: true,
            },
            fail: false,
        }
    }

    pub fn bad_signature() -> Self {
        Self {
            trust: BundleTrust {
                exists: true,
                quarantined: false,
                signature_valid: false,
            },
            fail: false,
        }
    }

    /// A provider whose validation call itself errors.
    pub fn failing() -> Self {
        Self {
            trust: BundleTrust {
                exists: false,
                quarantined: false,
                signature_valid: false,
            },
            fail: true,
        }
    }
}

#[async_trait]
impl BundleTrustProvider for MockBundleTrustProvider {
    async fn validate(&self, _bundle_id: &str) -> Result<BundleTrust, GateError> {
        if self.fail {
            return Err(GateError::collaborator(
                "bundle_trust_provider",
                "validator unavailable",
            ));
        }
        Ok(self.trust)
    }
}

/// Mock isolation gateway controller.
///
/// Tracks start/stop calls so tests can assert commit ordering and
/// rollback compensation.
pub struct MockGatewayController {
    running: AtomicBool,
    fail_status: bool,
    fail_start: bool,
    fail_stop: bool,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl MockGatewayController {
    pub fn stopped() -> Self {
        Self::with_state(false)
    }

    pub fn running() -> Self {
        Self::with_state(true)
    }

    fn with_state(running: bool) -> Self {
        Self {
            running: AtomicBool::new(running),
            fail_status: false,
            fail_start: false,
            fail_stop: false,
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// A controller whose every call errors.
    pub fn failing() -> Self {
        Self {
            fail_status: true,
            fail_start: true,
            fail_stop: true,
            ..Self::with_state(false)
        }
    }

    /// A controller that answers status but fails to start.
    pub fn failing_on_start() -> Self {
        Self {
            fail_start: true,
            ..Self::with_state(false)
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IsolationGatewayController for MockGatewayController {
    async fn status(&self) -> Result<bool, GateError> {
        if self.fail_status {
            return Err(GateError::collaborator("isolation_gateway", "status query failed"));
        }
        Ok(self.running.load(Ordering::SeqCst))
    }

    async fn start(&self) -> Result<bool, GateError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(GateError::collaborator("isolation_gateway", "start failed"));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(true)
    }

    async fn stop(&self) -> Result<bool, GateError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(GateError::collaborator("isolation_gateway", "stop failed"));
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(false)
    }
}

/// Gate check with a fixed verdict, for runner and engine tests.
pub struct StaticCheck {
    name: String,
    status: GateStatus,
    required: bool,
    blocking: bool,
    applies: bool,
    delay: Option<Duration>,
    error: bool,
}

impl StaticCheck {
    pub fn passing(name: impl Into<String>) -> Self {
        Self::with_status(name, GateStatus::Pass)
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self::with_status(name, GateStatus::Fail)
    }

    pub fn warning(name: impl Into<String>) -> Self {
        Self::with_status(name, GateStatus::Warning).required_blocking(false, false)
    }

    /// A check whose evaluation errors.
    pub fn erroring(name: impl Into<String>) -> Self {
        Self {
            error: true,
            ..Self::with_status(name, GateStatus::Fail)
        }
    }

    fn with_status(name: impl Into<String>, status: GateStatus) -> Self {
        Self {
            name: name.into(),
            status,
            required: true,
            blocking: true,
            applies: true,
            delay: None,
            error: false,
        }
    }

    pub fn required_blocking(mut self, required: bool, blocking: bool) -> Self {
        self.required = required;
        self.blocking = blocking;
        self
    }

    /// Delay evaluation, for timeout and concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn not_applicable(mut self) -> Self {
        self.applies = false;
        self
    }
}

#[async_trait]
impl GateCheck for StaticCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies_to(&self, _target: Mode) -> bool {
        self.applies
    }

    fn is_required(&self, _target: Mode) -> bool {
        self.required
    }

    fn is_blocking(&self, _target: Mode) -> bool {
        self.blocking
    }

    async fn evaluate(&self, _current: Mode, _target: Mode) -> Result<GateCheckResult, GateError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.error {
            return Err(GateError::collaborator(&self.name, "mock failure"));
        }

        let result = match self.status {
            GateStatus::Pass => GateCheckResult::pass(&self.name, "mock pass"),
            GateStatus::Fail => GateCheckResult::fail(&self.name, "mock failure"),
            GateStatus::Warning => GateCheckResult::warning(&self.name, "mock warning"),
            GateStatus::Skipped => GateCheckResult::skipped(&self.name, "mock skip"),
            GateStatus::NotApplicable => GateCheckResult::not_applicable(&self.name),
        };

        Ok(result.required(self.required).blocking(self.blocking))
    }
}
