//! Gate check and collaborator traits
//!
//! Collaborator implementations live outside the engine; concrete wiring
//! happens at the composition root, so the engine depends only on these
//! interfaces.

use async_trait::async_trait;
use modegov_types::{GateCheckResult, Mode};
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// A single, side-effect-free readiness predicate for a target mode.
///
/// `evaluate` must not mutate shared state or trigger irreversible side
/// effects; it only queries collaborators.
#[async_trait]
pub trait GateCheck: Send + Sync {
    /// Stable gate name, used in results, metrics and audit metadata.
    fn name(&self) -> &str;

    /// Whether this gate applies when entering the target mode.
    ///
    /// Non-applicable gates resolve to `NotApplicable` without being
    /// evaluated.
    fn applies_to(&self, target: Mode) -> bool {
        let _ = target;
        true
    }

    /// Whether this gate is required for the target mode.
    fn is_required(&self, target: Mode) -> bool;

    /// Whether a failure of this gate blocks the transition.
    fn is_blocking(&self, target: Mode) -> bool;

    /// Evaluate readiness for the transition. Read-only.
    async fn evaluate(&self, current: Mode, target: Mode) -> Result<GateCheckResult, GateError>;
}

/// Probe for upstream network reachability.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn is_available(&self) -> Result<bool, GateError>;
}

/// Trust verdict for a loadable bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleTrust {
    pub exists: bool,
    pub quarantined: bool,
    pub signature_valid: bool,
}

impl BundleTrust {
    /// Trusted iff present, unquarantined and validly signed.
    pub fn is_trusted(&self) -> bool {
        self.exists && !self.quarantined && self.signature_valid
    }
}

/// Validator for trust bundles loaded when leaving the network.
#[async_trait]
pub trait BundleTrustProvider: Send + Sync {
    async fn validate(&self, bundle_id: &str) -> Result<BundleTrust, GateError>;
}

/// Start/stop-able isolation gateway.
///
/// `status`/`start`/`stop` report whether the gateway is running after
/// the call.
#[async_trait]
pub trait IsolationGatewayController: Send + Sync {
    async fn status(&self) -> Result<bool, GateError>;
    async fn start(&self) -> Result<bool, GateError>;
    async fn stop(&self) -> Result<bool, GateError>;
}
