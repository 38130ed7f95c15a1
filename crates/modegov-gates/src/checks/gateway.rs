//! Isolation gateway readiness gate

use std::sync::Arc;

use async_trait::async_trait;
use modegov_types::{GateCheckResult, Mode};

use crate::error::GateError;
use crate::traits::{GateCheck, IsolationGatewayController};

/// Checks that the isolation gateway controller answers a status query.
///
/// Entering `sovereign` the gateway must be controllable
/// (required+blocking); for other targets a lingering running gateway is
/// only a warning.
pub struct GatewayReadinessCheck {
    controller: Arc<dyn IsolationGatewayController>,
}

impl GatewayReadinessCheck {
    pub const NAME: &'static str = "gateway_readiness";

    pub fn new(controller: Arc<dyn IsolationGatewayController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl GateCheck for GatewayReadinessCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_required(&self, target: Mode) -> bool {
        target == Mode::Sovereign
    }

    fn is_blocking(&self, target: Mode) -> bool {
        target == Mode::Sovereign
    }

    async fn evaluate(&self, _current: Mode, target: Mode) -> Result<GateCheckResult, GateError> {
        let running = self.controller.status().await?;

        let result = if target != Mode::Sovereign && running {
            GateCheckResult::warning(
                Self::NAME,
                "isolation gateway still running for non-sovereign target",
            )
        } else {
            GateCheckResult::pass(Self::NAME, "isolation gateway controllable")
        };

        Ok(result
            .required(self.is_required(target))
            .blocking(self.is_blocking(target))
            .detail("running", running))
    }
}
