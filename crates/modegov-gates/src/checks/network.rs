//! Network reachability gate

use std::sync::Arc;

use async_trait::async_trait;
use modegov_types::{GateCheckResult, Mode};

use crate::error::GateError;
use crate::traits::{GateCheck, NetworkProbe};

/// Checks upstream network reachability.
///
/// Entering `online` requires the probe to report reachability; when
/// leaving the network the probe result is informational only.
pub struct NetworkReachabilityCheck {
    probe: Arc<dyn NetworkProbe>,
}

impl NetworkReachabilityCheck {
    pub const NAME: &'static str = "network_reachability";

    pub fn new(probe: Arc<dyn NetworkProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl GateCheck for NetworkReachabilityCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_required(&self, target: Mode) -> bool {
        target == Mode::Online
    }

    fn is_blocking(&self, target: Mode) -> bool {
        target == Mode::Online
    }

    async fn evaluate(&self, _current: Mode, target: Mode) -> Result<GateCheckResult, GateError> {
        let reachable = self.probe.is_available().await?;

        let result = match (target, reachable) {
            (Mode::Online, true) => {
                GateCheckResult::pass(Self::NAME, "upstream network reachable")
            }
            (Mode::Online, false) => {
                GateCheckResult::fail(Self::NAME, "upstream network unreachable")
            }
            // Leaving the network: reachability is informational.
            (_, reachable) => GateCheckResult::pass(
                Self::NAME,
                if reachable {
                    "upstream network reachable (not required for target mode)"
                } else {
                    "upstream network unreachable (not required for target mode)"
                },
            ),
        };

        Ok(result
            .required(self.is_required(target))
            .blocking(self.is_blocking(target))
            .detail("reachable", reachable))
    }
}
