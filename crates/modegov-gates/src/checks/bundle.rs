//! Trust bundle gate

use std::sync::Arc;

use async_trait::async_trait;
use modegov_types::{GateCheckResult, Mode};

use crate::error::GateError;
use crate::traits::{BundleTrustProvider, GateCheck};

/// Checks that the configured trust bundle is loadable before the node
/// leaves the network.
///
/// Applies only when the target mode requires a trust bundle
/// (`sovereign`, `offline`); there it is required and blocking.
pub struct BundleTrustCheck {
    provider: Arc<dyn BundleTrustProvider>,
    bundle_id: String,
}

impl BundleTrustCheck {
    pub const NAME: &'static str = "bundle_trust";

    pub fn new(provider: Arc<dyn BundleTrustProvider>, bundle_id: impl Into<String>) -> Self {
        Self {
            provider,
            bundle_id: bundle_id.into(),
        }
    }
}

#[async_trait]
impl GateCheck for BundleTrustCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn applies_to(&self, target: Mode) -> bool {
        target.requires_trust_bundle()
    }

    fn is_required(&self, target: Mode) -> bool {
        target.requires_trust_bundle()
    }

    fn is_blocking(&self, target: Mode) -> bool {
        target.requires_trust_bundle()
    }

    async fn evaluate(&self, _current: Mode, target: Mode) -> Result<GateCheckResult, GateError> {
        let trust = self.provider.validate(&self.bundle_id).await?;

        let result = if !trust.exists {
            GateCheckResult::fail(Self::NAME, format!("bundle '{}' not found", self.bundle_id))
        } else if trust.quarantined {
            GateCheckResult::fail(
                Self::NAME,
                format!("bundle '{}' is quarantined", self.bundle_id),
            )
        } else if !trust.signature_valid {
            GateCheckResult::fail(
                Self::NAME,
                format!("bundle '{}' signature invalid", self.bundle_id),
            )
        } else {
            GateCheckResult::pass(
                Self::NAME,
                format!("bundle '{}' trusted", self.bundle_id),
            )
        };

        Ok(result
            .required(self.is_required(target))
            .blocking(self.is_blocking(target))
            .detail("bundle_id", &self.bundle_id)
            .detail("trust", trust))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockBundleTrustProvider;
    use modegov_types::GateStatus;

    fn check(provider: MockBundleTrustProvider) -> BundleTrustCheck {
        BundleTrustCheck::new(Arc::new(provider), "core-bundle")
    }

    #[test]
    fn not_applicable_for_online() {
        assert!(!check(MockBundleTrustProvider::trusted()).applies_to(Mode::Online));
        assert!(check(MockBundleTrustProvider::trusted()).applies_to(Mode::Sovereign));
        assert!(check(MockBundleTrustProvider::trusted()).applies_to(Mode::Offline));
    }

    #[tokio::test]
    async fn trusted_bundle_passes() {
        let result = check(MockBundleTrustProvider::trusted())
            .evaluate(Mode::Online, Mode::Sovereign)
            .await
            .unwrap();
        assert_eq!(result.status, GateStatus::Pass);
        assert!(result.required);
    }

    #[tokio::test]
    async fn quarantined_bundle_blocks() {
        let result = check(MockBundleTrustProvider::quarantined())
            .evaluate(Mode::Online, Mode::Sovereign)
            .await
            .unwrap();
        assert!(result.is_blocking_failure());
        assert!(result.reason.contains("quarantined"));
    }

    #[tokio::test]
    async fn missing_bundle_blocks() {
        let result = check(MockBundleTrustProvider::missing())
            .evaluate(Mode::Online, Mode::Offline)
            .await
            .unwrap();
        assert!(result.is_blocking_failure());
        assert!(result.reason.contains("not found"));
    }

    #[tokio::test]
    async fn invalid_signature_blocks() {
        let result = check(MockBundleTrustProvider::bad_signature())
            .evaluate(Mode::Online, Mode::Offline)
            .await
            .unwrap();
        assert!(result.is_blocking_failure());
        assert!(result.reason.contains("signature"));
    }
}
