//! Two-phase mode commit executor

use std::future::Future;
use std::sync::Arc;

use modegov_gates::checks::{BundleTrustCheck, GatewayReadinessCheck, NetworkReachabilityCheck};
use modegov_gates::{
    BundleTrustProvider, GateCheck, GateError, IsolationGatewayController, NetworkProbe,
    PreflightRunner,
};
use modegov_observability::{AuditSink, GovernanceMetrics, NoopAuditSink};
use modegov_types::{
    AuditEvent, AuditEventBuilder, EventType, GovernanceError, Mode, OverallStatus,
    PreflightResult,
};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::overrides::OverrideGovernor;
use crate::store::ConfigStore;

/// How a caller wants a blocked transition resolved.
///
/// The escapes are variants of one sum type, so a justified override and
/// the deprecated force flag cannot be supplied together and nothing
/// falls through to force by omission.
#[derive(Debug, Clone)]
pub enum OverrideDirective {
    /// No exception: a blocked preflight blocks the request.
    NoOverride,

    /// Create, validate and consume a justified override for this request.
    Justified { reason: String, duration_secs: u64 },

    /// Deprecated escape hatch retained for backward compatibility only.
    LegacyForce,
}

/// The mode governance engine.
///
/// Owns the current mode and the two-phase evaluate-then-commit protocol.
/// Preflights are read-only and may run concurrently; at most one commit
/// is in flight at a time. Once a commit starts it runs to completion,
/// success or rollback.
pub struct GovernanceEngine {
    pub(crate) config: EngineConfig,
    pub(crate) current: RwLock<Mode>,
    commit_lock: Mutex<()>,
    runner: PreflightRunner,
    governor: OverrideGovernor,
    bundle_trust: Arc<dyn BundleTrustProvider>,
    gateway: Arc<dyn IsolationGatewayController>,
    store: Arc<dyn ConfigStore>,
    pub(crate) audit: Arc<dyn AuditSink>,
    pub(crate) metrics: Arc<GovernanceMetrics>,
}

impl GovernanceEngine {
    /// Start building an engine from its collaborator interfaces.
    pub fn builder(
        network_probe: Arc<dyn NetworkProbe>,
        bundle_trust: Arc<dyn BundleTrustProvider>,
        gateway: Arc<dyn IsolationGatewayController>,
        store: Arc<dyn ConfigStore>,
    ) -> GovernanceEngineBuilder {
        GovernanceEngineBuilder::new(network_probe, bundle_trust, gateway, store)
    }

    /// The current operating mode.
    pub fn current_mode(&self) -> Mode {
        *self.current.read()
    }

    /// The override governor.
    pub fn governor(&self) -> &OverrideGovernor {
        &self.governor
    }

    /// Metrics in Prometheus text format.
    pub fn metrics_text(&self) -> String {
        self.metrics.export_text()
    }

    /// Structured metrics snapshot.
    pub fn metrics_summary(&self) -> modegov_observability::MetricsSummary {
        self.metrics.summary()
    }

    /// Phase 1 only: evaluate all applicable gates as a dry-run.
    ///
    /// Performs no side effects beyond audit/metrics recording, so
    /// concurrent preflights need no synchronization.
    pub async fn preflight(&self, target: Mode) -> Result<PreflightResult, GovernanceError> {
        let current = self.current_mode();
        self.run_preflight(current, target).await
    }

    /// Request a mode change.
    ///
    /// Runs preflight, applies the override directive if preflight
    /// blocks, then commits the transition's side effects in a fixed
    /// order. Any commit failure restores the pre-transition mode before
    /// returning, so the mode is consistent after any error.
    pub async fn request_mode_change(
        &self,
        target: Mode,
        directive: OverrideDirective,
    ) -> Result<Mode, GovernanceError> {
        let current = self.current_mode();

        if current == target {
            debug!(mode = %target, "mode change requested to current mode, nothing to do");
            return Ok(current);
        }

        // Phase 1: preflight.
        let preflight = self.run_preflight(current, target).await?;
        let request_id = preflight.request_id;

        // Decision.
        if !preflight.can_proceed {
            match &directive {
                OverrideDirective::Justified {
                    reason,
                    duration_secs,
                } => {
                    self.approve_via_override(reason, *duration_secs, request_id, &preflight)
                        .await?;
                }
                OverrideDirective::LegacyForce => {
                    warn!(
                        target = %target,
                        "legacy force flag used; deprecated, supply a justified override instead"
                    );
                    self.record(
                        AuditEvent::builder(EventType::LegacyForceUsed)
                            .reason("blocked transition forced via deprecated flag")
                            .metadata("target_mode", target)
                            .metadata("blocking_reasons", &preflight.blocking_reasons),
                        request_id,
                    )
                    .await?;
                }
                OverrideDirective::NoOverride => {
                    return Err(GovernanceError::blocked(preflight.blocking_reasons));
                }
            }
        }

        // Phase 2: commit.
        self.commit(target, request_id).await
    }

    async fn run_preflight(
        &self,
        current: Mode,
        target: Mode,
    ) -> Result<PreflightResult, GovernanceError> {
        let preflight = self.runner.run(current, target).await;

        for gate in preflight.failed_gates() {
            self.metrics.record_preflight_failure(gate);
        }

        let (event_type, reason) = match preflight.overall_status {
            OverallStatus::Pass => (
                EventType::PreflightOk,
                format!("all gates passed for {target}"),
            ),
            OverallStatus::Warning => (
                EventType::PreflightWarning,
                format!("preflight for {target} passed with warnings"),
            ),
            OverallStatus::Fail => (
                EventType::PreflightFailed,
                format!("preflight for {target} blocked"),
            ),
        };

        let mut builder = AuditEvent::builder(event_type)
            .reason(reason)
            .metadata("current_mode", current)
            .metadata("target_mode", target)
            .metadata("checks", &preflight.checks)
            .metadata("blocking_reasons", &preflight.blocking_reasons)
            .metadata("warnings", &preflight.warnings);
        if !preflight.can_proceed {
            builder = builder.failed();
        }
        self.record(builder, preflight.request_id).await?;

        Ok(preflight)
    }

    /// Create, validate and consume an override for this request.
    ///
    /// On an invalid override the caller receives a blocked error with
    /// the validation failure attached to the blocking reasons.
    async fn approve_via_override(
        &self,
        reason: &str,
        duration_secs: u64,
        request_id: Uuid,
        preflight: &PreflightResult,
    ) -> Result<(), GovernanceError> {
        let correlation = request_id.to_string();

        let result = async {
            let override_ = self
                .governor
                .create(reason, duration_secs, Some(&correlation))
                .await?;
            self.governor.validate(override_.id, Some(&correlation)).await?;
            self.governor.consume(override_.id, Some(&correlation)).await?;
            Ok::<(), GovernanceError>(())
        }
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(GovernanceError::OverrideInvalid(e)) => {
                let mut reasons = preflight.blocking_reasons.clone();
                reasons.push(format!("override invalid: {e}"));
                Err(GovernanceError::blocked(reasons))
            }
            Err(other) => Err(other),
        }
    }

    /// Phase 2: side effects in fixed order, then persistence.
    ///
    /// Runs under the commit lock; not cancellable once entered.
    async fn commit(&self, target: Mode, request_id: Uuid) -> Result<Mode, GovernanceError> {
        let _guard = self.commit_lock.lock().await;

        let previous = self.current_mode();
        if previous == target {
            // A racing request already committed this transition.
            return Ok(target);
        }

        *self.current.write() = target;

        match self.run_commit_steps(target).await {
            Ok(()) => {
                info!(previous = %previous, mode = %target, "mode changed");
                self.metrics.record_mode_switch(target.as_str());
                // The transition is committed and persisted at this point;
                // an audit append failure must not turn it into an error.
                self.record_best_effort(
                    AuditEvent::builder(EventType::ModeChanged)
                        .reason(format!("{previous} -> {target}"))
                        .metadata("previous_mode", previous)
                        .metadata("target_mode", target),
                    request_id,
                )
                .await;
                Ok(target)
            }
            Err(e) => {
                error!(
                    previous = %previous,
                    target = %target,
                    error = %e,
                    "commit failed, rolling back"
                );

                *self.current.write() = previous;

                self.record_best_effort(
                    AuditEvent::builder(EventType::ModeCommitFailed)
                        .failed()
                        .reason(e.to_string())
                        .metadata("previous_mode", previous)
                        .metadata("target_mode", target),
                    request_id,
                )
                .await;

                self.compensate_gateway(previous).await;

                self.record_best_effort(
                    AuditEvent::builder(EventType::ModeRollback)
                        .failed()
                        .reason(format!("mode restored to {previous}"))
                        .metadata("restored_mode", previous)
                        .metadata("target_mode", target),
                    request_id,
                )
                .await;

                Err(e)
            }
        }
    }

    async fn run_commit_steps(&self, target: Mode) -> Result<(), GovernanceError> {
        // Step 1: trust bundle validation when leaving the network.
        if target.requires_trust_bundle() {
            let trust = self
                .bounded("bundle_trust", self.bundle_trust.validate(&self.config.bundle_id))
                .await?;
            if !trust.is_trusted() {
                return Err(GovernanceError::commit_failed(
                    "bundle_trust",
                    format!("bundle '{}' not trusted", self.config.bundle_id),
                ));
            }
        }

        // Step 2: isolation gateway per target-mode policy.
        if target.gateway_enabled() {
            self.bounded("gateway_start", self.gateway.start()).await?;
        } else {
            self.bounded("gateway_stop", self.gateway.stop()).await?;
        }

        // Step 3: persist the new mode.
        match tokio::time::timeout(self.config.collaborator_timeout, self.store.save(target)).await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(GovernanceError::commit_failed("persist_mode", e.to_string())),
            Err(_) => Err(GovernanceError::commit_failed(
                "persist_mode",
                format!("timed out after {:?}", self.config.collaborator_timeout),
            )),
        }
    }

    /// Best-effort restoration of the gateway for the rolled-back mode.
    async fn compensate_gateway(&self, previous: Mode) {
        let result = if previous.gateway_enabled() {
            self.bounded("gateway_start", self.gateway.start()).await
        } else {
            self.bounded("gateway_stop", self.gateway.stop()).await
        };

        if let Err(e) = result {
            warn!(mode = %previous, error = %e, "gateway compensation failed during rollback");
        }
    }

    async fn bounded<T, F>(&self, step: &str, fut: F) -> Result<T, GovernanceError>
    where
        F: Future<Output = Result<T, GateError>>,
    {
        match tokio::time::timeout(self.config.collaborator_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(GovernanceError::commit_failed(step, e.to_string())),
            Err(_) => Err(GovernanceError::commit_failed(
                step,
                format!("timed out after {:?}", self.config.collaborator_timeout),
            )),
        }
    }

    pub(crate) async fn record(
        &self,
        builder: AuditEventBuilder,
        request_id: Uuid,
    ) -> Result<(), GovernanceError> {
        self.audit
            .append(builder.correlation_id(request_id).build())
            .await
            .map_err(|e| GovernanceError::Audit(e.to_string()))?;
        Ok(())
    }

    /// Audit append that must not change an already-settled commit outcome.
    async fn record_best_effort(&self, builder: AuditEventBuilder, request_id: Uuid) {
        if let Err(e) = self.audit.append(builder.correlation_id(request_id).build()).await {
            warn!(error = %e, "failed to append audit event");
        }
    }
}

/// Builds a [`GovernanceEngine`] from its collaborators.
///
/// The composition root wires concrete collaborator implementations here;
/// the engine itself depends only on the interfaces.
pub struct GovernanceEngineBuilder {
    network_probe: Arc<dyn NetworkProbe>,
    bundle_trust: Arc<dyn BundleTrustProvider>,
    gateway: Arc<dyn IsolationGatewayController>,
    store: Arc<dyn ConfigStore>,
    audit: Arc<dyn AuditSink>,
    metrics: Arc<GovernanceMetrics>,
    config: EngineConfig,
    initial_mode: Mode,
    extra_checks: Vec<Arc<dyn GateCheck>>,
}

impl GovernanceEngineBuilder {
    pub fn new(
        network_probe: Arc<dyn NetworkProbe>,
        bundle_trust: Arc<dyn BundleTrustProvider>,
        gateway: Arc<dyn IsolationGatewayController>,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            network_probe,
            bundle_trust,
            gateway,
            store,
            audit: Arc::new(NoopAuditSink),
            metrics: Arc::new(GovernanceMetrics::new()),
            config: EngineConfig::default(),
            initial_mode: Mode::Online,
            extra_checks: Vec::new(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn metrics(mut self, metrics: Arc<GovernanceMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Mode to start in when the store holds no persisted mode.
    pub fn initial_mode(mut self, mode: Mode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Register an additional gate check beyond the built-ins.
    pub fn register_check(mut self, check: Arc<dyn GateCheck>) -> Self {
        self.extra_checks.push(check);
        self
    }

    /// Build the engine, restoring the persisted mode from the store.
    pub async fn build(self) -> Result<GovernanceEngine, GovernanceError> {
        let mut runner = PreflightRunner::new(self.config.check_timeout);
        runner.register(Arc::new(NetworkReachabilityCheck::new(
            self.network_probe.clone(),
        )));
        runner.register(Arc::new(BundleTrustCheck::new(
            self.bundle_trust.clone(),
            self.config.bundle_id.clone(),
        )));
        runner.register(Arc::new(GatewayReadinessCheck::new(self.gateway.clone())));
        for check in self.extra_checks {
            runner.register(check);
        }

        let mode = self
            .store
            .load()
            .await
            .map_err(|e| GovernanceError::Store(e.to_string()))?
            .unwrap_or(self.initial_mode);

        info!(mode = %mode, checks = runner.len(), "governance engine initialized");

        let governor = OverrideGovernor::new(
            self.config.overrides.clone(),
            self.audit.clone(),
            self.metrics.clone(),
        );

        Ok(GovernanceEngine {
            config: self.config,
            current: RwLock::new(mode),
            commit_lock: Mutex::new(()),
            runner,
            governor,
            bundle_trust: self.bundle_trust,
            gateway: self.gateway,
            store: self.store,
            audit: self.audit,
            metrics: self.metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConfigStore;
    use modegov_gates::mocks::{
        MockBundleTrustProvider, MockGatewayController, MockNetworkProbe,
    };
    use modegov_observability::MemoryAuditSink;

    async fn engine_with(
        gateway: Arc<MockGatewayController>,
        store: Arc<MemoryConfigStore>,
    ) -> GovernanceEngine {
        GovernanceEngine::builder(
            Arc::new(MockNetworkProbe::available()),
            Arc::new(MockBundleTrustProvider::trusted()),
            gateway,
            store,
        )
        .audit(Arc::new(MemoryAuditSink::new()))
        .build()
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn builder_restores_persisted_mode() {
        let store = Arc::new(MemoryConfigStore::with_mode(Mode::Sovereign));
        let engine = engine_with(Arc::new(MockGatewayController::running()), store).await;
        assert_eq!(engine.current_mode(), Mode::Sovereign);
    }

    #[tokio::test]
    async fn builder_defaults_to_initial_mode() {
        let store = Arc::new(MemoryConfigStore::new());
        let engine = engine_with(Arc::new(MockGatewayController::stopped()), store).await;
        assert_eq!(engine.current_mode(), Mode::Online);
    }

    #[tokio::test]
    async fn no_op_transition_short_circuits() {
        let store = Arc::new(MemoryConfigStore::new());
        let gateway = Arc::new(MockGatewayController::stopped());
        let engine = engine_with(gateway.clone(), store).await;

        let mode = engine
            .request_mode_change(Mode::Online, OverrideDirective::NoOverride)
            .await
            .unwrap();
        assert_eq!(mode, Mode::Online);
        // No commit ran.
        assert_eq!(gateway.start_calls() + gateway.stop_calls(), 0);
    }

    #[tokio::test]
    async fn successful_commit_starts_gateway_and_persists() {
        let store = Arc::new(MemoryConfigStore::new());
        let gateway = Arc::new(MockGatewayController::stopped());
        let engine = engine_with(gateway.clone(), store.clone()).await;

        let mode = engine
            .request_mode_change(Mode::Sovereign, OverrideDirective::NoOverride)
            .await
            .unwrap();

        assert_eq!(mode, Mode::Sovereign);
        assert_eq!(engine.current_mode(), Mode::Sovereign);
        assert!(gateway.is_running());
        assert_eq!(store.persisted(), Some(Mode::Sovereign));
    }

    /// Sink that rejects appends of one event type and stores the rest.
    struct RejectingSink {
        inner: MemoryAuditSink,
        reject: EventType,
    }

    #[async_trait::async_trait]
    impl AuditSink for RejectingSink {
        async fn append(
            &self,
            event: AuditEvent,
        ) -> modegov_observability::Result<AuditEvent> {
            if event.event_type == self.reject {
                return Err(modegov_observability::ObservabilityError::Audit(
                    "sink offline".into(),
                ));
            }
            self.inner.append(event).await
        }

        async fn query(
            &self,
            filter: &modegov_observability::AuditFilter,
        ) -> modegov_observability::Result<Vec<AuditEvent>> {
            self.inner.query(filter).await
        }

        async fn count(&self) -> modegov_observability::Result<u64> {
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn committed_transition_survives_audit_append_failure() {
        let store = Arc::new(MemoryConfigStore::new());
        let engine = GovernanceEngine::builder(
            Arc::new(MockNetworkProbe::available()),
            Arc::new(MockBundleTrustProvider::trusted()),
            Arc::new(MockGatewayController::stopped()),
            store.clone(),
        )
        .audit(Arc::new(RejectingSink {
            inner: MemoryAuditSink::new(),
            reject: EventType::ModeChanged,
        }))
        .build()
        .await
        .unwrap();

        let mode = engine
            .request_mode_change(Mode::Sovereign, OverrideDirective::NoOverride)
            .await
            .unwrap();

        // The commit settled, so the caller sees success and the counter
        // still moves even though the final append failed.
        assert_eq!(mode, Mode::Sovereign);
        assert_eq!(engine.current_mode(), Mode::Sovereign);
        assert_eq!(store.persisted(), Some(Mode::Sovereign));
        assert_eq!(
            engine
                .metrics_summary()
                .value("mode_switch_total", &[("target_mode", "sovereign")]),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn leaving_sovereign_stops_gateway() {
        let store = Arc::new(MemoryConfigStore::with_mode(Mode::Sovereign));
        let gateway = Arc::new(MockGatewayController::running());
        let engine = engine_with(gateway.clone(), store).await;

        engine
            .request_mode_change(Mode::Offline, OverrideDirective::NoOverride)
            .await
            .unwrap();

        assert!(!gateway.is_running());
        assert_eq!(engine.current_mode(), Mode::Offline);
    }
}
