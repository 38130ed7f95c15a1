//! Override governor
//!
//! Creates, validates and consumes time-boxed justified exceptions. All
//! three operations are serialized by one lock so overrides stay
//! single-use even when two mode-change requests race on the same id.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use modegov_observability::{AuditSink, GovernanceMetrics};
use modegov_types::{AuditEvent, EventType, GovernanceError, Override, OverrideError};
use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::OverrideConfig;

/// Governs the lifecycle of justified overrides.
pub struct OverrideGovernor {
    config: OverrideConfig,
    overrides: Mutex<HashMap<Uuid, Override>>,
    audit: Arc<dyn AuditSink>,
    metrics: Arc<GovernanceMetrics>,
}

impl OverrideGovernor {
    pub fn new(
        config: OverrideConfig,
        audit: Arc<dyn AuditSink>,
        metrics: Arc<GovernanceMetrics>,
    ) -> Self {
        Self {
            config,
            overrides: Mutex::new(HashMap::new()),
            audit,
            metrics,
        }
    }

    /// Create an active override.
    ///
    /// Fails when the justification is shorter than the configured
    /// minimum or the duration falls outside the configured bounds.
    pub async fn create(
        &self,
        reason: &str,
        duration_secs: u64,
        correlation_id: Option<&str>,
    ) -> Result<Override, GovernanceError> {
        if reason.len() < self.config.min_reason_length {
            return Err(OverrideError::ReasonTooShort {
                actual: reason.len(),
                minimum: self.config.min_reason_length,
            }
            .into());
        }

        if duration_secs < self.config.min_duration_secs
            || duration_secs > self.config.max_duration_secs
        {
            return Err(OverrideError::DurationOutOfBounds {
                actual: duration_secs,
                min: self.config.min_duration_secs,
                max: self.config.max_duration_secs,
            }
            .into());
        }

        let override_ = Override::new(reason, duration_secs);

        {
            let mut overrides = self.overrides.lock();
            overrides.insert(override_.id, override_.clone());
            self.refresh_gauge(&overrides);
        }

        info!(
            override_id = %override_.id,
            duration_secs,
            "override created"
        );

        self.record(
            AuditEvent::builder(EventType::OverrideCreated)
                .reason(reason)
                .metadata("override_id", override_.id)
                .metadata("duration_seconds", duration_secs)
                .metadata("expires_at", override_.expires_at),
            correlation_id,
        )
        .await?;

        Ok(override_)
    }

    /// Check that an override can still satisfy a blocked transition.
    ///
    /// Expiry is evaluated lazily here; a consumed override never
    /// validates again, even before its expiry.
    pub async fn validate(
        &self,
        id: Uuid,
        correlation_id: Option<&str>,
    ) -> Result<(), GovernanceError> {
        let outcome = {
            let mut overrides = self.overrides.lock();
            match overrides.get(&id).cloned() {
                None => Err(OverrideError::NotFound { id }),
                Some(override_) if override_.consumed => {
                    Err(OverrideError::AlreadyConsumed { id })
                }
                Some(override_) if override_.is_expired(Utc::now()) => {
                    overrides.remove(&id);
                    self.refresh_gauge(&overrides);
                    Err(OverrideError::Expired { id })
                }
                Some(_) => Ok(()),
            }
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(e) => {
                let event_type = match e {
                    OverrideError::Expired { .. } => EventType::OverrideExpired,
                    _ => EventType::OverrideRejected,
                };
                self.record(
                    AuditEvent::builder(event_type)
                        .failed()
                        .reason(e.to_string())
                        .metadata("override_id", id),
                    correlation_id,
                )
                .await?;
                Err(e.into())
            }
        }
    }

    /// Consume an override. Single-use and irreversible.
    pub async fn consume(
        &self,
        id: Uuid,
        correlation_id: Option<&str>,
    ) -> Result<Override, GovernanceError> {
        let consumed = {
            let mut overrides = self.overrides.lock();
            let override_ = overrides
                .get_mut(&id)
                .ok_or(OverrideError::NotFound { id })?;

            if override_.consumed {
                return Err(OverrideError::AlreadyConsumed { id }.into());
            }

            override_.consumed = true;
            override_.consumed_at = Some(Utc::now());
            let consumed = override_.clone();
            self.refresh_gauge(&overrides);
            consumed
        };

        info!(override_id = %id, "override consumed");
        self.metrics.record_override_usage();

        self.record(
            AuditEvent::builder(EventType::OverrideUsed)
                .reason(&consumed.reason)
                .metadata("override_id", id)
                .metadata("consumed_at", consumed.consumed_at),
            correlation_id,
        )
        .await?;

        Ok(consumed)
    }

    /// Whether any unconsumed, unexpired override exists.
    pub fn has_active_override(&self) -> bool {
        let now = Utc::now();
        self.overrides
            .lock()
            .values()
            .any(|o| !o.consumed && !o.is_expired(now))
    }

    fn refresh_gauge(&self, overrides: &HashMap<Uuid, Override>) {
        let now = Utc::now();
        let active = overrides.values().any(|o| !o.consumed && !o.is_expired(now));
        self.metrics.set_override_active(active);
    }

    async fn record(
        &self,
        builder: modegov_types::AuditEventBuilder,
        correlation_id: Option<&str>,
    ) -> Result<(), GovernanceError> {
        let builder = match correlation_id {
            Some(id) => builder.correlation_id(id),
            None => builder,
        };
        self.audit
            .append(builder.build())
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to append override audit event");
                GovernanceError::Audit(e.to_string())
            })?;
        Ok(())
    }
}
