//! Status and export facade
//!
//! Aggregates recent audit events and current metrics into a per-category
//! health rollup, and produces tamper-evident audit exports.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use modegov_observability::{AuditExport, AuditExporter, AuditFilter, MetricsSummary};
use modegov_types::{AuditEvent, EventType, GovernanceError, Mode, Severity};
use serde::{Deserialize, Serialize};

use crate::config::StatusConfig;
use crate::engine::GovernanceEngine;

/// Health of one category, or of governance overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Warning,
    Critical,
}

/// Rollup for one event category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryHealth {
    pub state: HealthState,
    pub event_count: usize,
    pub last_event_at: Option<DateTime<Utc>>,
}

/// Snapshot of governance health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceStatus {
    /// Worst of the category states
    pub overall: HealthState,

    /// Per-category rollups
    pub categories: BTreeMap<String, CategoryHealth>,

    /// Most recent critical events, newest first
    pub recent_critical: Vec<AuditEvent>,

    /// Current operating mode
    pub current_mode: Mode,

    /// How far back the rollup looked
    pub window_hours: i64,

    /// Current metrics snapshot
    pub metrics: MetricsSummary,

    pub generated_at: DateTime<Utc>,
}

/// Category an event type rolls up into.
fn category(event_type: EventType) -> &'static str {
    match event_type {
        EventType::ModeChanged | EventType::ModeCommitFailed | EventType::ModeRollback => {
            "transitions"
        }
        EventType::PreflightOk | EventType::PreflightWarning | EventType::PreflightFailed => {
            "preflight"
        }
        EventType::OverrideCreated
        | EventType::OverrideUsed
        | EventType::OverrideExpired
        | EventType::OverrideRejected
        | EventType::LegacyForceUsed => "overrides",
        EventType::AuditExported => "audit",
    }
}

const CATEGORIES: [&str; 4] = ["transitions", "preflight", "overrides", "audit"];

fn state_for(severity: Severity) -> HealthState {
    match severity {
        Severity::Critical => HealthState::Critical,
        Severity::Error | Severity::Warning => HealthState::Warning,
        Severity::Info => HealthState::Healthy,
    }
}

pub(crate) fn build(
    current_mode: Mode,
    events: &[AuditEvent],
    metrics: MetricsSummary,
    config: &StatusConfig,
) -> GovernanceStatus {
    let mut categories: BTreeMap<String, CategoryHealth> = CATEGORIES
        .iter()
        .map(|name| {
            (
                (*name).to_string(),
                CategoryHealth {
                    state: HealthState::Healthy,
                    event_count: 0,
                    last_event_at: None,
                },
            )
        })
        .collect();

    for event in events {
        let name = category(event.event_type);
        if let Some(entry) = categories.get_mut(name) {
            entry.event_count += 1;
            entry.state = entry.state.max(state_for(event.severity));
            entry.last_event_at = entry.last_event_at.max(Some(event.timestamp));
        }
    }

    let overall = categories
        .values()
        .map(|c| c.state)
        .max()
        .unwrap_or(HealthState::Healthy);

    let mut recent_critical: Vec<AuditEvent> = events
        .iter()
        .filter(|e| e.severity == Severity::Critical)
        .cloned()
        .collect();
    recent_critical.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent_critical.truncate(config.recent_critical_limit);

    GovernanceStatus {
        overall,
        categories,
        recent_critical,
        current_mode,
        window_hours: config.window_hours,
        metrics,
        generated_at: Utc::now(),
    }
}

impl GovernanceEngine {
    /// Health rollup over the recent audit window plus current metrics.
    pub async fn governance_status(&self) -> Result<GovernanceStatus, GovernanceError> {
        let window_start = Utc::now() - Duration::hours(self.config.status.window_hours);
        let events = self
            .audit
            .query(&AuditFilter::since(window_start))
            .await
            .map_err(|e| GovernanceError::Audit(e.to_string()))?;

        Ok(build(
            self.current_mode(),
            &events,
            self.metrics.summary(),
            &self.config.status,
        ))
    }

    /// Export audit events matching the filter.
    ///
    /// The export itself is recorded as an `AuditExported` event carrying
    /// the filter and count, never the content.
    pub async fn export_audit(
        &self,
        filter: &AuditFilter,
        include_hash: bool,
    ) -> Result<AuditExport, GovernanceError> {
        let exporter = AuditExporter::new(self.audit.clone());
        let export = exporter
            .export(filter, include_hash)
            .await
            .map_err(|e| GovernanceError::Audit(e.to_string()))?;

        self.record(
            modegov_types::AuditEvent::builder(EventType::AuditExported)
                .reason(format!("exported {} audit events", export.event_count))
                .metadata("event_count", export.event_count)
                .metadata("filter", filter)
                .metadata("hashed", include_hash),
            export.export_id,
        )
        .await?;

        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modegov_observability::GovernanceMetrics;

    fn event(event_type: EventType) -> AuditEvent {
        AuditEvent::builder(event_type).reason("test").build()
    }

    fn summary() -> MetricsSummary {
        GovernanceMetrics::new().summary()
    }

    #[test]
    fn empty_window_is_healthy() {
        let status = build(Mode::Online, &[], summary(), &StatusConfig::default());
        assert_eq!(status.overall, HealthState::Healthy);
        assert_eq!(status.categories.len(), 4);
        assert!(status.recent_critical.is_empty());
    }

    #[test]
    fn rollback_makes_transitions_critical() {
        let events = vec![event(EventType::ModeChanged), event(EventType::ModeRollback)];
        let status = build(Mode::Online, &events, summary(), &StatusConfig::default());

        assert_eq!(status.categories["transitions"].state, HealthState::Critical);
        assert_eq!(status.overall, HealthState::Critical);
        assert_eq!(status.recent_critical.len(), 1);
    }

    #[test]
    fn override_usage_warns_without_escalating_other_categories() {
        let events = vec![event(EventType::OverrideUsed), event(EventType::PreflightOk)];
        let status = build(Mode::Sovereign, &events, summary(), &StatusConfig::default());

        assert_eq!(status.categories["overrides"].state, HealthState::Warning);
        assert_eq!(status.categories["preflight"].state, HealthState::Healthy);
        assert_eq!(status.overall, HealthState::Warning);
    }

    #[test]
    fn recent_critical_is_limited_and_newest_first() {
        let mut events = Vec::new();
        for i in 0..5 {
            let mut e = event(EventType::ModeCommitFailed);
            e.timestamp = Utc::now() - Duration::minutes(i);
            events.push(e);
        }

        let config = StatusConfig {
            window_hours: 24,
            recent_critical_limit: 3,
        };
        let status = build(Mode::Online, &events, summary(), &config);

        assert_eq!(status.recent_critical.len(), 3);
        assert!(status.recent_critical[0].timestamp > status.recent_critical[1].timestamp);
    }
}
