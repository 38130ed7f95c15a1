//! Audit event types
//!
//! Events are immutable once appended to a sink. Severity is derived
//! deterministically from the event type; callers never set it ad hoc.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of governance event types.
///
/// Every variant must appear in [`EventType::severity`], so adding a type
/// forces an explicit severity decision at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PreflightOk,
    PreflightWarning,
    PreflightFailed,
    ModeChanged,
    ModeCommitFailed,
    ModeRollback,
    OverrideCreated,
    OverrideUsed,
    OverrideExpired,
    OverrideRejected,
    LegacyForceUsed,
    AuditExported,
}

impl EventType {
    /// Severity mapping for the closed event-type set.
    pub fn severity(&self) -> Severity {
        match self {
            EventType::PreflightOk => Severity::Info,
            EventType::PreflightWarning => Severity::Warning,
            EventType::PreflightFailed => Severity::Warning,
            EventType::ModeChanged => Severity::Info,
            EventType::ModeCommitFailed => Severity::Critical,
            EventType::ModeRollback => Severity::Critical,
            EventType::OverrideCreated => Severity::Warning,
            EventType::OverrideUsed => Severity::Warning,
            EventType::OverrideExpired => Severity::Warning,
            EventType::OverrideRejected => Severity::Warning,
            EventType::LegacyForceUsed => Severity::Warning,
            EventType::AuditExported => Severity::Info,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::PreflightOk => "preflight_ok",
            EventType::PreflightWarning => "preflight_warning",
            EventType::PreflightFailed => "preflight_failed",
            EventType::ModeChanged => "mode_changed",
            EventType::ModeCommitFailed => "mode_commit_failed",
            EventType::ModeRollback => "mode_rollback",
            EventType::OverrideCreated => "override_created",
            EventType::OverrideUsed => "override_used",
            EventType::OverrideExpired => "override_expired",
            EventType::OverrideRejected => "override_rejected",
            EventType::LegacyForceUsed => "legacy_force_used",
            EventType::AuditExported => "audit_exported",
        };
        f.write_str(name)
    }
}

/// Event severity, ordered for worst-of rollups.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// An immutable governance audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,

    /// Event type
    pub event_type: EventType,

    /// Severity, derived from the event type
    pub severity: Severity,

    /// Whether the underlying operation succeeded
    pub success: bool,

    /// Human-readable reason
    pub reason: String,

    /// Structured metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Request correlation id
    pub correlation_id: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event builder for the given type.
    pub fn builder(event_type: EventType) -> AuditEventBuilder {
        AuditEventBuilder::new(event_type)
    }
}

/// Builder for audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    event_type: EventType,
    success: bool,
    reason: String,
    metadata: HashMap<String, serde_json::Value>,
    correlation_id: Option<String>,
}

impl AuditEventBuilder {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            success: true,
            reason: String::new(),
            metadata: HashMap::new(),
            correlation_id: None,
        }
    }

    /// Mark the underlying operation as failed.
    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    /// Set the human-readable reason.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Attach a metadata value.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }

    /// Set the request correlation id.
    pub fn correlation_id(mut self, id: impl ToString) -> Self {
        self.correlation_id = Some(id.to_string());
        self
    }

    /// Build the event. Severity comes from the event type.
    pub fn build(self) -> AuditEvent {
        AuditEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            severity: self.event_type.severity(),
            success: self.success,
            reason: self.reason,
            metadata: self.metadata,
            correlation_id: self.correlation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_derives_severity_from_type() {
        let event = AuditEvent::builder(EventType::ModeRollback)
            .failed()
            .reason("config store write failed")
            .build();
        assert_eq!(event.severity, Severity::Critical);
        assert!(!event.success);
    }

    #[test]
    fn builder_carries_metadata_and_correlation() {
        let event = AuditEvent::builder(EventType::ModeChanged)
            .reason("online -> sovereign")
            .metadata("target_mode", "sovereign")
            .correlation_id("req-1")
            .build();
        assert_eq!(event.severity, Severity::Info);
        assert_eq!(
            event.metadata.get("target_mode").and_then(|v| v.as_str()),
            Some("sovereign")
        );
        assert_eq!(event.correlation_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn severity_orders_worst_last() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn commit_failures_are_critical() {
        assert_eq!(EventType::ModeCommitFailed.severity(), Severity::Critical);
        assert_eq!(EventType::ModeRollback.severity(), Severity::Critical);
    }
}
