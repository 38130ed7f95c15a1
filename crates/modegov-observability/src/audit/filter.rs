//! Audit query filters

use chrono::{DateTime, Utc};
use modegov_types::{AuditEvent, EventType, Severity};
use serde::{Deserialize, Serialize};

/// Filter for audit queries and exports.
///
/// Time bounds are inclusive on both ends. An absent `event_types` set
/// means all types match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Inclusive start of the time window
    pub start_time: Option<DateTime<Utc>>,

    /// Inclusive end of the time window
    pub end_time: Option<DateTime<Utc>>,

    /// Event types to include (absence = all)
    pub event_types: Option<Vec<EventType>>,

    /// Minimum severity to include
    pub min_severity: Option<Severity>,

    /// Correlation id to match
    pub correlation_id: Option<String>,

    /// Maximum number of results
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// Create a filter matching everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to events since the given instant (inclusive).
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start),
            ..Self::default()
        }
    }

    /// Restrict to the given event types.
    pub fn event_types(mut self, types: Vec<EventType>) -> Self {
        self.event_types = Some(types);
        self
    }

    /// Restrict to events at or above the given severity.
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    /// Restrict to one correlation id.
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether an event matches this filter.
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(start) = self.start_time {
            if event.timestamp < start {
                return false;
            }
        }

        if let Some(end) = self.end_time {
            if event.timestamp > end {
                return false;
            }
        }

        if let Some(ref types) = self.event_types {
            if !types.contains(&event.event_type) {
                return false;
            }
        }

        if let Some(min) = self.min_severity {
            if event.severity < min {
                return false;
            }
        }

        if let Some(ref correlation_id) = self.correlation_id {
            if event.correlation_id.as_ref() != Some(correlation_id) {
                return false;
            }
        }

        true
    }

    /// Apply the filter to a list of events, oldest first.
    pub fn apply(&self, events: &[AuditEvent]) -> Vec<AuditEvent> {
        let mut results: Vec<AuditEvent> =
            events.iter().filter(|e| self.matches(e)).cloned().collect();

        results.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }
}
