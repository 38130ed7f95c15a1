//! Governance metrics registry

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use prometheus::proto::MetricType;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Metrics for the mode governance engine.
///
/// All series are process-lifetime only and reset on restart.
pub struct GovernanceMetrics {
    registry: Registry,

    /// Successful mode switches by target mode
    mode_switch_total: IntCounterVec,

    /// Preflight gate failures by gate name
    preflight_failure_total: IntCounterVec,

    /// Consumed overrides
    override_usage_total: IntCounter,

    /// Whether an unconsumed override currently exists (0|1)
    override_active: IntGauge,
}

impl GovernanceMetrics {
    /// Create and register all governance metrics on a fresh registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let mode_switch_total = IntCounterVec::new(
            Opts::new("mode_switch_total", "Total committed mode switches"),
            &["target_mode"],
        )
        .expect("Failed to create mode_switch_total metric");
        registry
            .register(Box::new(mode_switch_total.clone()))
            .expect("Failed to register mode_switch_total");

        let preflight_failure_total = IntCounterVec::new(
            Opts::new("preflight_failure_total", "Total failed preflight gate checks"),
            &["gate"],
        )
        .expect("Failed to create preflight_failure_total metric");
        registry
            .register(Box::new(preflight_failure_total.clone()))
            .expect("Failed to register preflight_failure_total");

        let override_usage_total = IntCounter::new(
            "override_usage_total",
            "Total consumed governance overrides",
        )
        .expect("Failed to create override_usage_total metric");
        registry
            .register(Box::new(override_usage_total.clone()))
            .expect("Failed to register override_usage_total");

        let override_active = IntGauge::new(
            "override_active",
            "Whether an unconsumed override exists (0|1)",
        )
        .expect("Failed to create override_active metric");
        registry
            .register(Box::new(override_active.clone()))
            .expect("Failed to register override_active");

        Self {
            registry,
            mode_switch_total,
            preflight_failure_total,
            override_usage_total,
            override_active,
        }
    }

    /// Record a committed mode switch.
    pub fn record_mode_switch(&self, target_mode: &str) {
        match self.mode_switch_total.get_metric_with_label_values(&[target_mode]) {
            Ok(counter) => counter.inc(),
            Err(e) => warn!(target_mode, error = %e, "failed to record mode switch metric"),
        }
    }

    /// Record a failed preflight gate.
    pub fn record_preflight_failure(&self, gate: &str) {
        match self.preflight_failure_total.get_metric_with_label_values(&[gate]) {
            Ok(counter) => counter.inc(),
            Err(e) => warn!(gate, error = %e, "failed to record preflight failure metric"),
        }
    }

    /// Record a consumed override.
    pub fn record_override_usage(&self) {
        self.override_usage_total.inc();
    }

    /// Set whether an unconsumed override currently exists.
    pub fn set_override_active(&self, active: bool) {
        self.override_active.set(i64::from(active));
    }

    /// Export all series in Prometheus text format.
    pub fn export_text(&self) -> String {
        super::exporter::export_text(&self.registry)
    }

    /// Structured snapshot of all series.
    pub fn summary(&self) -> MetricsSummary {
        let mut series = Vec::new();

        for family in self.registry.gather() {
            for metric in family.get_metric() {
                let labels: HashMap<String, String> = metric
                    .get_label()
                    .iter()
                    .map(|l| (l.get_name().to_string(), l.get_value().to_string()))
                    .collect();

                let value = match family.get_field_type() {
                    MetricType::COUNTER => metric.get_counter().get_value(),
                    MetricType::GAUGE => metric.get_gauge().get_value(),
                    _ => continue,
                };

                series.push(MetricSeries {
                    name: family.get_name().to_string(),
                    labels,
                    value,
                });
            }
        }

        MetricsSummary {
            generated_at: Utc::now(),
            series,
        }
    }
}

impl Default for GovernanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// One metric series in a summary snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: String,
    pub labels: HashMap<String, String>,
    pub value: f64,
}

/// Structured snapshot of the metrics registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub generated_at: DateTime<Utc>,
    pub series: Vec<MetricSeries>,
}

impl MetricsSummary {
    /// Value of a series by name and label set, if present.
    pub fn value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.series
            .iter()
            .find(|s| {
                s.name == name
                    && labels
                        .iter()
                        .all(|(k, v)| s.labels.get(*k).map(String::as_str) == Some(*v))
            })
            .map(|s| s.value)
    }
}
