//! Metrics collection and export for mode governance
//!
//! Prometheus-compatible counters and gauges. Recording is best-effort:
//! failures are logged and never surfaced to governance code.

pub mod exporter;
pub mod registry;

pub use exporter::export_text;
pub use registry::{GovernanceMetrics, MetricSeries, MetricsSummary};
