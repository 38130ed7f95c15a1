//! # Modegov Observability
//!
//! Audit and metrics infrastructure for the mode governance engine.
//!
//! ## Features
//!
//! - **Audit**: append-only sinks (memory, file, no-op) with filtered
//!   queries and tamper-evident export
//! - **Metrics**: Prometheus-compatible counters and gauges for mode
//!   switches, preflight failures and override usage
//!
//! Sinks are always injected; the [`NoopAuditSink`] stands in when audit
//! persistence is disabled, so callers never branch on an absent backend.

pub mod audit;
pub mod error;
pub mod metrics;

pub use audit::{
    AuditExport, AuditExporter, AuditFilter, AuditSink, FileAuditSink, MemoryAuditSink,
    NoopAuditSink,
};
pub use error::{ObservabilityError, Result};
pub use metrics::{GovernanceMetrics, MetricSeries, MetricsSummary};
