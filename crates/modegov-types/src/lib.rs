//! # Modegov Types - Shared Data Model
//!
//! Core types shared across the mode governance engine:
//!
//! - [`Mode`]: the closed set of operating modes
//! - [`GateCheckResult`] / [`PreflightResult`]: gate-check verdicts
//! - [`Override`]: time-boxed, single-use justified exceptions
//! - [`AuditEvent`] / [`EventType`] / [`Severity`]: immutable audit records
//! - [`GovernanceError`] / [`OverrideError`]: the error taxonomy
//!
//! Severity is always derived from [`EventType`] through an exhaustive
//! match, so adding an event type forces an explicit severity decision.

pub mod audit;
pub mod error;
pub mod gates;
pub mod mode;
pub mod overrides;

pub use audit::{AuditEvent, AuditEventBuilder, EventType, Severity};
pub use error::{GovernanceError, OverrideError};
pub use gates::{GateCheckResult, GateStatus, OverallStatus, PreflightResult};
pub use mode::Mode;
pub use overrides::Override;
