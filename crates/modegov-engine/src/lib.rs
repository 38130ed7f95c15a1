//! # Modegov Engine - Mode Commit Executor and Governance Facade
//!
//! Orchestrates governed transitions between operating modes via a
//! two-phase evaluate-then-commit protocol:
//!
//! 1. **Preflight** (read-only): all applicable gate checks run
//!    concurrently and aggregate into a verdict.
//! 2. **Commit**: the side effects for the target mode execute in a fixed
//!    order; any failure rolls the mode back to its pre-transition value.
//!
//! Blocked transitions may proceed with a time-boxed, single-use
//! [`OverrideGovernor`] exception. Every decision is recorded in the
//! audit sink and reflected in the metrics registry.
//!
//! ## Key components
//!
//! - [`GovernanceEngine`]: owns the current mode and the commit protocol
//! - [`OverrideDirective`]: `NoOverride | Justified | LegacyForce`
//! - [`OverrideGovernor`]: creates, validates and consumes overrides
//! - [`GovernanceStatus`]: per-category health rollup over recent events
//!
//! The engine is an explicit instance constructed once through
//! [`GovernanceEngineBuilder`] and shared by reference; there is no
//! module-level state.

pub mod config;
pub mod engine;
pub mod overrides;
pub mod status;
pub mod store;

pub use config::{EngineConfig, OverrideConfig, StatusConfig};
pub use engine::{GovernanceEngine, GovernanceEngineBuilder, OverrideDirective};
pub use overrides::OverrideGovernor;
pub use status::{CategoryHealth, GovernanceStatus, HealthState};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore, StoreError};
