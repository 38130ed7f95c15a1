//! # Modegov Gates - Gate Check Framework
//!
//! Pluggable, side-effect-free checks that decide whether a node is ready
//! to enter a target mode.
//!
//! ## Key components
//!
//! - [`GateCheck`]: one readiness predicate per gate
//! - [`PreflightRunner`]: fans applicable checks out concurrently with a
//!   bounded per-check timeout and aggregates their verdicts
//! - [`checks`]: the built-in network, bundle-trust and gateway gates
//! - [`mocks`]: test doubles for the collaborator interfaces
//!
//! The runner is fail-closed: a check that errors or times out resolves to
//! a blocking `Fail`, never a silent skip.

pub mod checks;
pub mod error;
pub mod mocks;
pub mod runner;
pub mod traits;

pub use checks::{BundleTrustCheck, GatewayReadinessCheck, NetworkReachabilityCheck};
pub use error::GateError;
pub use runner::PreflightRunner;
pub use traits::{
    BundleTrust, BundleTrustProvider, GateCheck, IsolationGatewayController, NetworkProbe,
};
