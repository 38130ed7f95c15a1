//! Built-in gate checks

pub mod bundle;
pub mod gateway;
pub mod network;

pub use bundle::BundleTrustCheck;
pub use gateway::GatewayReadinessCheck;
pub use network::NetworkReachabilityCheck;
