//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the governance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trust bundle required when entering sovereign or offline mode
    pub bundle_id: String,

    /// Per-gate-check timeout during preflight
    #[serde(with = "duration_secs")]
    pub check_timeout: Duration,

    /// Timeout for each collaborator call during commit
    #[serde(with = "duration_secs")]
    pub collaborator_timeout: Duration,

    /// Override bounds
    pub overrides: OverrideConfig,

    /// Status rollup parameters
    pub status: StatusConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bundle_id: "sovereign-core".into(),
            check_timeout: Duration::from_secs(5),
            collaborator_timeout: Duration::from_secs(10),
            overrides: OverrideConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

/// Bounds for justified overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideConfig {
    /// Minimum length of an override justification
    pub min_reason_length: usize,

    /// Minimum override duration in seconds
    pub min_duration_secs: u64,

    /// Maximum override duration in seconds
    pub max_duration_secs: u64,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            min_reason_length: 10,
            min_duration_secs: 60,
            max_duration_secs: 86_400,
        }
    }
}

/// Parameters for the governance status rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// How far back the rollup looks
    pub window_hours: i64,

    /// How many recent critical events to include
    pub recent_critical_limit: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            recent_critical_limit: 10,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert!(config.overrides.min_duration_secs < config.overrides.max_duration_secs);
        assert!(config.overrides.min_reason_length > 0);
        assert!(config.status.window_hours > 0);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.check_timeout, config.check_timeout);
        assert_eq!(back.bundle_id, config.bundle_id);
    }
}
