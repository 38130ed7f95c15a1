//! Operating modes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating mode of the node.
///
/// Exactly one mode is current at any time. The current mode is owned by
/// the commit executor and mutated only by a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fully networked operation.
    Online,
    /// Isolated operation behind the isolation gateway.
    Sovereign,
    /// Fully offline operation.
    Offline,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Mode; 3] = [Mode::Online, Mode::Sovereign, Mode::Offline];

    /// Stable string form, used as a metric label and in audit metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Online => "online",
            Mode::Sovereign => "sovereign",
            Mode::Offline => "offline",
        }
    }

    /// Whether entering this mode requires a validated trust bundle.
    pub fn requires_trust_bundle(&self) -> bool {
        matches!(self, Mode::Sovereign | Mode::Offline)
    }

    /// Whether the isolation gateway should be running in this mode.
    pub fn gateway_enabled(&self) -> bool {
        matches!(self, Mode::Sovereign)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Mode::Online),
            "sovereign" => Ok(Mode::Sovereign),
            "offline" => Ok(Mode::Offline),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!("airplane".parse::<Mode>().is_err());
    }

    #[test]
    fn gateway_runs_only_in_sovereign() {
        assert!(!Mode::Online.gateway_enabled());
        assert!(Mode::Sovereign.gateway_enabled());
        assert!(!Mode::Offline.gateway_enabled());
    }

    #[test]
    fn bundle_required_off_network() {
        assert!(!Mode::Online.requires_trust_bundle());
        assert!(Mode::Sovereign.requires_trust_bundle());
        assert!(Mode::Offline.requires_trust_bundle());
    }
}
