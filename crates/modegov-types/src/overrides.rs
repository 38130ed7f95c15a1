//! Time-boxed, single-use justified exceptions

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A justified exception that allows one blocked transition to proceed.
///
/// Expiry is evaluated lazily at validation time; there is no background
/// sweeper. Once `consumed` is set the override can never again satisfy
/// validation, even before `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Override {
    pub id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl Override {
    /// Create an active override expiring `duration_seconds` from now.
    ///
    /// Bounds on the reason and duration are enforced by the governor,
    /// not here.
    pub fn new(reason: impl Into<String>, duration_seconds: u64) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reason: reason.into(),
            created_at,
            duration_seconds,
            expires_at: created_at + Duration::seconds(duration_seconds as i64),
            consumed: false,
            consumed_at: None,
        }
    }

    /// True when the expiry instant has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
