//! Raw snapshots and the timestamped envelope they travel in.
//!
//! The same JSON encoding is used on the wire and in the cache:
//!
//! ```json
//! { "time": "2020-10-16T12:00:00Z", "version": 1,
//!   "snapshot": { "lastDeaths": [..], "lastConfirmed": [..] } }
//! ```

use crate::error::StatError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Version tag written into every envelope.
pub const FORMAT_VERSION: u32 = 1;

/// Most recent cumulative counts for one location, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(rename = "lastDeaths")]
    pub cumulative_deaths: Vec<i64>,
    #[serde(rename = "lastConfirmed")]
    pub cumulative_confirmed: Vec<i64>,
}

impl RawSnapshot {
    /// Number of samples available in both series.
    pub fn sample_count(&self) -> usize {
        self.cumulative_deaths
            .len()
            .min(self.cumulative_confirmed.len())
    }
}

/// A snapshot plus the time it was fetched and its format version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    #[serde(rename = "time")]
    pub fetched_at: DateTime<Utc>,
    #[serde(rename = "version")]
    pub format_version: u32,
    pub snapshot: RawSnapshot,
}

impl SnapshotEnvelope {
    pub fn new(fetched_at: DateTime<Utc>, snapshot: RawSnapshot) -> Self {
        Self {
            fetched_at,
            format_version: FORMAT_VERSION,
            snapshot,
        }
    }

    /// Decode an envelope, rejecting unknown format versions.
    pub fn decode(bytes: &[u8]) -> Result<Self, StatError> {
        let envelope: Self =
            serde_json::from_slice(bytes).map_err(|e| StatError::Decode(e.to_string()))?;
        if envelope.format_version != FORMAT_VERSION {
            return Err(StatError::Decode(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                envelope.format_version
            )));
        }
        Ok(envelope)
    }

    pub fn encode(&self) -> Result<Vec<u8>, StatError> {
        serde_json::to_vec(self).map_err(|e| StatError::CacheWrite(format!("encode: {e}")))
    }

    /// Whether the envelope is still within `window` of `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        within_window(self.fetched_at, now, window)
    }
}

/// Whether `stamp + window` is still after `now`.
///
/// When the expiry overflows chrono's range, a past stamp with a positive
/// window is fresh. A stamp from beyond `now` is treated as expired, so a
/// slot with an out-of-range timestamp is refetched rather than trusted.
pub fn within_window(stamp: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    match stamp.checked_add_signed(window) {
        Some(expiry) => expiry > now,
        None => window > Duration::zero() && stamp <= now,
    }
}
