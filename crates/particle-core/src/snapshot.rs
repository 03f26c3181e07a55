//! Policy for the optional periodic snapshot upload.
//!
//! The upload itself lives in the frontend; this module decides whether and
//! when a capture happens and what the posted body looks like. Nothing here
//! feeds back into the animation.

use crate::constants::SNAPSHOT_MIN_INTERVAL_SECS;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Endpoint receiving the JSON body.
    pub url: String,
    #[serde(default = "SnapshotConfig::default_interval_secs")]
    pub interval_secs: f32,
    /// Public address of the operator's own network; captures are skipped there.
    #[serde(default)]
    pub trusted_ip: Option<String>,
}

impl SnapshotConfig {
    fn default_interval_secs() -> f32 {
        60.0
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f32(self.interval_secs.max(0.0))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.url",
                reason: format!("`{}` is not an http(s) URL", self.url),
            });
        }
        let interval = self.interval_secs;
        if !(interval.is_finite() && interval >= SNAPSHOT_MIN_INTERVAL_SECS) {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.interval_secs",
                reason: format!("must be at least {SNAPSHOT_MIN_INTERVAL_SECS} s"),
            });
        }
        Ok(())
    }
}

/// Decide whether captures run, given the detected public address.
///
/// Matching the trusted address disables capture. An unknown address (lookup
/// failed) or no configured trusted address leaves it enabled.
pub fn capture_allowed(trusted_ip: Option<&str>, detected_ip: Option<&str>) -> bool {
    match (trusted_ip, detected_ip) {
        (Some(trusted), Some(detected)) => trusted.trim() != detected.trim(),
        _ => true,
    }
}

#[derive(Deserialize)]
struct PublicIpBody {
    ip: String,
}

/// Extract the address from an `{"ip": "..."}` lookup response.
pub fn parse_public_ip(body: &str) -> Option<String> {
    serde_json::from_str::<PublicIpBody>(body)
        .ok()
        .map(|b| b.ip)
        .filter(|ip| !ip.trim().is_empty())
}

/// Fixed-interval timer driven by the caller's clock; fires first after one interval.
#[derive(Clone, Debug)]
pub struct SnapshotTimer {
    interval: Duration,
    next_due: Duration,
}

impl SnapshotTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: interval,
        }
    }

    /// True once per elapsed interval; a stalled caller gets one catch-up tick, not a burst.
    pub fn due(&mut self, elapsed: Duration) -> bool {
        if self.interval.is_zero() || elapsed < self.next_due {
            return false;
        }
        let interval = self.interval.as_nanos();
        let missed = (elapsed - self.next_due).as_nanos() / interval + 1;
        let next = self.next_due.as_nanos() + missed * interval;
        self.next_due = Duration::from_nanos(u64::try_from(next).unwrap_or(u64::MAX));
        true
    }
}

/// Body posted to the snapshot endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// `data:image/png;base64,...`
    pub image: String,
    /// RFC 3339 capture time.
    pub timestamp: String,
}

impl SnapshotPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
