//! Per-channel cooldown between public listings.

use crate::Admission;
use crate::window::{ceil_seconds, window_length};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Minimum spacing between two public listings in the same channel.
///
/// Checking does not start the cooldown; call [`record`](Self::record) once the
/// listing was actually posted, so a failed post can be retried at once.
#[derive(Debug)]
pub struct ChannelCooldown {
    cooldown_seconds: u64,
    last_posted: Mutex<HashMap<u64, DateTime<Utc>>>,
}

impl ChannelCooldown {
    /// Create a cooldown of `cooldown_seconds` per channel.
    pub fn new(cooldown_seconds: u64) -> Self {
        Self {
            cooldown_seconds,
            last_posted: Mutex::new(HashMap::new()),
        }
    }

    /// Cooldown length in seconds.
    pub fn cooldown_seconds(&self) -> u64 {
        self.cooldown_seconds
    }

    /// Whether `channel` may post a listing at `now`.
    pub async fn check(&self, channel: u64, now: DateTime<Utc>) -> Admission {
        let cooldown = window_length(self.cooldown_seconds);
        let last_posted = self.last_posted.lock().await;
        let Some(last) = last_posted.get(&channel) else {
            return Admission::Allowed;
        };
        let elapsed = now - *last;
        if elapsed >= cooldown {
            return Admission::Allowed;
        }
        let wait_seconds = cooldown
            .checked_sub(&elapsed)
            .map(ceil_seconds)
            .unwrap_or(self.cooldown_seconds);
        debug!(channel, wait_seconds, "Listing cooldown active");
        Admission::Denied { wait_seconds }
    }

    /// Start the cooldown for `channel` at `now`.
    pub async fn record(&self, channel: u64, now: DateTime<Utc>) {
        self.last_posted.lock().await.insert(channel, now);
    }
}
