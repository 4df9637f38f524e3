//! Limits applied per scope.

use serde::{Deserialize, Serialize};

/// Built-in per-user window: 3 commands per 10 seconds.
pub const DEFAULT_USER_LIMIT: WindowLimit = WindowLimit::new(3, 10);
/// Built-in per-server window: 12 commands per 10 seconds.
pub const DEFAULT_GUILD_LIMIT: WindowLimit = WindowLimit::new(12, 10);
/// Built-in per-channel cooldown between public listings.
pub const DEFAULT_LIST_COOLDOWN_SECONDS: u64 = 60;

/// Maximum admitted events within a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimit {
    /// Events admitted per window
    pub max_count: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl WindowLimit {
    /// Create a limit of `max_count` events per `window_seconds`.
    pub const fn new(max_count: u32, window_seconds: u64) -> Self {
        Self {
            max_count,
            window_seconds,
        }
    }
}

/// Every limit the command layer enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Window applied to each user
    pub user: WindowLimit,
    /// Window applied to each server
    pub guild: WindowLimit,
    /// Seconds between two public listings in one channel
    pub list_cooldown_seconds: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER_LIMIT,
            guild: DEFAULT_GUILD_LIMIT,
            list_cooldown_seconds: DEFAULT_LIST_COOLDOWN_SECONDS,
        }
    }
}
