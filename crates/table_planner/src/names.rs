//! Best-effort display name resolution.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use table_planner_core::{GuildId, UserId};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Upper bound on one live lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Live identity lookups supplied by the messaging platform.
///
/// Lookups are advisory: a `None` just means the caller falls back to a
/// cached label.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Current display name of `user` as seen in `guild`.
    async fn display_name(&self, guild: GuildId, user: UserId) -> Option<String>;
}

/// Process-scoped cache of resolved display names.
///
/// Only successful lookups are cached; fallbacks are recomputed so a later
/// lookup can still succeed.
#[derive(Debug)]
pub struct DisplayNameCache {
    names: RwLock<HashMap<(GuildId, UserId), String>>,
    timeout: Duration,
}

impl DisplayNameCache {
    /// Create an empty cache whose lookups give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            names: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Previously resolved name, if any.
    pub async fn cached(&self, guild: GuildId, user: UserId) -> Option<String> {
        self.names.read().await.get(&(guild, user)).cloned()
    }

    /// Number of cached names.
    pub async fn len(&self) -> usize {
        self.names.read().await.len()
    }

    /// Whether nothing has been resolved yet.
    pub async fn is_empty(&self) -> bool {
        self.names.read().await.is_empty()
    }

    /// Resolve `user`'s label, never failing.
    ///
    /// Order: cache, live lookup bounded by the timeout, then `fallback`.
    #[instrument(skip(self, resolver, fallback))]
    pub async fn resolve(
        &self,
        resolver: &dyn NameResolver,
        guild: GuildId,
        user: UserId,
        fallback: &str,
    ) -> String {
        if let Some(name) = self.cached(guild, user).await {
            return name;
        }

        match tokio::time::timeout(self.timeout, resolver.display_name(guild, user)).await {
            Ok(Some(name)) => {
                debug!(name = %name, "Resolved display name");
                self.names.write().await.insert((guild, user), name.clone());
                name
            }
            Ok(None) => {
                debug!("Display name unavailable; using fallback");
                fallback.to_string()
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Display name lookup timed out");
                fallback.to_string()
            }
        }
    }
}

impl Default for DisplayNameCache {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TIMEOUT)
    }
}
