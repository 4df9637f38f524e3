//! Per-user and per-server command admission.

use crate::{Admission, RateLimitSettings, SlidingWindowLimiter, WindowLimit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use table_planner_error::{PlannerResult, RateLimitedError};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Whose window an admission check counts against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RateLimitScope {
    /// Keyed by the invoking user
    User,
    /// Keyed by the server the command ran in
    Guild,
}

/// Shared admission gate for every externally triggered command.
///
/// Each scope owns an independent [`SlidingWindowLimiter`]. The windows sit
/// behind one async mutex, so concurrent workers see a consistent history.
#[derive(Debug)]
pub struct CommandRateLimiter {
    settings: RateLimitSettings,
    windows: Mutex<HashMap<RateLimitScope, SlidingWindowLimiter>>,
}

impl CommandRateLimiter {
    /// Create a limiter enforcing `settings`.
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Limits in force.
    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    /// Window applied to `scope`.
    pub fn limit_for(&self, scope: RateLimitScope) -> WindowLimit {
        match scope {
            RateLimitScope::User => self.settings.user,
            RateLimitScope::Guild => self.settings.guild,
        }
    }

    /// Check and record one event for `key` in `scope`.
    #[instrument(skip(self))]
    pub async fn admit(&self, scope: RateLimitScope, key: u64, now: DateTime<Utc>) -> Admission {
        let limit = self.limit_for(scope);
        let mut windows = self.windows.lock().await;
        let admission = windows
            .entry(scope)
            .or_default()
            .check_and_record(key, now, limit);
        debug!(?admission, "Admission checked");
        admission
    }

    /// Like [`admit`](Self::admit), but a denial is an error.
    ///
    /// # Errors
    ///
    /// [`RateLimitedError`] carrying the wait hint when the window is full.
    pub async fn check(
        &self,
        scope: RateLimitScope,
        key: u64,
        now: DateTime<Utc>,
    ) -> PlannerResult<()> {
        match self.admit(scope, key, now).await {
            Admission::Allowed => Ok(()),
            Admission::Denied { wait_seconds } => {
                info!(%scope, key, wait_seconds, "Command throttled");
                Err(RateLimitedError::new(scope.to_string(), key, wait_seconds).into())
            }
        }
    }

    /// Gate one command: the user's window first, then the server's.
    ///
    /// Commands outside a server (direct messages) only count against the user.
    ///
    /// # Errors
    ///
    /// [`RateLimitedError`] for whichever window is exhausted first.
    pub async fn check_command(
        &self,
        user: u64,
        guild: Option<u64>,
        now: DateTime<Utc>,
    ) -> PlannerResult<()> {
        self.check(RateLimitScope::User, user, now).await?;
        if let Some(guild) = guild {
            self.check(RateLimitScope::Guild, guild, now).await?;
        }
        Ok(())
    }
}

impl Default for CommandRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitSettings::default())
    }
}
