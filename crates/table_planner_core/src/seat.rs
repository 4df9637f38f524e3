//! Roster and waitlist entries.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A participant occupying a roster seat or a waitlist slot.
///
/// `joined_at` is the only ordering key: waitlist position, promotion order
/// and demotion order all follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SeatEntry {
    user_id: UserId,
    joined_at: DateTime<Utc>,
    /// Best-effort label used when live identity lookups fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

impl SeatEntry {
    /// Create an entry joined at `joined_at`.
    pub fn new(user_id: UserId, joined_at: DateTime<Utc>, display_name: Option<String>) -> Self {
        Self {
            user_id,
            joined_at,
            display_name,
        }
    }

    /// Cached label, falling back to the numeric id.
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.user_id.to_string())
    }
}

/// Which list a seat entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SeatKind {
    /// Accepted participant
    Roster,
    /// Queued behind a full roster
    Waitlist,
}
