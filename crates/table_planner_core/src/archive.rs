//! Archive metadata.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a table left the active partition.
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ArchiveReason {
    /// Archived by a channel moderator who is not the owner
    Moderator,
    /// Archived by the table's creator
    Owner,
    /// The bot lost access to the table's channel
    NoAccess,
    /// The bot was removed from the server, or the channel was deleted
    RemovedFromServer,
}

/// Stamp present on every archived record, and only on archived records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ArchiveInfo {
    reason: ArchiveReason,
    archived_at: DateTime<Utc>,
    /// `None` when the system archived the table on its own.
    archived_by: Option<UserId>,
}

impl ArchiveInfo {
    /// Create an archive stamp.
    pub fn new(reason: ArchiveReason, archived_at: DateTime<Utc>, archived_by: Option<UserId>) -> Self {
        Self {
            reason,
            archived_at,
            archived_by,
        }
    }
}
