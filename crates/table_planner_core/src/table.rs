//! Table records and the signup/waitlist state machine.

use crate::{
    ArchiveInfo, ArchiveReason, ChannelId, GuildId, MessageId, SeatEntry, SeatKind, TableFields,
    TableId, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use table_planner_error::{PlannerResult, TableError, TableErrorKind};
use tracing::{debug, instrument};

/// Where a table's signup card lives.
///
/// Channel and message are filled in after the card is first posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Location {
    guild_id: GuildId,
    channel_id: Option<ChannelId>,
    message_id: Option<MessageId>,
}

impl Location {
    /// A location in `guild_id` whose card has not been posted yet.
    pub fn unposted(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            channel_id: None,
            message_id: None,
        }
    }
}

/// How a user relates to a table, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Involvement {
    /// The user created the table
    Owner,
    /// The user holds a roster seat
    Player,
    /// The user is on the waitlist
    Waiting,
}

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A roster seat was free
    Seated,
    /// The roster was full; `position` is 1-based
    Waitlisted {
        /// Position in the waitlist after insertion
        position: usize,
    },
}

/// Result of a successful leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// The list the user was removed from
    pub left: SeatKind,
    /// The waitlist entry moved into the freed seat, if any
    pub promoted: Option<SeatEntry>,
}

/// Result of an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutcome {
    /// Roster entries moved to the waitlist, most recently joined first
    pub demoted: Vec<SeatEntry>,
}

/// One scheduled group activity signup.
///
/// Invariants upheld by every method:
/// - a user appears at most once across roster and waitlist;
/// - `roster.len() <= capacity`;
/// - the waitlist is sorted by `joined_at`, ties kept in insertion order;
/// - `archive` is set iff the record has been archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TableRecord {
    id: TableId,
    system: String,
    schedule: String,
    description: String,
    capacity: u32,
    roster: Vec<SeatEntry>,
    waitlist: Vec<SeatEntry>,
    creator_id: UserId,
    location: Location,
    created_at: DateTime<Utc>,
    #[getter(rename = "archive_info")]
    archive: Option<ArchiveInfo>,
}

impl TableRecord {
    /// Create a fresh, empty, active table.
    #[instrument(skip(table_fields), fields(creator = %creator_id, guild = %guild_id))]
    pub fn create(
        table_fields: TableFields,
        creator_id: UserId,
        guild_id: GuildId,
        now: DateTime<Utc>,
    ) -> Self {
        let (system, schedule, description, capacity) = table_fields.into_parts();
        let id = TableId::generate();
        debug!(table = %id, capacity, "Creating table record");
        Self {
            id,
            system,
            schedule,
            description,
            capacity,
            roster: Vec::new(),
            waitlist: Vec::new(),
            creator_id,
            location: Location::unposted(guild_id),
            created_at: now,
            archive: None,
        }
    }

    /// Whether the record carries an archive stamp.
    pub fn is_archived(&self) -> bool {
        self.archive.is_some()
    }

    /// Which list holds `user`, if any.
    pub fn slot_of(&self, user: UserId) -> Option<SeatKind> {
        if self.roster.iter().any(|entry| *entry.user_id() == user) {
            Some(SeatKind::Roster)
        } else if self.waitlist.iter().any(|entry| *entry.user_id() == user) {
            Some(SeatKind::Waitlist)
        } else {
            None
        }
    }

    /// How `user` relates to this table.
    pub fn involvement(&self, user: UserId) -> Option<Involvement> {
        if self.creator_id == user {
            return Some(Involvement::Owner);
        }
        self.slot_of(user).map(|slot| match slot {
            SeatKind::Roster => Involvement::Player,
            SeatKind::Waitlist => Involvement::Waiting,
        })
    }

    /// Whether every roster seat is taken.
    pub fn is_full(&self) -> bool {
        self.roster.len() >= self.capacity as usize
    }

    /// Seat `user`, or queue them when the roster is full.
    ///
    /// # Errors
    ///
    /// `AlreadyInTable` if the user holds either kind of slot, `NotFound` on
    /// an archived record.
    #[instrument(skip(self, display_name), fields(table = %self.id, user = %user))]
    pub fn join(
        &mut self,
        user: UserId,
        display_name: Option<String>,
        now: DateTime<Utc>,
    ) -> PlannerResult<JoinOutcome> {
        self.ensure_active()?;
        if let Some(slot) = self.slot_of(user) {
            return Err(TableError::new(TableErrorKind::AlreadyInTable {
                user: user.0,
                waitlisted: slot == SeatKind::Waitlist,
            })
            .into());
        }

        let entry = SeatEntry::new(user, now, display_name);
        if !self.is_full() {
            self.roster.push(entry);
            debug!(seated = self.roster.len(), "User seated");
            return Ok(JoinOutcome::Seated);
        }

        self.waitlist.push(entry);
        self.sort_waitlist();
        let position = self
            .waitlist
            .iter()
            .position(|entry| *entry.user_id() == user)
            .map_or(self.waitlist.len(), |index| index + 1);
        debug!(position, "Roster full, user waitlisted");
        Ok(JoinOutcome::Waitlisted { position })
    }

    /// Remove `user` from whichever list holds them.
    ///
    /// Leaving the roster promotes the earliest-joined waitlist entry into
    /// the freed seat. Leaving the waitlist never promotes.
    ///
    /// # Errors
    ///
    /// `NotInTable` if the user holds no slot, `NotFound` on an archived
    /// record.
    #[instrument(skip(self), fields(table = %self.id, user = %user))]
    pub fn leave(&mut self, user: UserId) -> PlannerResult<LeaveOutcome> {
        self.ensure_active()?;
        if let Some(index) = self.roster.iter().position(|e| *e.user_id() == user) {
            self.roster.remove(index);
            let promoted = if self.waitlist.is_empty() || self.is_full() {
                None
            } else {
                let entry = self.waitlist.remove(0);
                self.roster.push(entry.clone());
                Some(entry)
            };
            debug!(promoted = ?promoted.as_ref().map(|e| *e.user_id()), "User left roster");
            return Ok(LeaveOutcome {
                left: SeatKind::Roster,
                promoted,
            });
        }

        if let Some(index) = self.waitlist.iter().position(|e| *e.user_id() == user) {
            self.waitlist.remove(index);
            debug!("User left waitlist");
            return Ok(LeaveOutcome {
                left: SeatKind::Waitlist,
                promoted: None,
            });
        }

        Err(TableError::new(TableErrorKind::NotInTable { user: user.0 }).into())
    }

    /// Replace the editable fields.
    ///
    /// Shrinking capacity below the roster size demotes the most recently
    /// joined players to the waitlist. Growing it never promotes anyone;
    /// seats only open up through [`leave`](Self::leave).
    ///
    /// # Errors
    ///
    /// `NotFound` on an archived record.
    #[instrument(skip(self, table_fields), fields(table = %self.id, capacity = table_fields.capacity()))]
    pub fn edit(&mut self, table_fields: TableFields) -> PlannerResult<EditOutcome> {
        self.ensure_active()?;
        let (system, schedule, description, capacity) = table_fields.into_parts();
        self.system = system;
        self.schedule = schedule;
        self.description = description;
        self.capacity = capacity;
        let demoted = self.enforce_capacity();
        Ok(EditOutcome { demoted })
    }

    /// Move roster overflow to the waitlist, popping from the roster's end
    /// (the most recently seated entries).
    ///
    /// Returns the moved entries in the order they were removed.
    pub fn enforce_capacity(&mut self) -> Vec<SeatEntry> {
        let capacity = self.capacity as usize;
        if self.roster.len() <= capacity {
            return Vec::new();
        }

        let mut demoted = Vec::with_capacity(self.roster.len() - capacity);
        while self.roster.len() > capacity {
            if let Some(entry) = self.roster.pop() {
                demoted.push(entry);
            }
        }
        self.waitlist.extend(demoted.iter().cloned());
        self.sort_waitlist();
        debug!(demoted = demoted.len(), "Moved roster overflow to waitlist");
        demoted
    }

    /// Check that `actor` may manage this table: the creator always may,
    /// anyone else needs `can_moderate`.
    ///
    /// # Errors
    ///
    /// `Forbidden` naming `action` when the actor lacks authority.
    #[track_caller]
    pub fn authorize(&self, actor: UserId, can_moderate: bool, action: &str) -> PlannerResult<()> {
        if actor == self.creator_id || can_moderate {
            return Ok(());
        }
        Err(TableError::new(TableErrorKind::Forbidden {
            user: actor.0,
            action: action.to_string(),
        })
        .into())
    }

    /// Archive on behalf of `actor`.
    ///
    /// The creator archives with reason `Owner`; anyone else needs
    /// `can_moderate`, resolved by the caller for the table's channel, and
    /// archives with reason `Moderator`.
    ///
    /// # Errors
    ///
    /// `Forbidden` when the actor lacks authority, `NotFound` if the record
    /// is already archived.
    #[instrument(skip(self), fields(table = %self.id, actor = %actor))]
    pub fn archive(
        &mut self,
        actor: UserId,
        can_moderate: bool,
        now: DateTime<Utc>,
    ) -> PlannerResult<ArchiveReason> {
        self.ensure_active()?;
        self.authorize(actor, can_moderate, "archive")?;
        let reason = if actor == self.creator_id {
            ArchiveReason::Owner
        } else {
            ArchiveReason::Moderator
        };
        self.archive = Some(ArchiveInfo::new(reason, now, Some(actor)));
        Ok(reason)
    }

    /// Archive without an acting user, e.g. after the bot lost access.
    ///
    /// # Errors
    ///
    /// `NotFound` if the record is already archived.
    pub fn archive_for(&mut self, reason: ArchiveReason, now: DateTime<Utc>) -> PlannerResult<()> {
        self.ensure_active()?;
        self.archive = Some(ArchiveInfo::new(reason, now, None));
        Ok(())
    }

    /// Drop the archive stamp. Only the store uses this, to keep stamps out
    /// of the active partition.
    pub fn clear_archive(&mut self) -> Option<ArchiveInfo> {
        self.archive.take()
    }

    /// Remember where the signup card was posted.
    ///
    /// # Errors
    ///
    /// `NotFound` on an archived record.
    pub fn record_posting(&mut self, channel: ChannelId, message: MessageId) -> PlannerResult<()> {
        self.ensure_active()?;
        self.location.channel_id = Some(channel);
        self.location.message_id = Some(message);
        Ok(())
    }

    /// "taken/capacity", with "(+waiting)" appended when anyone is queued.
    pub fn seat_summary(&self) -> String {
        let seats = format!("{}/{}", self.roster.len(), self.capacity);
        if self.waitlist.is_empty() {
            seats
        } else {
            format!("{} (+{})", seats, self.waitlist.len())
        }
    }

    #[track_caller]
    fn ensure_active(&self) -> PlannerResult<()> {
        if self.is_archived() {
            return Err(TableError::new(TableErrorKind::NotFound(self.id.to_string())).into());
        }
        Ok(())
    }

    fn sort_waitlist(&mut self) {
        // Stable: equal timestamps keep insertion order.
        self.waitlist.sort_by_key(|entry| *entry.joined_at());
    }
}
