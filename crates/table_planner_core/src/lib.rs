//! Core data types for the table planner.
//!
//! A [`TableRecord`] is one scheduled group activity signup: a bounded roster
//! of seated players plus a FIFO waitlist. The signup state machine lives on
//! the record itself; the methods never touch storage, so callers decide how
//! the load/mutate/save cycle is serialized.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod fields;
mod ids;
mod seat;
mod table;

pub use archive::{ArchiveInfo, ArchiveReason};
pub use fields::{
    MAX_CAPACITY, MAX_DESCRIPTION_LEN, MAX_SCHEDULE_LEN, MAX_SYSTEM_LEN, MIN_CAPACITY, TableFields,
};
pub use ids::{ChannelId, GuildId, MessageId, TableId, UserId};
pub use seat::{SeatEntry, SeatKind};
pub use table::{EditOutcome, Involvement, JoinOutcome, LeaveOutcome, Location, TableRecord};
