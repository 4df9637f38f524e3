//! Record store trait definition.

use crate::{Partition, Partitions};
use chrono::{DateTime, Utc};
use table_planner_core::{ArchiveReason, TableId, TableRecord};
use table_planner_error::PlannerResult;

/// Trait for pluggable table record backends.
///
/// Implementations own all authoritative table state. Reads never fail:
/// unreadable data degrades to empty partitions. Writes are all-or-nothing.
pub trait RecordStore: Send + Sync + 'static {
    /// Load both partitions under shared access.
    fn load_all(&self) -> Partitions;

    /// Replace both partitions.
    ///
    /// Archive stamps are stripped from every record written to the active
    /// side.
    ///
    /// # Errors
    ///
    /// Returns a storage error if either partition cannot be written; the
    /// previous contents of a partition stay intact when its write fails.
    fn save_all(&self, partitions: Partitions) -> PlannerResult<()>;

    /// Run one atomic load → mutate → save cycle.
    ///
    /// Exclusive access is held for the whole cycle. When `mutate` returns an
    /// error nothing is written and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a storage error if the partitions
    /// cannot be locked, read or written.
    fn transaction<R, F>(&self, mutate: F) -> PlannerResult<R>
    where
        F: FnOnce(&mut Partitions) -> PlannerResult<R>;

    /// Snapshot of the active partition.
    fn load_active(&self) -> Partition {
        self.load_all().active
    }

    /// Snapshot of the archived partition.
    fn load_archived(&self) -> Partition {
        self.load_all().archived
    }

    /// Archive the listed tables with `reason`; unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transaction cannot be committed.
    fn archive_tables(
        &self,
        ids: &[TableId],
        reason: ArchiveReason,
        now: DateTime<Utc>,
    ) -> PlannerResult<usize> {
        self.transaction(|partitions| Ok(partitions.archive_many(ids, reason, now)))
    }

    /// Archive every active table matching `predicate` with `reason`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transaction cannot be committed.
    fn archive_where<P>(
        &self,
        predicate: P,
        reason: ArchiveReason,
        now: DateTime<Utc>,
    ) -> PlannerResult<usize>
    where
        P: Fn(&TableRecord) -> bool,
    {
        self.transaction(|partitions| {
            let ids: Vec<TableId> = partitions
                .active
                .iter()
                .filter(|(_, record)| predicate(record))
                .map(|(id, _)| *id)
                .collect();
            Ok(partitions.archive_many(&ids, reason, now))
        })
    }
}
