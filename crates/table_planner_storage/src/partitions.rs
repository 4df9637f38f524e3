//! In-memory view of both partitions.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use table_planner_core::{ArchiveReason, TableId, TableRecord};
use table_planner_error::{PlannerResult, TableError, TableErrorKind};
use tracing::warn;

/// One partition: table id → record.
pub type Partition = BTreeMap<TableId, TableRecord>;

/// Both partitions as loaded inside one read or transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    /// Tables still open for signups
    pub active: Partition,
    /// Archived tables, kept forever
    pub archived: Partition,
}

impl Partitions {
    /// Bundle two loaded partitions.
    ///
    /// A table found in both is treated as archived, since archived tables
    /// are never reactivated.
    pub fn new(mut active: Partition, archived: Partition) -> Self {
        active.retain(|id, _| {
            let duplicated = archived.contains_key(id);
            if duplicated {
                warn!(table = %id, "Table present in both partitions; keeping the archived copy");
            }
            !duplicated
        });
        Self { active, archived }
    }

    /// Mutable access to an active record.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is not in the active partition.
    #[track_caller]
    pub fn active_mut(&mut self, id: &TableId) -> PlannerResult<&mut TableRecord> {
        self.active
            .get_mut(id)
            .ok_or_else(|| TableError::new(TableErrorKind::NotFound(id.to_string())).into())
    }

    /// Move an already stamped record from active to archived.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is not in the active partition.
    #[track_caller]
    pub fn move_to_archive(&mut self, id: &TableId) -> PlannerResult<&TableRecord> {
        let record = self
            .active
            .remove(id)
            .ok_or_else(|| TableError::new(TableErrorKind::NotFound(id.to_string())))?;
        Ok(self.archived.entry(*id).or_insert(record))
    }

    /// Stamp and archive each listed table; unknown ids are skipped.
    ///
    /// Returns how many tables moved.
    pub fn archive_many<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a TableId>,
        reason: ArchiveReason,
        now: DateTime<Utc>,
    ) -> usize {
        let mut moved = 0;
        for id in ids {
            let Some(mut record) = self.active.remove(id) else {
                continue;
            };
            if record.archive_for(reason, now).is_err() {
                // A stamped record leaked into the active side; restamp it.
                record.clear_archive();
                let _ = record.archive_for(reason, now);
            }
            self.archived.insert(*id, record);
            moved += 1;
        }
        moved
    }

    /// Strip archive stamps from the active side before it is written.
    pub fn normalize(&mut self) {
        for (id, record) in self.active.iter_mut() {
            if let Some(info) = record.clear_archive() {
                warn!(table = %id, reason = %info.reason(), "Cleared archive stamp on active table");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_planner_core::{GuildId, TableFields, UserId};

    fn record() -> TableRecord {
        let fields = TableFields::new("Pathfinder", "Monday", "Society scenario", 5).unwrap();
        TableRecord::create(fields, UserId(1), GuildId(1), Utc::now())
    }

    #[test]
    fn test_archive_many_skips_unknown_ids() {
        let first = record();
        let second = record();
        let (a, b) = (*first.id(), *second.id());
        let mut partitions = Partitions::default();
        partitions.active.insert(a, first);
        partitions.active.insert(b, second);

        let missing = *record().id();
        let moved = partitions.archive_many(
            [&a, &missing],
            ArchiveReason::RemovedFromServer,
            Utc::now(),
        );

        assert_eq!(moved, 1);
        assert!(partitions.active.contains_key(&b));
        let archived = &partitions.archived[&a];
        assert_eq!(
            archived.archive_info().as_ref().map(|i| *i.reason()),
            Some(ArchiveReason::RemovedFromServer)
        );
    }

    #[test]
    fn test_normalize_clears_active_stamps() {
        let mut stamped = record();
        stamped.archive_for(ArchiveReason::NoAccess, Utc::now()).unwrap();
        let id = *stamped.id();
        let mut partitions = Partitions::default();
        partitions.active.insert(id, stamped);

        partitions.normalize();

        assert!(!partitions.active[&id].is_archived());
    }

    #[test]
    fn test_new_drops_active_copy_of_archived_table() {
        let stamped = {
            let mut r = record();
            r.archive_for(ArchiveReason::Owner, Utc::now()).unwrap();
            r
        };
        let id = *stamped.id();
        let mut active = Partition::new();
        active.insert(id, record());
        let mut archived = Partition::new();
        archived.insert(id, stamped);

        let partitions = Partitions::new(active, archived);
        assert!(partitions.active.is_empty());
        assert_eq!(partitions.archived.len(), 1);
    }

    #[test]
    fn test_active_mut_missing_is_not_found() {
        let mut partitions = Partitions::default();
        assert!(partitions.active_mut(record().id()).is_err());
    }
}
