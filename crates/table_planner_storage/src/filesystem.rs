//! JSON file backend.

use crate::atomic::write_atomic;
use crate::codec::{decode, encode};
use crate::lock::{LockMode, PartitionLock};
use crate::{Partition, Partitions, RecordStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use table_planner_error::{PlannerResult, StorageError, StorageErrorKind};
use tracing::{debug, error, instrument, warn};

/// File name of the active partition inside the data directory.
pub const ACTIVE_FILE_NAME: &str = "tables_active.json";
/// File name of the archived partition inside the data directory.
pub const ARCHIVED_FILE_NAME: &str = "tables_archived.json";

/// Filesystem record store.
///
/// Layout of the data directory:
///
/// ```text
/// data/
/// ├── tables_active.json          id → record, archive stamps always null
/// ├── tables_active.json.lock
/// ├── tables_archived.json        id → record, archive stamps populated
/// └── tables_archived.json.lock
/// ```
///
/// Locks are always taken active first, archived second.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    active_path: PathBuf,
    archived_path: PathBuf,
}

impl FileRecordStore {
    /// Create a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(data_dir))]
    pub fn new(data_dir: impl Into<PathBuf>) -> PlannerResult<Self> {
        let data_dir = data_dir.into();

        std::fs::create_dir_all(&data_dir).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                data_dir.display(),
                e
            )))
        })?;

        tracing::info!(path = %data_dir.display(), "Opened table record store");
        Ok(Self {
            active_path: data_dir.join(ACTIVE_FILE_NAME),
            archived_path: data_dir.join(ARCHIVED_FILE_NAME),
        })
    }

    /// Path of the active partition file.
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Path of the archived partition file.
    pub fn archived_path(&self) -> &Path {
        &self.archived_path
    }

    /// Read one partition under a shared lock, degrading to empty on failure.
    fn read_shared(path: &Path) -> Partition {
        if !path.exists() {
            return Partition::new();
        }
        let _lock = match PartitionLock::acquire(path, LockMode::Shared) {
            Ok(lock) => lock,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not lock partition; using empty data");
                return Partition::new();
            }
        };
        match read_raw(path) {
            Ok(on_disk) => decode_raw(path, &on_disk),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read partition; using empty data");
                Partition::new()
            }
        }
    }

    /// Write the partitions that differ from `before`, archived first.
    ///
    /// With no `before` both partitions are written. When the active write
    /// fails after the archived one went through, the archived file is put
    /// back to `archived_on_disk` so an error leaves both files as they were.
    fn commit(
        &self,
        before: Option<&Partitions>,
        mut after: Partitions,
        archived_on_disk: &OnDisk,
    ) -> PlannerResult<()> {
        after.normalize();
        let archived = before
            .is_none_or(|b| b.archived != after.archived)
            .then(|| encode(&after.archived))
            .transpose()?;
        let active = before
            .is_none_or(|b| b.active != after.active)
            .then(|| encode(&after.active))
            .transpose()?;

        if archived.is_none() && active.is_none() {
            debug!("No partition changed");
            return Ok(());
        }

        // Archived first: once it lands, a failed active write is undone
        // below, and a crash in between duplicates a table rather than
        // losing it.
        if let Some(bytes) = &archived {
            write_atomic(&self.archived_path, bytes).inspect_err(|e| {
                error!(path = %self.archived_path.display(), error = %e, "Failed to write archived partition");
            })?;
        }
        if let Some(bytes) = &active {
            if let Err(e) = write_atomic(&self.active_path, bytes) {
                error!(path = %self.active_path.display(), error = %e, "Failed to write active partition");
                if archived.is_some() {
                    self.restore_archived(archived_on_disk);
                }
                return Err(e);
            }
        }

        debug!(
            active = after.active.len(),
            archived = after.archived.len(),
            active_written = active.is_some(),
            archived_written = archived.is_some(),
            "Saved partitions"
        );
        Ok(())
    }

    fn restore_archived(&self, on_disk: &OnDisk) {
        let path = &self.archived_path;
        let restored: PlannerResult<()> = match on_disk {
            Some(bytes) => write_atomic(path, bytes),
            None => match std::fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                    "remove {}: {}",
                    path.display(),
                    e
                )))
                .into()),
            },
        };
        match restored {
            Ok(()) => warn!(path = %path.display(), "Restored archived partition after failed active write"),
            Err(e) => error!(
                path = %path.display(),
                error = %e,
                "Could not restore archived partition; its copy wins on next load"
            ),
        }
    }
}

/// Bytes of a partition file as read under its lock; `None` if it is absent.
type OnDisk = Option<Vec<u8>>;

/// Read a partition file whose lock the caller already holds.
///
/// A missing file is `None`; any other I/O failure is an error so a
/// transaction never overwrites data it could not see.
fn read_raw(path: &Path) -> PlannerResult<OnDisk> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()),
    }
}

fn decode_raw(path: &Path, on_disk: &OnDisk) -> Partition {
    on_disk
        .as_deref()
        .map(|bytes| decode(path, bytes))
        .unwrap_or_default()
}

impl RecordStore for FileRecordStore {
    #[instrument(skip(self))]
    fn load_all(&self) -> Partitions {
        let active = Self::read_shared(&self.active_path);
        let archived = Self::read_shared(&self.archived_path);
        debug!(
            active = active.len(),
            archived = archived.len(),
            "Loaded partitions"
        );
        Partitions::new(active, archived)
    }

    #[instrument(skip(self, partitions))]
    fn save_all(&self, partitions: Partitions) -> PlannerResult<()> {
        let _active_lock = PartitionLock::acquire(&self.active_path, LockMode::Exclusive)?;
        let _archived_lock = PartitionLock::acquire(&self.archived_path, LockMode::Exclusive)?;
        let archived_on_disk = read_raw(&self.archived_path)?;
        self.commit(None, partitions, &archived_on_disk)
    }

    #[instrument(skip(self, mutate))]
    fn transaction<R, F>(&self, mutate: F) -> PlannerResult<R>
    where
        F: FnOnce(&mut Partitions) -> PlannerResult<R>,
    {
        let _active_lock = PartitionLock::acquire(&self.active_path, LockMode::Exclusive)?;
        let _archived_lock = PartitionLock::acquire(&self.archived_path, LockMode::Exclusive)?;

        let active_on_disk = read_raw(&self.active_path)?;
        let archived_on_disk = read_raw(&self.archived_path)?;
        let mut partitions = Partitions::new(
            decode_raw(&self.active_path, &active_on_disk),
            decode_raw(&self.archived_path, &archived_on_disk),
        );
        partitions.normalize();
        let before = partitions.clone();

        let result = mutate(&mut partitions)?;
        self.commit(Some(&before), partitions, &archived_on_disk)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use table_planner_core::{ArchiveReason, GuildId, TableFields, TableId, TableRecord, UserId};
    use table_planner_error::PlannerErrorKind;

    fn insert(store: &FileRecordStore) -> TableId {
        let fields = TableFields::new("Lancer", "Wednesday 18:00", "Mech skirmish", 4).unwrap();
        let record = TableRecord::create(fields, UserId(1), GuildId(1), Utc::now());
        let id = *record.id();
        store
            .transaction(|partitions| {
                partitions.active.insert(id, record);
                Ok(())
            })
            .unwrap();
        id
    }

    /// Swap the active file for a directory so renaming a new document onto
    /// it fails. Returns where the real file was parked.
    fn block_active(store: &FileRecordStore) -> PathBuf {
        let parked = store.active_path().with_extension("parked");
        std::fs::rename(store.active_path(), &parked).unwrap();
        std::fs::create_dir(store.active_path()).unwrap();
        parked
    }

    fn unblock_active(store: &FileRecordStore, parked: &Path) {
        std::fs::remove_dir(store.active_path()).unwrap();
        std::fs::rename(parked, store.active_path()).unwrap();
    }

    #[test]
    fn test_failed_active_write_restores_archived_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path()).unwrap();
        let closed = insert(&store);
        store
            .archive_tables(&[closed], ArchiveReason::Owner, Utc::now())
            .unwrap();
        let open = insert(&store);

        let before = store.load_all();
        let archived_bytes = read_raw(store.archived_path()).unwrap();
        let mut after = before.clone();
        after.archive_many([&open], ArchiveReason::Owner, Utc::now());

        let parked = block_active(&store);
        let err = store
            .commit(Some(&before), after, &archived_bytes)
            .unwrap_err();
        assert!(matches!(err.kind(), PlannerErrorKind::Storage(_)));
        assert_eq!(read_raw(store.archived_path()).unwrap(), archived_bytes);

        unblock_active(&store, &parked);
        assert_eq!(store.load_all(), before);
    }

    #[test]
    fn test_failed_active_write_removes_new_archived_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path()).unwrap();
        let open = insert(&store);
        assert!(!store.archived_path().exists());

        let before = store.load_all();
        let mut after = before.clone();
        after.archive_many([&open], ArchiveReason::Moderator, Utc::now());

        let parked = block_active(&store);
        assert!(store.commit(Some(&before), after, &None).is_err());
        assert!(!store.archived_path().exists());

        unblock_active(&store, &parked);
        assert_eq!(store.load_all(), before);
    }

    #[test]
    fn test_unchanged_partitions_are_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path()).unwrap();
        let open = insert(&store);
        let before = store.load_all();

        let parked = block_active(&store);
        // Nothing changed, so the blocked active file is never touched.
        store.commit(Some(&before), before.clone(), &None).unwrap();
        unblock_active(&store, &parked);

        assert!(store.load_active().contains_key(&open));
        assert!(!store.archived_path().exists());
    }
}
