//! Advisory partition locks on sibling `.lock` files.
//!
//! Locks are OS-level (`flock` on Unix, `LockFileEx` on Windows), so they
//! serialize threads of this process and other processes alike. The lock file
//! never holds data.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use table_planner_error::{PlannerResult, StorageError, StorageErrorKind};
use tracing::{trace, warn};

/// Requested access to a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockMode {
    Shared,
    Exclusive,
}

/// Held lock; released on drop.
#[derive(Debug)]
pub(crate) struct PartitionLock {
    file: File,
    path: PathBuf,
}

impl PartitionLock {
    /// Block until `mode` access to the partition at `data_path` is granted.
    pub(crate) fn acquire(data_path: &Path, mode: LockMode) -> PlannerResult<Self> {
        let path = lock_path(data_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Lock(format!("{}: {}", path.display(), e)))
            })?;

        let locked = match mode {
            LockMode::Shared => file.lock_shared(),
            LockMode::Exclusive => file.lock(),
        };
        locked.map_err(|e| {
            StorageError::new(StorageErrorKind::Lock(format!("{}: {}", path.display(), e)))
        })?;

        trace!(path = %path.display(), ?mode, "Acquired partition lock");
        Ok(Self { file, path })
    }
}

impl Drop for PartitionLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!(path = %self.path.display(), error = %e, "Failed to release partition lock");
        }
    }
}

/// `tables_active.json` → `tables_active.json.lock`
pub(crate) fn lock_path(data_path: &Path) -> PathBuf {
    let mut name = data_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
