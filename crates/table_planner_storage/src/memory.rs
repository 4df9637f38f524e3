//! In-process backend for single-instance deployments and tests.

use crate::{Partitions, RecordStore};
use std::sync::{Mutex, MutexGuard};
use table_planner_error::{PlannerResult, StorageError, StorageErrorKind};
use tracing::warn;

/// Record store held in memory behind a mutex.
///
/// Gives the same transaction guarantees as [`FileRecordStore`](crate::FileRecordStore)
/// within one process, and nothing across processes. Contents vanish on exit.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    partitions: Mutex<Partitions>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> PlannerResult<MutexGuard<'_, Partitions>> {
        self.partitions.lock().map_err(|_| {
            StorageError::new(StorageErrorKind::Unavailable(
                "in-memory store poisoned by a panicked writer".to_string(),
            ))
            .into()
        })
    }
}

impl RecordStore for MemoryRecordStore {
    fn load_all(&self) -> Partitions {
        match self.guard() {
            Ok(partitions) => partitions.clone(),
            Err(e) => {
                warn!(error = %e, "Could not read in-memory store; using empty data");
                Partitions::default()
            }
        }
    }

    fn save_all(&self, mut partitions: Partitions) -> PlannerResult<()> {
        partitions.normalize();
        *self.guard()? = partitions;
        Ok(())
    }

    fn transaction<R, F>(&self, mutate: F) -> PlannerResult<R>
    where
        F: FnOnce(&mut Partitions) -> PlannerResult<R>,
    {
        let mut guard = self.guard()?;
        // Mutate a copy so a failed closure leaves nothing behind.
        let mut working = guard.clone();
        let result = mutate(&mut working)?;
        working.normalize();
        *guard = working;
        Ok(result)
    }
}
