//! Atomic file replacement.

use std::io::Write;
use std::path::Path;
use table_planner_error::{PlannerResult, StorageError, StorageErrorKind};

/// Replace `path` with `contents` so readers only ever see the old or the new
/// document.
///
/// Writes a temp file in the target's directory, syncs it to stable storage,
/// then renames it over the target. A failed write leaves the target as it
/// was and removes the temp file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> PlannerResult<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(".tables_")
        .suffix(".json.tmp")
        .tempfile_in(dir)
        .map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "create temp file in {}: {}",
                dir.display(),
                e
            )))
        })?;

    temp.write_all(contents)
        .and_then(|()| temp.flush())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp.path().display(),
                e
            )))
        })?;

    temp.persist(path).map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "rename {} to {}: {}",
            e.file.path().display(),
            path.display(),
            e.error
        )))
    })?;

    sync_directory(dir);
    Ok(())
}

#[cfg(unix)]
fn sync_directory(dir: &Path) {
    // Best effort: makes the rename itself durable.
    if let Ok(handle) = std::fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) {}
