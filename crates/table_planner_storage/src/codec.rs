//! Partition document encoding.
//!
//! A partition document is a JSON object mapping table id to record. Decoding
//! is lenient: anything unreadable is dropped with a warning.

use crate::Partition;
use serde_json::Value;
use std::path::Path;
use table_planner_core::{TableId, TableRecord};
use table_planner_error::{PlannerResult, StorageError, StorageErrorKind};
use tracing::warn;

/// Decode a partition, discarding whatever cannot be understood.
pub(crate) fn decode(path: &Path, bytes: &[u8]) -> Partition {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Partition::new();
    }

    let document: Value = match serde_json::from_slice(bytes) {
        Ok(document) => document,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not decode partition; using empty data");
            return Partition::new();
        }
    };

    let Value::Object(entries) = document else {
        warn!(path = %path.display(), "Partition is not a JSON object; using empty data");
        return Partition::new();
    };

    let mut partition = Partition::new();
    for (key, value) in entries {
        let Ok(id) = key.parse::<TableId>() else {
            warn!(path = %path.display(), key = %key, "Discarding entry with invalid table id");
            continue;
        };
        match serde_json::from_value::<TableRecord>(value) {
            Ok(record) if *record.id() == id => {
                partition.insert(id, record);
            }
            Ok(record) => {
                warn!(
                    path = %path.display(),
                    key = %key,
                    record_id = %record.id(),
                    "Discarding entry stored under a foreign key"
                );
            }
            Err(e) => {
                warn!(path = %path.display(), key = %key, error = %e, "Discarding malformed entry");
            }
        }
    }
    partition
}

/// Encode a partition as an indented JSON document.
pub(crate) fn encode(partition: &Partition) -> PlannerResult<Vec<u8>> {
    serde_json::to_vec_pretty(partition).map_err(|e| {
        StorageError::new(StorageErrorKind::Serialize(e.to_string())).into()
    })
}
