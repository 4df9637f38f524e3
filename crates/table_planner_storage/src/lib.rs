//! Persistence for table records.
//!
//! Records live in two partitions, active and archived, each persisted as a
//! JSON object keyed by table id. The [`RecordStore`] trait is the seam the
//! engine depends on; [`FileRecordStore`] is the production backend.
//!
//! # Features
//!
//! - **Partition locks**: every file has a sibling `.lock` file; reads take a
//!   shared lock, writes an exclusive one
//! - **Transactions**: [`RecordStore::transaction`] holds the exclusive locks
//!   across the whole load → mutate → save cycle, so concurrent mutations of
//!   the same table never lose updates, even across processes
//! - **Atomic writes**: temp file in the same directory, fsync, rename; only
//!   partitions that changed are rewritten, and a failed active write puts
//!   the archived file back
//! - **Lenient reads**: corrupt documents and malformed entries are dropped
//!   with a warning instead of failing
//!
//! # Example
//!
//! ```rust
//! use table_planner_core::{GuildId, TableFields, TableRecord, UserId};
//! use table_planner_storage::{FileRecordStore, RecordStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let store = FileRecordStore::new(dir.path())?;
//!
//! let fields = TableFields::new("Mörk Borg", "Tuesday 19:30", "Dungeon crawl", 4)?;
//! let record = TableRecord::create(fields, UserId(1), GuildId(2), chrono::Utc::now());
//! let id = *record.id();
//!
//! store.transaction(|partitions| {
//!     partitions.active.insert(id, record);
//!     Ok(())
//! })?;
//!
//! assert!(store.load_active().contains_key(&id));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod atomic;
mod codec;
mod filesystem;
mod lock;
mod memory;
mod partitions;
mod store;

pub use filesystem::{ACTIVE_FILE_NAME, ARCHIVED_FILE_NAME, FileRecordStore};
pub use memory::MemoryRecordStore;
pub use partitions::{Partition, Partitions};
pub use store::RecordStore;
