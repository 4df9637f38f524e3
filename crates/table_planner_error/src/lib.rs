//! Error types for the table planner.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use table_planner_error::{PlannerResult, ValidationError};
//!
//! fn check_capacity(capacity: u32) -> PlannerResult<u32> {
//!     if capacity == 0 {
//!         Err(ValidationError::new("capacity", "must be between 1 and 20"))?
//!     }
//!     Ok(capacity)
//! }
//!
//! assert!(check_capacity(0).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod json;
mod rate_limited;
mod storage;
mod table;
mod validation;

pub use config::ConfigError;
pub use error::{PlannerError, PlannerErrorKind, PlannerResult};
pub use json::JsonError;
pub use rate_limited::RateLimitedError;
pub use storage::{StorageError, StorageErrorKind};
pub use table::{TableError, TableErrorKind};
pub use validation::ValidationError;
