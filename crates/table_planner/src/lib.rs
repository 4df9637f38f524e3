//! Table Planner - game table signups for chat servers
//!
//! Server members create, browse, join, edit and archive "game tables":
//! scheduled group activities with a bounded roster and a FIFO waitlist.
//! This crate is the engine behind the chat commands. The messaging
//! platform client, command registration and message widgets are supplied
//! by the caller.
//!
//! # Features
//!
//! - **Signup state machine**: join, leave with waitlist promotion, capacity
//!   edits that demote the most recent joiners
//! - **Safe persistence**: every mutation is one locked load → mutate → save
//!   cycle over atomically replaced JSON files
//! - **Admission control**: sliding windows per user and per server, plus a
//!   per-channel cooldown on public listings
//! - **Listings**: filtered, schedule-sorted rows rendered as fixed-width text
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use table_planner::{GuildId, TableEngine, TableFields, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = TableEngine::open("data")?;
//!
//!     let fields = TableFields::new("Delta Green", "Friday 20:00", "One-shot", 4)?;
//!     let table = engine.create(fields, UserId(1), GuildId(10)).await?;
//!     engine.join(*table.id(), UserId(2), Some("Morgan".into())).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `table_planner_error` - Error types
//! - `table_planner_core` - Table records and the signup state machine
//! - `table_planner_storage` - Record store backends
//! - `table_planner_rate_limit` - Sliding-window admission control
//!
//! This crate re-exports all of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod names;
mod query;
mod telemetry;

pub use config::{CONFIG_FILE_NAME, ColumnWidths, ENV_PREFIX, PlannerConfig};
pub use engine::TableEngine;
pub use names::{DEFAULT_LOOKUP_TIMEOUT, DisplayNameCache, NameResolver};
pub use query::{
    ListingLayout, MIN_COLUMN_WIDTH, TableFilter, TableRow, format_cell, project, render_listing,
    select_involving,
};
pub use telemetry::{DEFAULT_FILTER, init_tracing};

pub use table_planner_core::*;
pub use table_planner_error::*;
pub use table_planner_rate_limit::*;
pub use table_planner_storage::*;
