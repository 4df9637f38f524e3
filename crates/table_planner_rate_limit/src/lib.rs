//! Admission control for externally triggered table operations.
//!
//! Every command passes a per-user and a per-server sliding window before it
//! touches the record store. Public listings additionally wait out a
//! per-channel cooldown. All state is process-local and never persisted.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use table_planner_rate_limit::{Admission, SlidingWindowLimiter, WindowLimit};
//!
//! let limit = WindowLimit::new(2, 10);
//! let mut limiter = SlidingWindowLimiter::new();
//! let now = Utc::now();
//!
//! assert_eq!(limiter.check_and_record(7, now, limit), Admission::Allowed);
//! assert_eq!(limiter.check_and_record(7, now, limit), Admission::Allowed);
//! assert!(matches!(
//!     limiter.check_and_record(7, now, limit),
//!     Admission::Denied { .. }
//! ));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod cooldown;
mod settings;
mod window;

pub use command::{CommandRateLimiter, RateLimitScope};
pub use cooldown::ChannelCooldown;
pub use settings::{
    DEFAULT_GUILD_LIMIT, DEFAULT_LIST_COOLDOWN_SECONDS, DEFAULT_USER_LIMIT, RateLimitSettings,
    WindowLimit,
};
pub use window::{Admission, SlidingWindowLimiter};
