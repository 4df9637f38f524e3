//! Sliding-window counter.

use crate::WindowLimit;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{HashMap, VecDeque};
use tracing::trace;

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The event was admitted and recorded.
    Allowed,
    /// The window is full.
    Denied {
        /// Whole seconds until the oldest admitted event leaves the window
        wait_seconds: u64,
    },
}

impl Admission {
    /// Whether the event was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Per-key log of admitted event timestamps.
///
/// Each key keeps its timestamps in insertion order, so pruning only ever
/// pops from the front.
#[derive(Debug, Default)]
pub struct SlidingWindowLimiter {
    events: HashMap<u64, VecDeque<DateTime<Utc>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit and record an event for `key` at `now`, or report how long to wait.
    ///
    /// Timestamps strictly older than `now - window` no longer count.
    pub fn check_and_record(&mut self, key: u64, now: DateTime<Utc>, limit: WindowLimit) -> Admission {
        let window = window_length(limit.window_seconds);
        let timestamps = self.events.entry(key).or_default();

        if let Some(cutoff) = now.checked_sub_signed(window) {
            while timestamps.front().is_some_and(|oldest| *oldest < cutoff) {
                timestamps.pop_front();
            }
        }

        if timestamps.len() >= limit.max_count as usize {
            let wait_seconds = timestamps
                .front()
                .map(|oldest| match oldest.checked_add_signed(window) {
                    Some(expires) => ceil_seconds(expires - now),
                    None => u64::MAX,
                })
                .unwrap_or(0);
            trace!(key, wait_seconds, "Window full");
            return Admission::Denied { wait_seconds };
        }

        timestamps.push_back(now);
        Admission::Allowed
    }
}

pub(crate) fn window_length(seconds: u64) -> TimeDelta {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

/// Round a remaining duration up to whole seconds, clamped at zero.
pub(crate) fn ceil_seconds(remaining: TimeDelta) -> u64 {
    if remaining <= TimeDelta::zero() {
        return 0;
    }
    let whole = remaining.num_seconds().unsigned_abs();
    if remaining.subsec_nanos() > 0 {
        whole + 1
    } else {
        whole
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_seconds_rounds_up() {
        assert_eq!(ceil_seconds(TimeDelta::milliseconds(8_001)), 9);
        assert_eq!(ceil_seconds(TimeDelta::seconds(8)), 8);
        assert_eq!(ceil_seconds(TimeDelta::milliseconds(1)), 1);
    }

    #[test]
    fn test_ceil_seconds_clamps_negative() {
        assert_eq!(ceil_seconds(TimeDelta::seconds(-3)), 0);
        assert_eq!(ceil_seconds(TimeDelta::zero()), 0);
    }

    #[test]
    fn test_zero_limit_denies_everything() {
        let mut limiter = SlidingWindowLimiter::new();
        let admission = limiter.check_and_record(1, Utc::now(), WindowLimit::new(0, 10));
        assert_eq!(admission, Admission::Denied { wait_seconds: 0 });
    }

    #[test]
    fn test_window_length_saturates() {
        assert_eq!(window_length(u64::MAX), TimeDelta::MAX);
        assert_eq!(window_length(10), TimeDelta::seconds(10));
    }
}
