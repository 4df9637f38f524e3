//! Admission-control rejection.

/// An operation was refused by the rate limiter.
///
/// Carries the whole-second wait hint shown to the user.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limited: {} {} must wait {}s at line {} in {}", scope, key, wait_seconds, line, file)]
pub struct RateLimitedError {
    /// Scope of the exhausted window (`user`, `guild`, `channel`)
    pub scope: String,
    /// Key of the exhausted window
    pub key: u64,
    /// Seconds until the next admission is possible
    pub wait_seconds: u64,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl RateLimitedError {
    /// Create a new rate limit rejection at the current location.
    #[track_caller]
    pub fn new(scope: impl Into<String>, key: u64, wait_seconds: u64) -> Self {
        let location = std::panic::Location::caller();
        Self {
            scope: scope.into(),
            key,
            wait_seconds,
            line: location.line(),
            file: location.file(),
        }
    }
}
