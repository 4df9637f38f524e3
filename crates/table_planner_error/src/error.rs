//! Top-level error wrapper types.

use crate::{
    ConfigError, JsonError, RateLimitedError, StorageError, TableError, TableErrorKind,
    ValidationError,
};

/// Every failure the table planner can report.
///
/// # Examples
///
/// ```
/// use table_planner_error::{PlannerError, ValidationError};
///
/// let err: PlannerError = ValidationError::new("capacity", "must be between 1 and 20").into();
/// assert!(format!("{}", err).contains("Validation Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PlannerErrorKind {
    /// Bad user input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Signup state precondition violated, stale id, or missing authority
    #[from(TableError)]
    Table(TableError),
    /// Admission denied by the rate limiter
    #[from(RateLimitedError)]
    RateLimited(RateLimitedError),
    /// Record store failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Table planner error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Table Planner Error: {}", _0)]
pub struct PlannerError(Box<PlannerErrorKind>);

impl PlannerError {
    /// Create a new error from a kind.
    pub fn new(kind: PlannerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PlannerErrorKind {
        &self.0
    }

    /// Whether the user can fix this by changing their input or retrying later.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self.kind(),
            PlannerErrorKind::Validation(_)
                | PlannerErrorKind::Table(_)
                | PlannerErrorKind::RateLimited(_)
        )
    }

    /// Render the message shown to the user at the command boundary.
    ///
    /// Internal failures collapse into a generic message and are logged here,
    /// so callers can reply with the result unconditionally.
    pub fn user_message(&self) -> String {
        match self.kind() {
            PlannerErrorKind::Validation(err) => {
                format!("Invalid {}: {}.", err.field, err.reason)
            }
            PlannerErrorKind::Table(err) => match err.kind() {
                TableErrorKind::AlreadyInTable { waitlisted: true, .. } => {
                    "You are already on the waitlist!".to_string()
                }
                TableErrorKind::AlreadyInTable { .. } => "You are already signed up!".to_string(),
                TableErrorKind::NotInTable { .. } => {
                    "You weren't signed up in the first place.".to_string()
                }
                TableErrorKind::NotFound(_) => {
                    "This table no longer exists or was archived.".to_string()
                }
                TableErrorKind::Forbidden { action, .. } => {
                    format!("You are not allowed to {} this table.", action)
                }
            },
            PlannerErrorKind::RateLimited(err) if err.scope == "user" => format!(
                "Please wait {} more second(s) before running this command again.",
                err.wait_seconds
            ),
            PlannerErrorKind::RateLimited(err) if err.scope == "guild" => format!(
                "This server is busy. Please wait {} more second(s) before trying again.",
                err.wait_seconds
            ),
            PlannerErrorKind::RateLimited(err) if err.scope == "channel" => format!(
                "Please wait {} more second(s) before listing tables again.",
                err.wait_seconds
            ),
            PlannerErrorKind::RateLimited(err) => format!(
                "Please wait {} more second(s) before trying again.",
                err.wait_seconds
            ),
            PlannerErrorKind::Storage(_)
            | PlannerErrorKind::Config(_)
            | PlannerErrorKind::Json(_) => {
                tracing::error!(error = %self, "Command failed with an internal error");
                "Something went wrong while processing your request. Please try again later."
                    .to_string()
            }
        }
    }
}

// Generic From implementation for any type that converts to PlannerErrorKind
impl<T> From<T> for PlannerError
where
    T: Into<PlannerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for table planner operations.
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageErrorKind;

    #[test]
    fn test_validation_is_user_correctable() {
        let err: PlannerError = ValidationError::new("schedule", "cannot be empty").into();
        assert!(err.is_user_correctable());
        assert_eq!(err.user_message(), "Invalid schedule: cannot be empty.");
    }

    #[test]
    fn test_storage_renders_generic_message() {
        let err: PlannerError =
            StorageError::new(StorageErrorKind::FileWrite("disk full".to_string())).into();
        assert!(!err.is_user_correctable());
        assert!(!err.user_message().contains("disk full"));
    }

    #[test]
    fn test_rate_limit_message_carries_wait() {
        let err: PlannerError = RateLimitedError::new("guild", 7, 4).into();
        assert!(err.user_message().contains("server is busy"));
        assert!(err.user_message().contains('4'));
    }

    #[test]
    fn test_waitlisted_duplicate_message() {
        let err: PlannerError = TableError::new(TableErrorKind::AlreadyInTable {
            user: 1,
            waitlisted: true,
        })
        .into();
        assert_eq!(err.user_message(), "You are already on the waitlist!");
    }
}
