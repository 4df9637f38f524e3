//! Field-level input validation errors.

/// User-correctable input error naming the offending field.
///
/// # Examples
///
/// ```
/// use table_planner_error::ValidationError;
///
/// let err = ValidationError::new("system", "cannot be empty");
/// assert_eq!(err.field, "system");
/// assert!(format!("{}", err).contains("cannot be empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} {} at line {} in {}", field, reason, line, file)]
pub struct ValidationError {
    /// Name of the field that failed validation
    pub field: String,
    /// Why the value was rejected
    pub reason: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error at the current location.
    #[track_caller]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            field: field.into(),
            reason: reason.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
