//! Signup state-machine precondition errors.

/// Kinds of table state errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TableErrorKind {
    /// The user already holds a seat or a waitlist slot
    #[display("User {} is already in the table (waitlisted: {})", user, waitlisted)]
    AlreadyInTable {
        /// Platform id of the user
        user: u64,
        /// Whether the existing slot is on the waitlist
        waitlisted: bool,
    },
    /// The user is neither seated nor waiting
    #[display("User {} is not signed up", user)]
    NotInTable {
        /// Platform id of the user
        user: u64,
    },
    /// The table id is unknown, or the table was already archived
    #[display("Table {} not found", _0)]
    NotFound(String),
    /// The actor lacks authority for the action
    #[display("User {} is not allowed to {}", user, action)]
    Forbidden {
        /// Platform id of the actor
        user: u64,
        /// Action that was refused
        action: String,
    },
}

/// Table state error with location tracking.
///
/// # Examples
///
/// ```
/// use table_planner_error::{TableError, TableErrorKind};
///
/// let err = TableError::new(TableErrorKind::NotInTable { user: 42 });
/// assert!(format!("{}", err).contains("not signed up"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Table Error: {} at line {} in {}", kind, line, file)]
pub struct TableError {
    /// The kind of error that occurred
    pub kind: TableErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TableError {
    /// Create a new table error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TableErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TableErrorKind {
        &self.kind
    }
}
