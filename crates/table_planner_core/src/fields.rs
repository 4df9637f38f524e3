//! Validated user-editable table fields.

use table_planner_error::{PlannerResult, ValidationError};

/// Maximum characters in the game system name.
pub const MAX_SYSTEM_LEN: usize = 100;
/// Maximum characters in the schedule text.
pub const MAX_SCHEDULE_LEN: usize = 120;
/// Maximum characters in the description.
pub const MAX_DESCRIPTION_LEN: usize = 1024;
/// Smallest allowed roster size.
pub const MIN_CAPACITY: u32 = 1;
/// Largest allowed roster size.
pub const MAX_CAPACITY: u32 = 20;

/// The fields a creator fills in on the create and edit forms.
///
/// Construction trims every text field and rejects out-of-range values, so a
/// `TableFields` value is always valid.
///
/// # Examples
///
/// ```
/// use table_planner_core::TableFields;
///
/// let fields = TableFields::new("  Mothership ", "Fridays 20:00", "One-shot", 4).unwrap();
/// assert_eq!(fields.system(), "Mothership");
///
/// let err = TableFields::new("Mothership", "", "One-shot", 4).unwrap_err();
/// assert!(err.to_string().contains("schedule"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct TableFields {
    /// Game system name
    system: String,
    /// Free-form schedule text
    schedule: String,
    /// Adventure description
    description: String,
    /// Roster size
    capacity: u32,
}

impl TableFields {
    /// Validate and normalize raw form input.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first offending field.
    #[track_caller]
    pub fn new(
        system: impl AsRef<str>,
        schedule: impl AsRef<str>,
        description: impl AsRef<str>,
        capacity: u32,
    ) -> PlannerResult<Self> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(ValidationError::new(
                "capacity",
                format!("must be a number between {} and {}", MIN_CAPACITY, MAX_CAPACITY),
            )
            .into());
        }

        Ok(Self {
            system: bounded_text("system", system.as_ref(), MAX_SYSTEM_LEN)?,
            schedule: bounded_text("schedule", schedule.as_ref(), MAX_SCHEDULE_LEN)?,
            description: bounded_text("description", description.as_ref(), MAX_DESCRIPTION_LEN)?,
            capacity,
        })
    }

    /// Parse the free-text capacity input of a form.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` on `capacity` if the text is not a number
    /// in range.
    #[track_caller]
    pub fn parse_capacity(raw: &str) -> PlannerResult<u32> {
        let capacity = raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|value| (MIN_CAPACITY..=MAX_CAPACITY).contains(value));
        match capacity {
            Some(value) => Ok(value),
            None => Err(ValidationError::new(
                "capacity",
                format!("must be a number between {} and {}", MIN_CAPACITY, MAX_CAPACITY),
            )
            .into()),
        }
    }

    pub(crate) fn into_parts(self) -> (String, String, String, u32) {
        (self.system, self.schedule, self.description, self.capacity)
    }
}

#[track_caller]
fn bounded_text(field: &str, raw: &str, max: usize) -> PlannerResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "cannot be empty").into());
    }
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("is too long (max {} characters)", max),
        )
        .into());
    }
    Ok(value.to_string())
}
