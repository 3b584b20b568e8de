//! Bounded text field validation shared by accounts, plants, and observations.

use std::fmt;

use super::Error;

/// Reason a single payload field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// A required field was absent or null.
    Required,
    /// A required field was present but blank once trimmed.
    Blank,
    /// The value exceeds the column limit.
    TooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The value does not have the expected shape.
    Invalid {
        /// Human-readable explanation.
        reason: String,
    },
}

impl FieldErrorKind {
    fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Blank => "blank",
            Self::TooLong { .. } => "max_length",
            Self::Invalid { .. } => "invalid",
        }
    }
}

/// Validation failure for one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    field: &'static str,
    kind: FieldErrorKind,
}

impl FieldError {
    /// Build a field error.
    #[must_use]
    pub const fn new(field: &'static str, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// Shorthand for [`FieldErrorKind::Required`].
    #[must_use]
    pub const fn required(field: &'static str) -> Self {
        Self::new(field, FieldErrorKind::Required)
    }

    /// Shorthand for [`FieldErrorKind::Invalid`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(
            field,
            FieldErrorKind::Invalid {
                reason: reason.into(),
            },
        )
    }

    /// Name of the offending field as it appears on the wire.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Why the field was rejected.
    #[must_use]
    pub const fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match &self.kind {
            FieldErrorKind::Required => write!(f, "{field} is required"),
            FieldErrorKind::Blank => write!(f, "{field} must not be blank"),
            FieldErrorKind::TooLong { max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            FieldErrorKind::Invalid { reason } => write!(f, "{field}: {reason}"),
        }
    }
}

impl std::error::Error for FieldError {}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        Self::invalid_field(value.field, value.kind.code(), value.to_string())
    }
}

/// How a create or update payload treats absent fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// `POST`: required fields must be present.
    Create,
    /// `PUT`: required fields must be present; absent optional fields are kept.
    Replace,
    /// `PATCH`: every field is optional.
    Patch,
}

impl WriteMode {
    /// Whether required fields must be supplied.
    #[must_use]
    pub const fn requires_all(self) -> bool {
        matches!(self, Self::Create | Self::Replace)
    }
}

/// Validate a required field in an update payload.
///
/// Absent values pass in [`WriteMode::Patch`] and are rejected otherwise.
pub fn required_change(
    field: &'static str,
    value: Option<String>,
    max: usize,
    mode: WriteMode,
) -> Result<Option<String>, FieldError> {
    match value {
        Some(raw) => required_text(field, &raw, max).map(Some),
        None if mode.requires_all() => Err(FieldError::required(field)),
        None => Ok(None),
    }
}

/// Validate an optional field in an update payload. `None` leaves the field
/// untouched and `Some(None)` clears it.
pub fn optional_change(
    field: &'static str,
    value: Option<Option<String>>,
    max: usize,
) -> Result<Option<Option<String>>, FieldError> {
    value
        .map(|inner| optional_text(field, inner.as_deref(), max))
        .transpose()
}

/// Validate a required text field, trimming surrounding whitespace.
///
/// # Examples
/// ```
/// use greenleaf::domain::fields::required_text;
///
/// assert_eq!(required_text("habitat", "  Forest ", 255).unwrap(), "Forest");
/// assert!(required_text("habitat", "   ", 255).is_err());
/// ```
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, FieldErrorKind::Blank));
    }
    bounded(field, trimmed, max)
}

/// Validate an optional text field. Blank input is stored as `None`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, FieldError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => bounded(field, trimmed, max).map(Some),
    }
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::new(field, FieldErrorKind::TooLong { max }));
    }
    Ok(value.to_owned())
}
