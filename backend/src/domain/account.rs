//! Account identity, profile data, and the admin listing summary.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::fields::{FieldError, FieldErrorKind, optional_change};
use super::{ImageChange, ImagePath, PasswordHash};

/// Maximum stored email length.
pub const EMAIL_MAX: usize = 250;
/// Maximum length of `first_name` and `last_name`.
pub const NAME_MAX: usize = 200;
/// Maximum length of `phone_number`.
pub const PHONE_MAX: usize = 20;

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Parse an identifier from its hyphenated text form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, uuid::Error> {
        Uuid::parse_str(id.as_ref()).map(Self)
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, no whitespace, and a dotted domain part.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s.]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised, unique login identifier.
///
/// ## Invariants
/// - Surrounding whitespace is trimmed.
/// - The domain part is lower-cased; the local part keeps its case.
/// - At most [`EMAIL_MAX`] characters.
///
/// # Examples
/// ```
/// use greenleaf::domain::Email;
///
/// let email = Email::parse("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_ref(), "Ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise raw input.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new("email", FieldErrorKind::Blank));
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(FieldError::new(
                "email",
                FieldErrorKind::TooLong { max: EMAIL_MAX },
            ));
        }
        if !email_regex().is_match(trimmed) {
            return Err(FieldError::invalid("email", "Enter a valid email address."));
        }
        let normalised = match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
            None => return Err(FieldError::invalid("email", "Enter a valid email address.")),
        };
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Self-declared gender on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    /// `Male`
    Male,
    /// `Female`
    Female,
}

impl Gender {
    /// Stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Parse the stored text form.
    pub fn parse(value: &str) -> Result<Self, FieldError> {
        match value {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            other => Err(FieldError::invalid(
                "gender",
                format!("\"{other}\" is not a valid choice."),
            )),
        }
    }
}

/// Editable profile attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Date of birth.
    pub birthdate: Option<NaiveDate>,
    /// Self-declared gender.
    pub gender: Option<Gender>,
    /// Contact number, free-form.
    pub phone_number: Option<String>,
    /// Stored avatar.
    pub profile_image: Option<ImagePath>,
}

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Identifier.
    pub id: AccountId,
    /// Login email.
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: PasswordHash,
    /// Editable profile.
    pub profile: Profile,
    /// Inactive accounts cannot authenticate.
    pub is_active: bool,
    /// Staff may use administrative endpoints.
    pub is_staff: bool,
    /// Superusers hold every permission.
    pub is_superuser: bool,
}

impl Account {
    /// Build a fresh, active, unprivileged account.
    #[must_use]
    pub fn new(email: Email, password_hash: PasswordHash) -> Self {
        Self {
            id: AccountId::random(),
            email,
            password_hash,
            profile: Profile::default(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Staff or superuser.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// Per-field profile update. `None` leaves a field untouched and
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// New given name.
    pub first_name: Option<Option<String>>,
    /// New family name.
    pub last_name: Option<Option<String>>,
    /// New date of birth.
    pub birthdate: Option<Option<NaiveDate>>,
    /// New gender.
    pub gender: Option<Option<Gender>>,
    /// New phone number.
    pub phone_number: Option<Option<String>>,
    /// New avatar; stored by the service before the text fields are applied.
    pub profile_image: ImageChange,
}

impl ProfileChanges {
    /// Check text lengths and normalise blank strings to `None`.
    pub fn validate(self) -> Result<Self, FieldError> {
        Ok(Self {
            first_name: optional_change("first_name", self.first_name, NAME_MAX)?,
            last_name: optional_change("last_name", self.last_name, NAME_MAX)?,
            birthdate: self.birthdate,
            gender: self.gender,
            phone_number: optional_change("phone_number", self.phone_number, PHONE_MAX)?,
            profile_image: self.profile_image,
        })
    }

    /// Apply the text and date changes to `profile`. The image is left to
    /// the caller, which owns the storage round trip.
    pub fn apply_to(self, profile: &mut Profile) {
        if let Some(value) = self.first_name {
            profile.first_name = value;
        }
        if let Some(value) = self.last_name {
            profile.last_name = value;
        }
        if let Some(value) = self.birthdate {
            profile.birthdate = value;
        }
        if let Some(value) = self.gender {
            profile.gender = value;
        }
        if let Some(value) = self.phone_number {
            profile.phone_number = value;
        }
    }
}

/// Row of the administrative account listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    /// Identifier.
    pub id: AccountId,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Login email.
    pub email: Email,
    /// Number of plants the account owns.
    pub total_plant_record: u64,
    /// Number of observations the account owns.
    pub total_observation_records: u64,
    /// Staff flag.
    pub is_staff: bool,
    /// Superuser flag.
    pub is_superuser: bool,
}
