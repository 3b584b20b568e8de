//! Authentication inputs: login credentials and self-service registration.
//!
//! Constructors validate raw strings so handlers hand fully-formed values to
//! the services. Passwords are held in [`Zeroizing`] buffers.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, Error};

/// Raised when a login or registration payload is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email is not a valid address.
    InvalidEmail(String),
    /// Password was blank.
    EmptyPassword,
    /// `password` and `confirm_password` differ.
    PasswordMismatch,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail(reason) => write!(f, "{reason}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordMismatch => write!(f, "Password do not match."),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<CredentialsValidationError> for Error {
    fn from(value: CredentialsValidationError) -> Self {
        let (field, code) = match &value {
            CredentialsValidationError::EmptyEmail => ("email", "blank"),
            CredentialsValidationError::InvalidEmail(_) => ("email", "invalid"),
            CredentialsValidationError::EmptyPassword => ("password", "blank"),
            CredentialsValidationError::PasswordMismatch => ("confirm_password", "mismatch"),
        };
        Self::invalid_field(field, code, value.to_string())
    }
}

/// Email and password presented to obtain a token pair.
///
/// The email is kept as typed (trimmed); lookups normalise it so a
/// malformed address simply fails to match.
///
/// # Examples
/// ```
/// use greenleaf::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" a@x.com ", "pw123").unwrap();
/// assert_eq!(creds.email(), "a@x.com");
/// assert_eq!(creds.password(), "pw123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email as presented.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password as presented.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-service registration.
///
/// ## Invariants
/// - `email` is normalised.
/// - `password` is non-empty and matched its confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate a registration payload.
    ///
    /// # Examples
    /// ```
    /// use greenleaf::domain::{CredentialsValidationError, Registration};
    ///
    /// let ok = Registration::try_from_parts("a@x.com", "pw123", "pw123").unwrap();
    /// assert_eq!(ok.email().as_ref(), "a@x.com");
    ///
    /// let err = Registration::try_from_parts("a@x.com", "pw123", "pw124").unwrap_err();
    /// assert_eq!(err, CredentialsValidationError::PasswordMismatch);
    /// ```
    pub fn try_from_parts(
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        if email.trim().is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }
        let email = Email::parse(email)
            .map_err(|err| CredentialsValidationError::InvalidEmail(err.to_string()))?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password != confirm_password {
            return Err(CredentialsValidationError::PasswordMismatch);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Plaintext password, to be hashed before storage.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::EmptyEmail)]
    #[case("   ", "pw", CredentialsValidationError::EmptyEmail)]
    #[case("a@x.com", "", CredentialsValidationError::EmptyPassword)]
    fn login_rejects_blank_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("a@x.com", " pw ").expect("valid");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    #[case("", "pw", "pw", "email")]
    #[case("not-an-email", "pw", "pw", "email")]
    #[case("a@x.com", "", "", "password")]
    #[case("a@x.com", "pw123", "pw321", "confirm_password")]
    fn registration_errors_name_the_field(
        #[case] email: &str,
        #[case] password: &str,
        #[case] confirm: &str,
        #[case] field: &str,
    ) {
        let err: Error = Registration::try_from_parts(email, password, confirm)
            .expect_err("must fail")
            .into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], field);
    }

    #[test]
    fn registration_mismatch_message() {
        let err = Registration::try_from_parts("a@x.com", "pw123", "nope").expect_err("mismatch");
        assert_eq!(err.to_string(), "Password do not match.");
    }

    #[test]
    fn registration_normalises_email() {
        let reg = Registration::try_from_parts("A@X.COM", "pw123", "pw123").expect("valid");
        assert_eq!(reg.email().as_ref(), "A@x.com");
    }
}
