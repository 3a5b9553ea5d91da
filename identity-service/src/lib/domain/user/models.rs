use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::errors::EmailError;
use crate::domain::user::errors::LoginError;
use crate::domain::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered account together with its email confirmation
/// state and, when a password reset is pending, the active recovery code.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub login: Login,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub email_confirmation: EmailConfirmation,
    pub recovery_code: Option<RecoveryCode>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Login value type
///
/// Ensures the login is 3-10 characters and contains only alphanumeric,
/// underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login(String);

impl Login {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 10;

    /// Create a new valid login.
    ///
    /// Validates length and character constraints.
    ///
    /// # Arguments
    /// * `login` - Raw login string
    ///
    /// # Returns
    /// Validated Login value object
    ///
    /// # Errors
    /// * `TooShort` - Login shorter than 3 characters
    /// * `TooLong` - Login longer than 10 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(login: String) -> Result<Self, LoginError> {
        let login = Self::with_valid_length(login)?;
        let login = Self::with_valid_chars(login)?;
        Ok(Self(login))
    }

    fn with_valid_length(login: String) -> Result<String, LoginError> {
        let length = login.len();
        if length < Self::MIN_LENGTH {
            Err(LoginError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(LoginError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(login)
        }
    }

    fn with_valid_chars(login: String) -> Result<String, LoginError> {
        if login
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(login)
        } else {
            Err(LoginError::InvalidCharacters)
        }
    }

    /// Get login as string slice.
    ///
    /// # Returns
    /// Login string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    ///
    /// # Returns
    /// Email string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email confirmation state of an account.
///
/// A freshly registered account starts unconfirmed with a single-use
/// confirmation code valid for a limited window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfirmation {
    pub is_confirmed: bool,
    pub confirmation_code: String,
    pub expiration_date: DateTime<Utc>,
}

/// Password recovery code state.
///
/// Stores the most recently issued recovery token; `is_used` flips once a
/// new password has been set with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryCode {
    pub code: String,
    pub is_used: bool,
}

/// Which column matched a combined login-or-email lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Login,
    Email,
}

impl MatchedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedBy::Login => "login",
            MatchedBy::Email => "email",
        }
    }
}

/// Result of a combined login-or-email lookup
#[derive(Debug, Clone)]
pub struct LoginOrEmailMatch {
    pub user: User,
    pub matched_by: MatchedBy,
}
