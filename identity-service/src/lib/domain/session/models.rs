use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::session::errors::DeviceIdError;
use crate::domain::user::models::UserId;

/// Device unique identifier type.
///
/// Minted at login; one device ID per refresh-token chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    /// Generate a new random device ID.
    ///
    /// # Returns
    /// DeviceId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a device ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed DeviceId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, DeviceIdError> {
        Uuid::parse_str(s)
            .map(DeviceId)
            .map_err(|e| DeviceIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Device session entity.
///
/// One row per signed-in device. `token_expiration_date` mirrors the exp
/// claim of the refresh token currently bound to the device; a presented
/// token whose exp differs has been rotated away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub device_id: DeviceId,
    pub user_id: UserId,
    pub ip: String,
    pub title: String,
    pub token_issue_date: DateTime<Utc>,
    pub token_expiration_date: DateTime<Utc>,
    pub last_active_date: DateTime<Utc>,
}

/// Replacement token metadata applied to a session on rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPatch {
    pub token_issue_date: DateTime<Utc>,
    pub token_expiration_date: DateTime<Utc>,
    pub last_active_date: DateTime<Utc>,
}
