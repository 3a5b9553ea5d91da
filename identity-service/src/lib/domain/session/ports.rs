use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::DeviceId;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionPatch;
use crate::domain::user::models::UserId;

/// Persistence operations for device sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Persist new session to storage.
    ///
    /// # Arguments
    /// * `session` - Session entity to create
    ///
    /// # Returns
    /// Created session entity
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, session: Session) -> Result<Session, SessionError>;

    /// Retrieve session by device identifier.
    ///
    /// # Arguments
    /// * `device_id` - Device ID
    ///
    /// # Returns
    /// Optional session entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_device_id(&self, device_id: &DeviceId)
        -> Result<Option<Session>, SessionError>;

    /// Apply replacement token metadata if the stored expiration still
    /// matches the expected value.
    ///
    /// The conditional write is what makes rotation single-use under
    /// concurrent refreshes: only one caller observes the expected prior
    /// expiration.
    ///
    /// # Arguments
    /// * `device_id` - Device ID to update
    /// * `patch` - Replacement token metadata
    /// * `expected_expiration` - Expiration the stored session must still carry
    ///
    /// # Returns
    /// Whether the session was updated (false when the guard did not match)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_if_current(
        &self,
        device_id: &DeviceId,
        patch: SessionPatch,
        expected_expiration: DateTime<Utc>,
    ) -> Result<bool, SessionError>;

    /// Remove session by device identifier.
    ///
    /// # Arguments
    /// * `device_id` - Device ID to delete
    ///
    /// # Returns
    /// Whether a session was removed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_by_device_id(&self, device_id: &DeviceId) -> Result<bool, SessionError>;

    /// Remove every session of a user except one device.
    ///
    /// # Arguments
    /// * `user_id` - Owning user
    /// * `keep` - Device ID to leave in place
    ///
    /// # Returns
    /// Number of sessions removed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_all_for_user_except(
        &self,
        user_id: &UserId,
        keep: &DeviceId,
    ) -> Result<u64, SessionError>;

    /// Retrieve all sessions of a user.
    ///
    /// # Arguments
    /// * `user_id` - Owning user
    ///
    /// # Returns
    /// Vector of sessions, most recently active first
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Session>, SessionError>;
}
