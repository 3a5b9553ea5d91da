use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::NotifierError;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::DeviceContext;
use crate::domain::auth::models::EmailMessage;
use crate::domain::auth::models::IssuedTokens;
use crate::domain::auth::models::RefreshPrincipal;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::session::models::DeviceId;
use crate::domain::session::models::Session;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for authentication engine operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account and dispatch a confirmation email.
    ///
    /// # Arguments
    /// * `command` - Validated command containing login, email, and password
    ///
    /// # Returns
    /// Unit on success
    ///
    /// # Errors
    /// * `Conflict` - Login or email is already registered
    /// * `Internal` - Hashing or storage failed
    async fn register(&self, command: RegisterCommand) -> Result<(), AuthError>;

    /// Confirm a registration by its emailed code.
    ///
    /// # Arguments
    /// * `code` - Confirmation code from the emailed link
    ///
    /// # Returns
    /// Unit on success
    ///
    /// # Errors
    /// * `BadRequest` - Code is unknown, already applied, or expired
    /// * `Internal` - Storage failed
    async fn confirm_registration(&self, code: &str) -> Result<(), AuthError>;

    /// Replace the confirmation code and email it again.
    ///
    /// # Arguments
    /// * `email` - Address the original confirmation went to
    ///
    /// # Returns
    /// Unit on success
    ///
    /// # Errors
    /// * `BadRequest` - Email is unknown, already confirmed, or the window expired
    /// * `Internal` - Storage failed
    async fn resend_confirmation(&self, email: &EmailAddress) -> Result<(), AuthError>;

    /// Verify credentials and open a new device session.
    ///
    /// # Arguments
    /// * `credentials` - Login-or-email identifier plus password
    /// * `device` - Request-scoped device metadata
    ///
    /// # Returns
    /// Freshly minted token pair
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown identifier or wrong password
    /// * `Internal` - Hashing, signing, or storage failed
    async fn login(
        &self,
        credentials: Credentials,
        device: DeviceContext,
    ) -> Result<IssuedTokens, AuthError>;

    /// Rotate a refresh token, replacing the pair bound to its device.
    ///
    /// # Arguments
    /// * `refresh_token` - Token presented by the client
    ///
    /// # Returns
    /// Freshly minted token pair
    ///
    /// # Errors
    /// * `Unauthorized` - Token invalid, expired, superseded, or session revoked
    /// * `Internal` - Signing or storage failed
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, AuthError>;

    /// List the active device sessions of the calling user.
    ///
    /// # Arguments
    /// * `principal` - Identity proven by a verified refresh token
    ///
    /// # Returns
    /// Sessions of the user, most recently active first
    ///
    /// # Errors
    /// * `Unauthorized` - The calling device session no longer exists
    /// * `Internal` - Storage failed
    async fn list_devices(&self, principal: &RefreshPrincipal) -> Result<Vec<Session>, AuthError>;

    /// Revoke one device session of the calling user.
    ///
    /// # Arguments
    /// * `target` - Device to revoke
    /// * `principal` - Identity proven by a verified refresh token
    ///
    /// # Returns
    /// Unit on success
    ///
    /// # Errors
    /// * `Unauthorized` - The calling device session no longer exists
    /// * `DeviceNotFound` - No session for the target device
    /// * `Forbidden` - Target session belongs to another user
    /// * `Internal` - Storage failed
    async fn logout_device(
        &self,
        target: &DeviceId,
        principal: &RefreshPrincipal,
    ) -> Result<(), AuthError>;

    /// Revoke every session of the calling user except the calling device.
    ///
    /// # Arguments
    /// * `principal` - Identity proven by a verified refresh token
    ///
    /// # Returns
    /// Number of sessions revoked
    ///
    /// # Errors
    /// * `Unauthorized` - The calling device session no longer exists
    /// * `Internal` - Storage failed
    async fn logout_other_devices(&self, principal: &RefreshPrincipal) -> Result<u64, AuthError>;

    /// Start password recovery for an email address.
    ///
    /// Always dispatches an email; whether a recovery code is stored
    /// depends on the address being registered. The caller cannot tell
    /// the two cases apart.
    ///
    /// # Arguments
    /// * `email` - Address to send the recovery link to
    ///
    /// # Returns
    /// Unit on success
    ///
    /// # Errors
    /// * `Internal` - Signing or storage failed
    async fn recover_password(&self, email: &EmailAddress) -> Result<(), AuthError>;

    /// Set a new password using a recovery token.
    ///
    /// # Arguments
    /// * `new_password` - Replacement password in plain text
    /// * `recovery_token` - Token from the emailed recovery link
    ///
    /// # Returns
    /// Unit on success
    ///
    /// # Errors
    /// * `BadRequest` - Token invalid, expired, superseded, or already applied
    /// * `Internal` - Hashing or storage failed
    async fn set_new_password(
        &self,
        new_password: &str,
        recovery_token: &str,
    ) -> Result<(), AuthError>;

    /// Retrieve the profile of an authenticated user.
    ///
    /// # Arguments
    /// * `id` - User ID from a verified access token
    ///
    /// # Returns
    /// User entity
    ///
    /// # Errors
    /// * `Unauthorized` - Account no longer exists
    /// * `Internal` - Storage failed
    async fn current_user(&self, id: &UserId) -> Result<User, AuthError>;
}

/// Outbound delivery of notification emails.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver one email message.
    ///
    /// # Arguments
    /// * `message` - Recipient, subject, and both body variants
    ///
    /// # Returns
    /// Unit on success
    ///
    /// # Errors
    /// * `Address` - Recipient or sender address failed to parse
    /// * `Build` - Message assembly failed
    /// * `Transport` - SMTP delivery failed
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError>;
}
