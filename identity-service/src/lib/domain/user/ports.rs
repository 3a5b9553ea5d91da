use async_trait::async_trait;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::LoginOrEmailMatch;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Arguments
    /// * `user` - User entity to create
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `LoginAlreadyExists` - Login is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user whose login or email matches either argument.
    ///
    /// Both arguments usually carry the same string: a sign-in identifier
    /// that may be either a login or an email address.
    ///
    /// # Arguments
    /// * `login` - Candidate login
    /// * `email` - Candidate email address
    ///
    /// # Returns
    /// Optional match carrying the user and which column matched
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_login_or_email(
        &self,
        login: &str,
        email: &str,
    ) -> Result<Option<LoginOrEmailMatch>, UserError>;

    /// Retrieve user by email confirmation code.
    ///
    /// # Arguments
    /// * `code` - Confirmation code sent to the user
    ///
    /// # Returns
    /// Optional user entity (None if no user carries this code)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_confirmation_code(&self, code: &str) -> Result<Option<User>, UserError>;

    /// Set the email confirmation flag.
    ///
    /// # Arguments
    /// * `id` - User ID
    /// * `confirmed` - New confirmation state
    ///
    /// # Returns
    /// Whether a row was updated
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn set_email_confirmed(&self, id: &UserId, confirmed: bool) -> Result<bool, UserError>;

    /// Replace the email confirmation code.
    ///
    /// The confirmation window is left untouched; only the code changes.
    ///
    /// # Arguments
    /// * `id` - User ID
    /// * `code` - New confirmation code
    ///
    /// # Returns
    /// Whether a row was updated
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn set_confirmation_code(&self, id: &UserId, code: &str) -> Result<bool, UserError>;

    /// Store a freshly issued password recovery code.
    ///
    /// Resets the used flag, superseding any earlier recovery code.
    ///
    /// # Arguments
    /// * `id` - User ID
    /// * `code` - Recovery code to store
    ///
    /// # Returns
    /// Whether a row was updated
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn set_recovery_code(&self, id: &UserId, code: &str) -> Result<bool, UserError>;

    /// Mark the stored recovery code as used.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Returns
    /// Whether a row was updated
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn mark_recovery_code_used(&self, id: &UserId) -> Result<bool, UserError>;

    /// Replace the stored password hash.
    ///
    /// # Arguments
    /// * `id` - User ID
    /// * `password_hash` - New Argon2 hash
    ///
    /// # Returns
    /// Whether a row was updated
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<bool, UserError>;
}
