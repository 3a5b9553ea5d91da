use chrono::Duration;

use crate::domain::session::models::DeviceId;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Login;
use crate::domain::user::models::UserId;

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub login: Login,
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `login` - Validated login
    /// * `email` - Validated email address
    /// * `password` - Plain text password (will be hashed by the service)
    ///
    /// # Returns
    /// RegisterCommand with validated fields
    pub fn new(login: Login, email: EmailAddress, password: String) -> Self {
        Self {
            login,
            email,
            password,
        }
    }
}

/// Sign-in credentials as submitted by the client.
///
/// The identifier may be either a login or an email address.
#[derive(Debug)]
pub struct Credentials {
    pub login_or_email: String,
    pub password: String,
}

/// Request-scoped device metadata captured at login
#[derive(Debug, Clone)]
pub struct DeviceContext {
    pub ip: String,
    pub title: String,
}

/// Freshly minted access and refresh token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Identity proven by a verified refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPrincipal {
    pub user_id: UserId,
    pub device_id: DeviceId,
}

/// Token lifetimes and link base used by the engine
#[derive(Debug, Clone)]
pub struct AuthParams {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub recovery_token_ttl: Duration,
    pub public_base_url: String,
}

/// Outgoing notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}
