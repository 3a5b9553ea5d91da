use auth::PasswordError;
use auth::TokenError;
use thiserror::Error;

use crate::domain::session::errors::SessionError;
use crate::domain::user::errors::UserError;

/// Top-level error for authentication engine operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("{message}")]
    BadRequest { field: String, message: String },

    #[error("User already exists")]
    Conflict { field: String },

    #[error("Device not found")]
    DeviceNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Shorthand for a field-scoped bad request.
    pub fn bad_request(field: &str, message: &str) -> Self {
        AuthError::BadRequest {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::LoginAlreadyExists(_) => AuthError::Conflict {
                field: "login".to_string(),
            },
            UserError::EmailAlreadyExists(_) => AuthError::Conflict {
                field: "email".to_string(),
            },
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Error for notification delivery operations
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Invalid recipient address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Email transport failed: {0}")]
    Transport(String),
}
