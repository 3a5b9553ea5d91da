use thiserror::Error;

/// Error for DeviceId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for session store operations
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid device ID: {0}")]
    InvalidDeviceId(#[from] DeviceIdError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
