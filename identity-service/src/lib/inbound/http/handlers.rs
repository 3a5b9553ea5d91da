use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::auth::errors::AuthError;

pub mod confirm_registration;
pub mod devices;
pub mod login;
pub mod me;
pub mod new_password;
pub mod password_recovery;
pub mod refresh_token;
pub mod register;
pub mod resend_confirmation;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest { field: String, message: String },
    NotFound(String),
    Conflict { field: String, message: String },
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, field, message) = match self {
            ApiError::InternalServerError(msg) => {
                // Detail goes to the log, not over the wire
                tracing::error!("Internal error while handling request: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "Internal server error".to_string(),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, None, msg),
            ApiError::BadRequest { field, message } => {
                (StatusCode::BAD_REQUEST, Some(field), message)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, None, msg),
            ApiError::Conflict { field, message } => (StatusCode::CONFLICT, Some(field), message),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, None, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, None, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, field, message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            AuthError::Forbidden => ApiError::Forbidden(err.to_string()),
            AuthError::BadRequest { field, message } => ApiError::BadRequest { field, message },
            AuthError::Conflict { field } => ApiError::Conflict {
                field,
                message: "User already exists".to_string(),
            },
            AuthError::DeviceNotFound => ApiError::NotFound(err.to_string()),
            AuthError::Internal(msg) => ApiError::InternalServerError(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, field: Option<String>, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message, field },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
