use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;

pub async fn password_recovery<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<PasswordRecoveryRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    let email =
        EmailAddress::new(body.email).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .auth_service
        .recover_password(&email)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}

/// HTTP request body asking for a password recovery email
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordRecoveryRequest {
    email: String,
}
