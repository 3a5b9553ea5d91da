use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn new_password<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<NewPasswordRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .set_new_password(&body.new_password, &body.recovery_code)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}

/// HTTP request body completing a password recovery
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPasswordRequest {
    new_password: String,
    recovery_code: String,
}
