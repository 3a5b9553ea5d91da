use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn confirm_registration<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ConfirmRegistrationRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .confirm_registration(&body.code)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}

/// HTTP request body carrying the emailed confirmation code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmRegistrationRequest {
    code: String,
}
