use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::super::ApiError;
use super::super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::session::models::DeviceId;
use crate::inbound::http::cookies::refresh_principal;
use crate::inbound::http::router::AppState;

pub async fn terminate_device<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Path(device_id): Path<String>,
    jar: CookieJar,
) -> Result<ApiSuccess<()>, ApiError> {
    let principal = refresh_principal(&jar, &state.token_codec)?;

    // An unparseable ID can't name an existing session
    let target = DeviceId::from_string(&device_id)
        .map_err(|_| ApiError::NotFound("Device not found".to_string()))?;

    state
        .auth_service
        .logout_device(&target, &principal)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}
