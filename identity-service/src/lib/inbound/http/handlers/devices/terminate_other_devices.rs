use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::super::ApiError;
use super::super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::cookies::refresh_principal;
use crate::inbound::http::router::AppState;

pub async fn terminate_other_devices<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Result<ApiSuccess<()>, ApiError> {
    let principal = refresh_principal(&jar, &state.token_codec)?;

    state
        .auth_service
        .logout_other_devices(&principal)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}
