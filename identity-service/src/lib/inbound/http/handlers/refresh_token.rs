use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::IssuedTokens;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::cookies::refresh_cookie;
use crate::inbound::http::cookies::refresh_token_value;
use crate::inbound::http::router::AppState;

pub async fn refresh_token<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<RefreshResponseData>), ApiError> {
    let presented = refresh_token_value(&jar)?.to_string();

    let IssuedTokens {
        access_token,
        refresh_token,
    } = state
        .auth_service
        .refresh(&presented)
        .await
        .map_err(ApiError::from)?;

    let jar = jar.add(refresh_cookie(refresh_token, state.cookie_secure));

    Ok((
        jar,
        ApiSuccess::new(StatusCode::OK, RefreshResponseData { access_token }),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
}
