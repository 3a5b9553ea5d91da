use auth::RefreshClaims;
use auth::TokenCodec;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;

use crate::domain::auth::models::RefreshPrincipal;
use crate::domain::session::models::DeviceId;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;

/// Cookie carrying the refresh token between rotations
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Build the http-only refresh cookie.
///
/// The `secure` attribute is driven by server configuration so local
/// development can run over plain http.
pub fn refresh_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_TOKEN_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .path("/")
        .build()
}

/// Read the raw refresh token out of the jar.
pub fn refresh_token_value(jar: &CookieJar) -> Result<&str, ApiError> {
    jar.get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value())
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token cookie".to_string()))
}

/// Verify the refresh cookie and resolve the identity it proves.
pub fn refresh_principal(jar: &CookieJar, codec: &TokenCodec) -> Result<RefreshPrincipal, ApiError> {
    let token = refresh_token_value(jar)?;

    let claims: RefreshClaims = codec.verify(token).map_err(|e| {
        tracing::warn!("Refresh token rejected: {}", e);
        ApiError::Unauthorized("Invalid or expired refresh token".to_string())
    })?;

    let user_id = UserId::from_string(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid token format".to_string()))?;
    let device_id = DeviceId::from_string(&claims.device_id)
        .map_err(|_| ApiError::Unauthorized("Invalid token format".to_string()))?;

    Ok(RefreshPrincipal { user_id, device_id })
}
