use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::DeviceContext;
use crate::domain::auth::models::IssuedTokens;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::cookies::refresh_cookie;
use crate::inbound::http::router::AppState;

pub async fn login<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(body): Json<LoginRequestBody>,
) -> Result<(CookieJar, ApiSuccess<LoginResponseData>), ApiError> {
    let title = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let device = DeviceContext {
        ip: peer.ip().to_string(),
        title,
    };

    let credentials = Credentials {
        login_or_email: body.login_or_email,
        password: body.password,
    };

    let IssuedTokens {
        access_token,
        refresh_token,
    } = state
        .auth_service
        .login(credentials, device)
        .await
        .map_err(ApiError::from)?;

    let jar = jar.add(refresh_cookie(refresh_token, state.cookie_secure));

    Ok((
        jar,
        ApiSuccess::new(StatusCode::OK, LoginResponseData { access_token }),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    login_or_email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
}
