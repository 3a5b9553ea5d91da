use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::super::ApiError;
use super::super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::session::models::Session;
use crate::inbound::http::cookies::refresh_principal;
use crate::inbound::http::router::AppState;

pub async fn list_devices<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Result<ApiSuccess<Vec<DeviceData>>, ApiError> {
    let principal = refresh_principal(&jar, &state.token_codec)?;

    state
        .auth_service
        .list_devices(&principal)
        .await
        .map_err(ApiError::from)
        .map(|sessions| {
            let devices = sessions.iter().map(DeviceData::from).collect();
            ApiSuccess::new(StatusCode::OK, devices)
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceData {
    pub device_id: String,
    pub ip: String,
    pub title: String,
    pub last_active_date: DateTime<Utc>,
}

impl From<&Session> for DeviceData {
    fn from(session: &Session) -> Self {
        Self {
            device_id: session.device_id.to_string(),
            ip: session.ip.clone(),
            title: session.title.clone(),
            last_active_date: session.last_active_date,
        }
    }
}
