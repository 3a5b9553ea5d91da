use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::User;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn me<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<MeResponseData>, ApiError> {
    state
        .auth_service
        .current_user(&auth_user.user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub user_id: String,
    pub login: String,
    pub email: String,
}

impl From<&User> for MeResponseData {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            login: user.login.as_str().to_string(),
            email: user.email.as_str().to_string(),
        }
    }
}
