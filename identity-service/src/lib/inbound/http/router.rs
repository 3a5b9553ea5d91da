use std::sync::Arc;
use std::time::Duration;

use auth::TokenCodec;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::confirm_registration::confirm_registration;
use super::handlers::devices::list_devices;
use super::handlers::devices::terminate_device;
use super::handlers::devices::terminate_other_devices;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::new_password::new_password;
use super::handlers::password_recovery::password_recovery;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::resend_confirmation::resend_confirmation;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
    pub token_codec: Arc<TokenCodec>,
    pub cookie_secure: bool,
}

// Manual impl: a derived Clone would demand S: Clone, but only the Arcs clone
impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            token_codec: Arc::clone(&self.token_codec),
            cookie_secure: self.cookie_secure,
        }
    }
}

pub fn create_router<S: AuthServicePort>(
    auth_service: Arc<S>,
    token_codec: Arc<TokenCodec>,
    cookie_secure: bool,
) -> Router {
    let state = AppState {
        auth_service,
        token_codec,
        cookie_secure,
    };

    let public_routes = Router::new()
        .route("/api/auth/registration", post(register::<S>))
        .route(
            "/api/auth/registration-confirmation",
            post(confirm_registration::<S>),
        )
        .route(
            "/api/auth/registration-email-resending",
            post(resend_confirmation::<S>),
        )
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/refresh-token", post(refresh_token::<S>))
        .route("/api/auth/password-recovery", post(password_recovery::<S>))
        .route("/api/auth/new-password", post(new_password::<S>));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(me::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    // Authenticated by the refresh cookie inside the handlers
    let device_routes = Router::new()
        .route(
            "/api/security/devices",
            get(list_devices::<S>).delete(terminate_other_devices::<S>),
        )
        .route(
            "/api/security/devices/:device_id",
            delete(terminate_device::<S>),
        );

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(device_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
