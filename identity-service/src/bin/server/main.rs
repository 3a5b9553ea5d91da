use std::net::SocketAddr;
use std::sync::Arc;

use auth::TokenCodec;
use chrono::Duration;
use identity_service::config::Config;
use identity_service::domain::auth::models::AuthParams;
use identity_service::domain::auth::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::notifier::SmtpNotifier;
use identity_service::outbound::repositories::PostgresSessionRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        smtp_host = %config.email.smtp_host,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_codec = Arc::new(TokenCodec::new(config.jwt.secret.as_bytes()));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let session_repository = Arc::new(PostgresSessionRepository::new(pg_pool));
    let notifier = Arc::new(SmtpNotifier::new(&config.email)?);

    let params = AuthParams {
        access_token_ttl: Duration::minutes(config.jwt.access_ttl_minutes),
        refresh_token_ttl: Duration::days(config.jwt.refresh_ttl_days),
        recovery_token_ttl: Duration::minutes(config.jwt.recovery_ttl_minutes),
        public_base_url: config.email.public_base_url.clone(),
    };
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        session_repository,
        notifier,
        Arc::clone(&token_codec),
        params,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, token_codec, config.server.cookie_secure);

    // ConnectInfo feeds the login handler the peer address for session rows
    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}
