use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::TokenCodec;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use identity_service::domain::auth::errors::NotifierError;
use identity_service::domain::auth::models::AuthParams;
use identity_service::domain::auth::models::EmailMessage;
use identity_service::domain::auth::ports::Notifier;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::session::errors::SessionError;
use identity_service::domain::session::models::DeviceId;
use identity_service::domain::session::models::Session;
use identity_service::domain::session::models::SessionPatch;
use identity_service::domain::session::ports::SessionRepository;
use identity_service::domain::user::errors::UserError;
use identity_service::domain::user::models::LoginOrEmailMatch;
use identity_service::domain::user::models::MatchedBy;
use identity_service::domain::user::models::RecoveryCode;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::ports::UserRepository;
use identity_service::inbound::http::router::create_router;
use serde_json::json;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server.
///
/// The HTTP stack is the production router; only the outbound adapters are
/// swapped for in-memory ones, so the suite runs without Postgres or SMTP.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub outbox: Arc<RecordingNotifier>,
    pub token_codec: Arc<TokenCodec>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Create in-memory adapters
        let user_repo = Arc::new(InMemoryUserRepository::default());
        let session_repo = Arc::new(InMemorySessionRepository::default());
        let outbox = Arc::new(RecordingNotifier::default());
        let token_codec = Arc::new(TokenCodec::new(TEST_JWT_SECRET));

        let params = AuthParams {
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            recovery_token_ttl: Duration::minutes(30),
            public_base_url: address.clone(),
        };

        let auth_service = Arc::new(AuthService::new(
            user_repo,
            session_repo,
            Arc::clone(&outbox),
            Arc::clone(&token_codec),
            params,
        ));

        let router = create_router(auth_service, Arc::clone(&token_codec), false);

        // Spawn server in background; ConnectInfo feeds the login handler
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            api_client: Self::new_client(),
            outbox,
            token_codec,
        }
    }

    /// Build a client with its own cookie jar (one jar per device)
    pub fn new_client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create reqwest client")
    }

    /// Absolute URL for a path on the test server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account and confirm it through the emailed code
    pub async fn register_and_confirm(&self, login: &str, email: &str, password: &str) {
        let response = self
            .post("/api/auth/registration")
            .json(&json!({
                "login": login,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

        let message = self.wait_for_email_to(email, 1).await;
        let code = extract_query_param(&message.text_body, "code");

        let response = self
            .post("/api/auth/registration-confirmation")
            .json(&json!({ "code": code }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    }

    /// Log in with the shared client, returning the access token and the
    /// refresh cookie value
    pub async fn login(&self, login_or_email: &str, password: &str) -> (String, String) {
        self.login_with(&self.api_client, login_or_email, password)
            .await
    }

    /// Log in with a specific client, returning the access token and the
    /// refresh cookie value
    pub async fn login_with(
        &self,
        client: &reqwest::Client,
        login_or_email: &str,
        password: &str,
    ) -> (String, String) {
        let response = client
            .post(self.url("/api/auth/login"))
            .json(&json!({
                "login_or_email": login_or_email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let refresh_token = refresh_cookie_value(&response);
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        let access_token = body["data"]["access_token"].as_str().unwrap().to_string();

        (access_token, refresh_token)
    }

    /// Wait until at least `count` emails were sent to `email`, returning
    /// the most recent one. Delivery is fire-and-forget on the server side,
    /// so tests poll briefly.
    pub async fn wait_for_email_to(&self, email: &str, count: usize) -> EmailMessage {
        for _ in 0..200 {
            let sent = self.outbox.sent();
            let matching: Vec<&EmailMessage> = sent.iter().filter(|m| m.to == email).collect();
            if matching.len() >= count {
                return (*matching.last().unwrap()).clone();
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("Timed out waiting for email number {} to {}", count, email);
    }
}

/// Pull a query parameter value out of an emailed link
pub fn extract_query_param(text: &str, name: &str) -> String {
    let marker = format!("{}=", name);
    let (_, rest) = text
        .split_once(&marker)
        .unwrap_or_else(|| panic!("No {} parameter in: {}", name, text));
    rest.split(|c: char| c == '&' || c.is_whitespace())
        .next()
        .unwrap()
        .to_string()
}

/// Extract the refresh token value out of a Set-Cookie response header
pub fn refresh_cookie_value(response: &reqwest::Response) -> String {
    let header = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("Response carries no Set-Cookie header")
        .to_str()
        .expect("Set-Cookie header is not valid UTF-8");

    header
        .strip_prefix("refreshToken=")
        .expect("Set-Cookie header is not the refresh cookie")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Notifier that records messages instead of delivering them
#[derive(Default)]
pub struct RecordingNotifier {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError> {
        self.outbox.lock().unwrap().push(message);
        Ok(())
    }
}

/// In-memory user store with the same observable behavior as the Postgres
/// adapter, including unique login and email enforcement
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.login.as_str() == user.login.as_str())
        {
            return Err(UserError::LoginAlreadyExists(
                user.login.as_str().to_string(),
            ));
        }
        if users
            .values()
            .any(|u| u.email.as_str() == user.email.as_str())
        {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        users.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&id.0).cloned())
    }

    async fn find_by_login_or_email(
        &self,
        login: &str,
        email: &str,
    ) -> Result<Option<LoginOrEmailMatch>, UserError> {
        let users = self.users.lock().unwrap();
        // A login match takes precedence when both arguments hit different rows
        let found = users
            .values()
            .find(|u| u.login.as_str() == login)
            .or_else(|| users.values().find(|u| u.email.as_str() == email));

        Ok(found.map(|user| {
            let matched_by = if user.login.as_str() == login {
                MatchedBy::Login
            } else {
                MatchedBy::Email
            };
            LoginOrEmailMatch {
                user: user.clone(),
                matched_by,
            }
        }))
    }

    async fn find_by_confirmation_code(&self, code: &str) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|u| u.email_confirmation.confirmation_code == code)
            .cloned())
    }

    async fn set_email_confirmed(&self, id: &UserId, confirmed: bool) -> Result<bool, UserError> {
        let mut users = self.users.lock().unwrap();
        Ok(match users.get_mut(&id.0) {
            Some(user) => {
                user.email_confirmation.is_confirmed = confirmed;
                true
            }
            None => false,
        })
    }

    async fn set_confirmation_code(&self, id: &UserId, code: &str) -> Result<bool, UserError> {
        let mut users = self.users.lock().unwrap();
        Ok(match users.get_mut(&id.0) {
            Some(user) => {
                user.email_confirmation.confirmation_code = code.to_string();
                true
            }
            None => false,
        })
    }

    async fn set_recovery_code(&self, id: &UserId, code: &str) -> Result<bool, UserError> {
        let mut users = self.users.lock().unwrap();
        Ok(match users.get_mut(&id.0) {
            Some(user) => {
                user.recovery_code = Some(RecoveryCode {
                    code: code.to_string(),
                    is_used: false,
                });
                true
            }
            None => false,
        })
    }

    async fn mark_recovery_code_used(&self, id: &UserId) -> Result<bool, UserError> {
        let mut users = self.users.lock().unwrap();
        Ok(match users.get_mut(&id.0) {
            Some(user) => {
                if let Some(recovery) = user.recovery_code.as_mut() {
                    recovery.is_used = true;
                }
                true
            }
            None => false,
        })
    }

    async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<bool, UserError> {
        let mut users = self.users.lock().unwrap();
        Ok(match users.get_mut(&id.0) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                true
            }
            None => false,
        })
    }
}

/// In-memory session store with the same conditional-update semantics as
/// the Postgres adapter
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(session.device_id.0, session.clone());
        Ok(session)
    }

    async fn find_by_device_id(
        &self,
        device_id: &DeviceId,
    ) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.get(&device_id.0).cloned())
    }

    async fn update_if_current(
        &self,
        device_id: &DeviceId,
        patch: SessionPatch,
        expected_expiration: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        Ok(match sessions.get_mut(&device_id.0) {
            Some(session) if session.token_expiration_date == expected_expiration => {
                session.token_issue_date = patch.token_issue_date;
                session.token_expiration_date = patch.token_expiration_date;
                session.last_active_date = patch.last_active_date;
                true
            }
            _ => false,
        })
    }

    async fn delete_by_device_id(&self, device_id: &DeviceId) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        Ok(sessions.remove(&device_id.0).is_some())
    }

    async fn delete_all_for_user_except(
        &self,
        user_id: &UserId,
        keep: &DeviceId,
    ) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != *user_id || s.device_id == *keep);
        Ok((before - sessions.len()) as u64)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Session>, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        let mut result: Vec<Session> = sessions
            .values()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.last_active_date.cmp(&a.last_active_date));
        Ok(result)
    }
}
