use std::sync::Arc;

use async_trait::async_trait;
use auth::AccessClaims;
use auth::PasswordHasher;
use auth::RecoveryClaims;
use auth::RefreshClaims;
use auth::TokenCodec;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthParams;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::DeviceContext;
use crate::domain::auth::models::EmailMessage;
use crate::domain::auth::models::IssuedTokens;
use crate::domain::auth::models::RefreshPrincipal;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::Notifier;
use crate::domain::session::models::DeviceId;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionPatch;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::EmailConfirmation;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

/// How long an emailed confirmation code stays valid.
const CONFIRMATION_WINDOW_HOURS: i64 = 1;

/// Authentication engine implementation.
///
/// Concrete implementation of AuthServicePort with dependency injection.
/// Owns credential verification, token issuance, refresh rotation, and the
/// email confirmation and password recovery flows.
pub struct AuthService<UR, SR, N>
where
    UR: UserRepository,
    SR: SessionRepository,
    N: Notifier,
{
    users: Arc<UR>,
    sessions: Arc<SR>,
    notifier: Arc<N>,
    token_codec: Arc<TokenCodec>,
    password_hasher: PasswordHasher,
    params: AuthParams,
}

impl<UR, SR, N> AuthService<UR, SR, N>
where
    UR: UserRepository,
    SR: SessionRepository,
    N: Notifier,
{
    /// Create a new authentication engine with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - Credential persistence implementation
    /// * `sessions` - Device session persistence implementation
    /// * `notifier` - Outbound email delivery implementation
    /// * `token_codec` - Shared JWT signer and verifier
    /// * `params` - Token lifetimes and public link base
    ///
    /// # Returns
    /// Configured authentication engine instance
    pub fn new(
        users: Arc<UR>,
        sessions: Arc<SR>,
        notifier: Arc<N>,
        token_codec: Arc<TokenCodec>,
        params: AuthParams,
    ) -> Self {
        Self {
            users,
            sessions,
            notifier,
            token_codec,
            password_hasher: PasswordHasher::new(),
            params,
        }
    }

    fn issue_token_pair(
        &self,
        user_id: &UserId,
        device_id: &DeviceId,
    ) -> Result<IssuedTokens, AuthError> {
        let access_token = self
            .token_codec
            .issue(&AccessClaims::new(user_id, self.params.access_token_ttl))?;
        let refresh_token = self.token_codec.issue(&RefreshClaims::new(
            user_id,
            device_id,
            self.params.refresh_token_ttl,
        ))?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }

    /// Read back the exp claim of a token this engine just issued, so the
    /// session row mirrors it exactly.
    fn mirror_expiration(&self, token: &str) -> Result<DateTime<Utc>, AuthError> {
        self.token_codec
            .expiration_of(token)
            .map_err(|e| AuthError::Internal(format!("Freshly issued token failed decoding: {}", e)))
    }

    /// The caller's own device session must still exist; a revoked device
    /// cannot manage sessions even with an unexpired refresh token.
    async fn require_live_session(
        &self,
        principal: &RefreshPrincipal,
    ) -> Result<Session, AuthError> {
        self.sessions
            .find_by_device_id(&principal.device_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }

    /// Fire-and-forget email delivery; failures are logged, never surfaced.
    fn dispatch(&self, message: EmailMessage) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let recipient = message.to.clone();
            if let Err(e) = notifier.send(message).await {
                tracing::warn!("Failed to deliver notification email to {}: {}", recipient, e);
            }
        });
    }

    fn confirmation_email(&self, to: &str, code: &str) -> EmailMessage {
        let link = format!(
            "{}/api/auth/registration-confirmation?code={}",
            self.params.public_base_url, code
        );

        EmailMessage {
            to: to.to_string(),
            subject: "Finish your registration".to_string(),
            text_body: format!("Complete your registration: {}", link),
            html_body: format!(
                "<h1>Thanks for signing up!</h1>\
                 <p>To finish registration please follow the link: \
                 <a href=\"{link}\">complete registration</a></p>"
            ),
        }
    }

    fn recovery_email(&self, to: &str, token: &str) -> EmailMessage {
        let link = format!(
            "{}/auth/new-password?recoveryCode={}",
            self.params.public_base_url, token
        );

        EmailMessage {
            to: to.to_string(),
            subject: "Password recovery".to_string(),
            text_body: format!("Reset your password: {}", link),
            html_body: format!(
                "<h1>Password recovery</h1>\
                 <p>To set a new password please follow the link: \
                 <a href=\"{link}\">recover password</a></p>"
            ),
        }
    }
}

#[async_trait]
impl<UR, SR, N> AuthServicePort for AuthService<UR, SR, N>
where
    UR: UserRepository,
    SR: SessionRepository,
    N: Notifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<(), AuthError> {
        if let Some(existing) = self
            .users
            .find_by_login_or_email(command.login.as_str(), command.email.as_str())
            .await?
        {
            return Err(AuthError::Conflict {
                field: existing.matched_by.as_str().to_string(),
            });
        }

        let password_hash = self.password_hasher.hash(&command.password)?;
        let confirmation_code = Uuid::new_v4().to_string();
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            login: command.login,
            email: command.email,
            password_hash,
            created_at: now,
            email_confirmation: EmailConfirmation {
                is_confirmed: false,
                confirmation_code: confirmation_code.clone(),
                expiration_date: now + Duration::hours(CONFIRMATION_WINDOW_HOURS),
            },
            recovery_code: None,
        };

        let created = self.users.create(user).await?;

        tracing::info!(user_id = %created.id, "Registered new user");
        self.dispatch(self.confirmation_email(created.email.as_str(), &confirmation_code));

        Ok(())
    }

    async fn confirm_registration(&self, code: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_confirmation_code(code)
            .await?
            .ok_or_else(|| AuthError::bad_request("code", "Confirmation code is incorrect"))?;

        if user.email_confirmation.is_confirmed {
            return Err(AuthError::bad_request("code", "Email is already confirmed"));
        }

        if user.email_confirmation.expiration_date < Utc::now() {
            return Err(AuthError::bad_request("code", "Confirmation code is expired"));
        }

        self.users.set_email_confirmed(&user.id, true).await?;

        tracing::info!(user_id = %user.id, "Email confirmed");
        Ok(())
    }

    async fn resend_confirmation(&self, email: &EmailAddress) -> Result<(), AuthError> {
        let found = self
            .users
            .find_by_login_or_email(email.as_str(), email.as_str())
            .await?
            .ok_or_else(|| AuthError::bad_request("email", "Email is not registered"))?;
        let user = found.user;

        if user.email_confirmation.is_confirmed {
            return Err(AuthError::bad_request("email", "Email is already confirmed"));
        }

        if user.email_confirmation.expiration_date < Utc::now() {
            return Err(AuthError::bad_request("email", "Confirmation code is expired"));
        }

        // New code, same window: the old code dies by overwrite
        let confirmation_code = Uuid::new_v4().to_string();
        self.users
            .set_confirmation_code(&user.id, &confirmation_code)
            .await?;

        self.dispatch(self.confirmation_email(user.email.as_str(), &confirmation_code));

        Ok(())
    }

    async fn login(
        &self,
        credentials: Credentials,
        device: DeviceContext,
    ) -> Result<IssuedTokens, AuthError> {
        let found = self
            .users
            .find_by_login_or_email(&credentials.login_or_email, &credentials.login_or_email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        let user = found.user;

        let password_matches = self
            .password_hasher
            .verify(&credentials.password, &user.password_hash)?;
        if !password_matches {
            return Err(AuthError::Unauthorized);
        }

        let device_id = DeviceId::new();
        let tokens = self.issue_token_pair(&user.id, &device_id)?;
        let expiration = self.mirror_expiration(&tokens.refresh_token)?;
        let now = Utc::now();

        let session = Session {
            device_id,
            user_id: user.id,
            ip: device.ip,
            title: device.title,
            token_issue_date: now,
            token_expiration_date: expiration,
            last_active_date: now,
        };
        self.sessions.create(session).await?;

        tracing::info!(user_id = %user.id, device_id = %device_id, "User logged in");
        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, AuthError> {
        let claims: RefreshClaims = self.token_codec.verify(refresh_token).map_err(|e| {
            tracing::warn!("Refresh token rejected: {}", e);
            AuthError::Unauthorized
        })?;
        let device_id =
            DeviceId::from_string(&claims.device_id).map_err(|_| AuthError::Unauthorized)?;

        let session = self
            .sessions
            .find_by_device_id(&device_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        // A valid signature is not enough: the exp claim must equal the
        // stored expiration, otherwise this token has been rotated away
        if session.token_expiration_date.timestamp() != claims.exp {
            tracing::warn!(device_id = %device_id, "Superseded refresh token presented");
            return Err(AuthError::Unauthorized);
        }

        let tokens = self.issue_token_pair(&session.user_id, &device_id)?;
        let expiration = self.mirror_expiration(&tokens.refresh_token)?;
        let now = Utc::now();

        let patch = SessionPatch {
            token_issue_date: now,
            token_expiration_date: expiration,
            last_active_date: now,
        };
        let rotated = self
            .sessions
            .update_if_current(&device_id, patch, session.token_expiration_date)
            .await?;
        if !rotated {
            // Lost the rotation race after the read; treat like a replay
            tracing::warn!(device_id = %device_id, "Concurrent refresh detected");
            return Err(AuthError::Unauthorized);
        }

        tracing::debug!(device_id = %device_id, "Refresh token rotated");
        Ok(tokens)
    }

    async fn list_devices(&self, principal: &RefreshPrincipal) -> Result<Vec<Session>, AuthError> {
        self.require_live_session(principal).await?;

        Ok(self.sessions.list_for_user(&principal.user_id).await?)
    }

    async fn logout_device(
        &self,
        target: &DeviceId,
        principal: &RefreshPrincipal,
    ) -> Result<(), AuthError> {
        self.require_live_session(principal).await?;

        let session = self
            .sessions
            .find_by_device_id(target)
            .await?
            .ok_or(AuthError::DeviceNotFound)?;
        if session.user_id != principal.user_id {
            return Err(AuthError::Forbidden);
        }

        self.sessions.delete_by_device_id(target).await?;

        tracing::info!(user_id = %principal.user_id, device_id = %target, "Device session revoked");
        Ok(())
    }

    async fn logout_other_devices(&self, principal: &RefreshPrincipal) -> Result<u64, AuthError> {
        self.require_live_session(principal).await?;

        let revoked = self
            .sessions
            .delete_all_for_user_except(&principal.user_id, &principal.device_id)
            .await?;

        tracing::info!(user_id = %principal.user_id, revoked, "Other device sessions revoked");
        Ok(revoked)
    }

    async fn recover_password(&self, email: &EmailAddress) -> Result<(), AuthError> {
        let found = self
            .users
            .find_by_login_or_email(email.as_str(), email.as_str())
            .await?;

        // An unregistered address still gets an email carrying a token with
        // no subject, so the response never reveals whether the account exists
        let subject = found.as_ref().map(|m| m.user.id.to_string());
        let recovery_token = self
            .token_codec
            .issue(&RecoveryClaims::new(subject, self.params.recovery_token_ttl))?;

        if let Some(found) = found {
            self.users
                .set_recovery_code(&found.user.id, &recovery_token)
                .await?;
        }

        self.dispatch(self.recovery_email(email.as_str(), &recovery_token));

        Ok(())
    }

    async fn set_new_password(
        &self,
        new_password: &str,
        recovery_token: &str,
    ) -> Result<(), AuthError> {
        let rejected = || {
            AuthError::bad_request(
                "recovery_code",
                "Recovery code is incorrect, expired or already used",
            )
        };

        let claims: RecoveryClaims = self
            .token_codec
            .verify(recovery_token)
            .map_err(|_| rejected())?;
        let subject = claims.sub.ok_or_else(rejected)?;
        let user_id = UserId::from_string(&subject).map_err(|_| rejected())?;

        let user = self.users.find_by_id(&user_id).await?.ok_or_else(rejected)?;
        let recovery = user.recovery_code.as_ref().ok_or_else(rejected)?;
        if recovery.is_used || recovery.code != recovery_token {
            return Err(rejected());
        }

        let password_hash = self.password_hasher.hash(new_password)?;
        self.users.set_password_hash(&user.id, &password_hash).await?;
        // Consume the code only once the password actually changed
        self.users.mark_recovery_code_used(&user.id).await?;

        tracing::info!(user_id = %user.id, "Password reset via recovery code");
        Ok(())
    }

    async fn current_user(&self, id: &UserId) -> Result<User, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }
}
