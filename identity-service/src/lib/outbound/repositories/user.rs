use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::EmailConfirmation;
use crate::domain::user::models::Login;
use crate::domain::user::models::LoginOrEmailMatch;
use crate::domain::user::models::MatchedBy;
use crate::domain::user::models::RecoveryCode;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

const USER_COLUMNS: &str = "id, login, email, password_hash, created_at, \
     is_confirmed, confirmation_code, confirmation_expires_at, \
     recovery_code, recovery_code_used";

/// Raw users row as stored in Postgres
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    login: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    is_confirmed: bool,
    confirmation_code: String,
    confirmation_expires_at: DateTime<Utc>,
    recovery_code: Option<String>,
    recovery_code_used: bool,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let recovery_code = row.recovery_code.map(|code| RecoveryCode {
            code,
            is_used: row.recovery_code_used,
        });

        Ok(User {
            id: UserId(row.id),
            login: Login::new(row.login)?,
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            created_at: row.created_at,
            email_confirmation: EmailConfirmation {
                is_confirmed: row.is_confirmed,
                confirmation_code: row.confirmation_code,
                expiration_date: row.confirmation_expires_at,
            },
            recovery_code,
        })
    }
}

fn database_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, login, email, password_hash, created_at,
                               is_confirmed, confirmation_code, confirmation_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.0)
        .bind(user.login.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.email_confirmation.is_confirmed)
        .bind(&user.email_confirmation.confirmation_code)
        .bind(user.email_confirmation.expiration_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("users_login_key") {
                        return UserError::LoginAlreadyExists(user.login.as_str().to_string());
                    }
                    if db_err.constraint() == Some("users_email_key") {
                        return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                    }
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_login_or_email(
        &self,
        login: &str,
        email: &str,
    ) -> Result<Option<LoginOrEmailMatch>, UserError> {
        // A login match takes precedence when both arguments hit different rows
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login = $1 OR email = $2 \
             ORDER BY (login = $1) DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(login)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        match row {
            Some(row) => {
                let user = User::try_from(row)?;
                let matched_by = if user.login.as_str() == login {
                    MatchedBy::Login
                } else {
                    MatchedBy::Email
                };
                Ok(Some(LoginOrEmailMatch { user, matched_by }))
            }
            None => Ok(None),
        }
    }

    async fn find_by_confirmation_code(&self, code: &str) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE confirmation_code = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn set_email_confirmed(&self, id: &UserId, confirmed: bool) -> Result<bool, UserError> {
        let result = sqlx::query("UPDATE users SET is_confirmed = $2 WHERE id = $1")
            .bind(id.0)
            .bind(confirmed)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_confirmation_code(&self, id: &UserId, code: &str) -> Result<bool, UserError> {
        let result = sqlx::query("UPDATE users SET confirmation_code = $2 WHERE id = $1")
            .bind(id.0)
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_recovery_code(&self, id: &UserId, code: &str) -> Result<bool, UserError> {
        let result = sqlx::query(
            "UPDATE users SET recovery_code = $2, recovery_code_used = FALSE WHERE id = $1",
        )
        .bind(id.0)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_recovery_code_used(&self, id: &UserId) -> Result<bool, UserError> {
        let result = sqlx::query("UPDATE users SET recovery_code_used = TRUE WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<bool, UserError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id.0)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
