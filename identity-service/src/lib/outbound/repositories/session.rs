use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::DeviceId;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionPatch;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::UserId;

const SESSION_COLUMNS: &str = "device_id, user_id, ip, title, \
     token_issue_date, token_expiration_date, last_active_date";

/// Raw sessions row as stored in Postgres
#[derive(sqlx::FromRow)]
struct SessionRow {
    device_id: Uuid,
    user_id: Uuid,
    ip: String,
    title: String,
    token_issue_date: DateTime<Utc>,
    token_expiration_date: DateTime<Utc>,
    last_active_date: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            device_id: DeviceId(row.device_id),
            user_id: UserId(row.user_id),
            ip: row.ip,
            title: row.title,
            token_issue_date: row.token_issue_date,
            token_expiration_date: row.token_expiration_date,
            last_active_date: row.last_active_date,
        }
    }
}

fn database_error(e: sqlx::Error) -> SessionError {
    SessionError::DatabaseError(e.to_string())
}

pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, SessionError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (device_id, user_id, ip, title,
                                  token_issue_date, token_expiration_date, last_active_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.device_id.0)
        .bind(session.user_id.0)
        .bind(&session.ip)
        .bind(&session.title)
        .bind(session.token_issue_date)
        .bind(session.token_expiration_date)
        .bind(session.last_active_date)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(session)
    }

    async fn find_by_device_id(
        &self,
        device_id: &DeviceId,
    ) -> Result<Option<Session>, SessionError> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE device_id = $1");
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(device_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(row.map(Session::from))
    }

    async fn update_if_current(
        &self,
        device_id: &DeviceId,
        patch: SessionPatch,
        expected_expiration: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        // The expiration guard makes the rotation a compare-and-swap: a
        // session already rotated by a concurrent refresh no longer matches
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET token_issue_date = $2, token_expiration_date = $3, last_active_date = $4
            WHERE device_id = $1 AND token_expiration_date = $5
            "#,
        )
        .bind(device_id.0)
        .bind(patch.token_issue_date)
        .bind(patch.token_expiration_date)
        .bind(patch.last_active_date)
        .bind(expected_expiration)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_device_id(&self, device_id: &DeviceId) -> Result<bool, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE device_id = $1")
            .bind(device_id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user_except(
        &self,
        user_id: &UserId,
        keep: &DeviceId,
    ) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND device_id <> $2")
            .bind(user_id.0)
            .bind(keep.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Session>, SessionError> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY last_active_date DESC"
        );
        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .bind(user_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(rows.into_iter().map(Session::from).collect())
    }
}
