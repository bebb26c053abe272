use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldnotes_model::UserId;
use sqlx::{FromRow, PgPool};

use crate::database::ports::sessions::{
    NewSession, SessionRecord, SessionsRepository,
};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresSessionsRepository {
    pool: PgPool,
}

impl PostgresSessionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: i32,
    user_id: i32,
    token_hash: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord {
            id: row.id,
            user_id: UserId::new(row.user_id),
            token_hash: row.token_hash,
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

#[async_trait]
impl SessionsRepository for PostgresSessionsRepository {
    async fn create(&self, session: NewSession) -> Result<SessionRecord> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, created_at, expires_at, revoked_at
            "#,
        )
        .bind(session.user_id.get())
        .bind(session.token_hash)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::from_query("Failed to create session", e))?;

        Ok(row.into())
    }

    async fn find_active_by_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at, revoked_at
            FROM sessions
            WHERE token_hash = $1
              AND revoked_at IS NULL
              AND expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::from_query("Failed to look up session", e))?;

        Ok(row.map(SessionRecord::from))
    }

    async fn revoke(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = $2 WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::from_query("Failed to revoke session", e))?;

        Ok(result.rows_affected() > 0)
    }
}
