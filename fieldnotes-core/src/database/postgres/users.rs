use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldnotes_model::{User, UserId, UserUpsert};
use sqlx::{FromRow, PgPool};

use crate::database::ports::users::UsersRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    external_id: String,
    full_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            external_id: row.external_id,
            full_name: row.full_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn upsert(&self, user: UserUpsert) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (external_id, full_name)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO UPDATE
                SET full_name = EXCLUDED.full_name,
                    updated_at = NOW()
            RETURNING id, external_id, full_name, created_at, updated_at
            "#,
        )
        .bind(user.external_id)
        .bind(user.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::from_query("Failed to upsert user", e))?;

        Ok(row.into())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, external_id, full_name, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::from_query("Failed to fetch user", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, external_id, full_name, created_at, updated_at FROM users WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::from_query("Failed to fetch user", e))?;

        Ok(row.map(User::from))
    }
}
