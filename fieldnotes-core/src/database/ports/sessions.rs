use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldnotes_model::UserId;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: i32,
    pub user_id: UserId,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[async_trait]
pub trait SessionsRepository: Send + Sync {
    async fn create(&self, session: NewSession) -> Result<SessionRecord>;

    /// Lookup by token digest, ignoring revoked and expired sessions.
    async fn find_active_by_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>>;

    /// Mark the session revoked. Returns `false` if it was unknown or
    /// already revoked.
    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>)
    -> Result<bool>;
}
