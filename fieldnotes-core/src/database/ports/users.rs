use async_trait::async_trait;
use fieldnotes_model::{User, UserId, UserUpsert};

use crate::error::Result;

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a user or refresh the name of the one with the same
    /// `external_id`.
    async fn upsert(&self, user: UserUpsert) -> Result<User>;

    async fn get(&self, id: UserId) -> Result<Option<User>>;

    async fn find_by_external_id(&self, external_id: &str)
    -> Result<Option<User>>;
}
