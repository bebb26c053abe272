use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure_len};
use crate::ids::UserId;

/// Local mirror of an identity-provider subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_id: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert-or-refresh request keyed by `external_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpsert {
    pub external_id: String,
    pub full_name: String,
}

impl UserUpsert {
    pub fn validate(&self) -> Result<()> {
        ensure_len("external_id", &self.external_id, 255)?;
        ensure_len("full_name", &self.full_name, 255)
    }
}
