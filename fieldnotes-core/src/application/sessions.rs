use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fieldnotes_model::{User, UserId};
use tracing::{debug, info};

use crate::application::unit_of_work::AppUnitOfWork;
use crate::auth::TokenHasher;
use crate::database::ports::{
    sessions::{NewSession, SessionRecord, SessionsRepository},
    users::UsersRepository,
};
use crate::error::{CoreError, Result};

/// A freshly minted session. `token` is the only copy of the bearer secret.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: SessionRecord,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session: SessionRecord,
    pub user: User,
}

/// Issues, authenticates and revokes opaque bearer sessions.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionsRepository>,
    users: Arc<dyn UsersRepository>,
    hasher: Arc<TokenHasher>,
    ttl: chrono::Duration,
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn unauthorized() -> CoreError {
    CoreError::Unauthorized("Invalid or expired session".into())
}

impl SessionService {
    pub fn new(
        uow: &AppUnitOfWork,
        hasher: Arc<TokenHasher>,
        ttl: Duration,
    ) -> Result<Self> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| {
            CoreError::Internal(format!("Session TTL out of range: {e}"))
        })?;
        Ok(Self {
            sessions: Arc::clone(&uow.sessions),
            users: Arc::clone(&uow.users),
            hasher,
            ttl,
        })
    }

    pub async fn issue(&self, user_id: UserId) -> Result<IssuedSession> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("User #{user_id}")))?;

        let token = self.hasher.generate_token().map_err(internal)?;
        let token_hash = self.hasher.hash_token(&token).map_err(internal)?;

        let session = self
            .sessions
            .create(NewSession {
                user_id,
                token_hash,
                expires_at: Utc::now() + self.ttl,
            })
            .await?;

        info!(user_id = %user_id, expires_at = %session.expires_at, "session issued");
        Ok(IssuedSession {
            token,
            session,
            user,
        })
    }

    /// Resolve a presented bearer token to its live session and user.
    pub async fn authenticate(
        &self,
        token: &str,
    ) -> Result<AuthenticatedSession> {
        if token.is_empty() {
            return Err(unauthorized());
        }
        let token_hash = self.hasher.hash_token(token).map_err(internal)?;

        let session = self
            .sessions
            .find_active_by_hash(&token_hash, Utc::now())
            .await?
            .ok_or_else(unauthorized)?;

        let user = self.users.get(session.user_id).await?.ok_or_else(|| {
            debug!(session_id = session.id, "session owner no longer exists");
            unauthorized()
        })?;

        Ok(AuthenticatedSession { session, user })
    }

    /// Revoke the session for `token`. Returns `false` if it was already
    /// revoked or never existed.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let token_hash = self.hasher.hash_token(token).map_err(internal)?;
        let revoked = self.sessions.revoke(&token_hash, Utc::now()).await?;
        if revoked {
            info!("session revoked");
        }
        Ok(revoked)
    }
}

fn internal(err: crate::auth::TokenHasherError) -> CoreError {
    CoreError::Internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::UserDirectory;
    use crate::database::InMemoryStore;
    use fieldnotes_model::UserUpsert;

    async fn service_with_user(ttl: Duration) -> (SessionService, UserId) {
        let uow = AppUnitOfWork::in_memory(InMemoryStore::new());
        let user = UserDirectory::new(&uow)
            .upsert(UserUpsert {
                external_id: "idp|1".into(),
                full_name: "Kim Tan".into(),
            })
            .await
            .unwrap();
        let hasher = Arc::new(TokenHasher::new("test-key").unwrap());
        (SessionService::new(&uow, hasher, ttl).unwrap(), user.id)
    }

    #[tokio::test]
    async fn issued_token_authenticates_until_revoked() {
        let (sessions, user_id) =
            service_with_user(Duration::from_secs(3600)).await;

        let issued = sessions.issue(user_id).await.unwrap();
        assert_ne!(issued.token, issued.session.token_hash);

        let auth = sessions.authenticate(&issued.token).await.unwrap();
        assert_eq!(auth.user.id, user_id);

        assert!(sessions.revoke(&issued.token).await.unwrap());
        assert!(!sessions.revoke(&issued.token).await.unwrap());
        let err = sessions.authenticate(&issued.token).await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn expired_session_is_rejected() {
        let (sessions, user_id) = service_with_user(Duration::ZERO).await;

        let issued = sessions.issue(user_id).await.unwrap();
        let err = sessions.authenticate(&issued.token).await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let (sessions, _) = service_with_user(Duration::from_secs(60)).await;

        for token in ["", "not-a-session"] {
            let err = sessions.authenticate(token).await.unwrap_err();
            assert!(matches!(err, CoreError::Unauthorized(_)));
        }
    }

    #[tokio::test]
    async fn issuing_for_unknown_user_fails() {
        let (sessions, _) = service_with_user(Duration::from_secs(60)).await;

        let err = sessions.issue(UserId::new(404)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
