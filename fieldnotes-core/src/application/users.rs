use std::fmt;
use std::sync::Arc;

use fieldnotes_model::{User, UserId, UserUpsert};

use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::users::UsersRepository;
use crate::error::{CoreError, Result};

/// Local mirror of identity-provider subjects.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDirectory").finish_non_exhaustive()
    }
}

impl UserDirectory {
    pub fn new(uow: &AppUnitOfWork) -> Self {
        Self {
            users: Arc::clone(&uow.users),
        }
    }

    pub async fn upsert(&self, user: UserUpsert) -> Result<User> {
        user.validate()?;
        self.users
            .upsert(UserUpsert {
                external_id: user.external_id.trim().to_string(),
                full_name: user.full_name.trim().to_string(),
            })
            .await
    }

    pub async fn get(&self, id: UserId) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("User #{id}")))
    }

    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>> {
        self.users.find_by_external_id(external_id).await
    }
}
