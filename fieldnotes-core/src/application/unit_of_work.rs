use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::ports::{
    machines::MachinesRepository, services::ServicesRepository,
    sessions::SessionsRepository, spare_parts::SparePartsRepository,
    users::UsersRepository,
};
use crate::database::postgres::{
    PostgresDatabase, PostgresMachinesRepository, PostgresServicesRepository,
    PostgresSessionsRepository, PostgresSparePartsRepository,
    PostgresUsersRepository,
};

/// Aggregates all repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub machines: Arc<dyn MachinesRepository>,
    pub spare_parts: Arc<dyn SparePartsRepository>,
    pub services: Arc<dyn ServicesRepository>,
    pub users: Arc<dyn UsersRepository>,
    pub sessions: Arc<dyn SessionsRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("machines", &type_name_of_val(self.machines.as_ref()))
            .field("spare_parts", &type_name_of_val(self.spare_parts.as_ref()))
            .field("services", &type_name_of_val(self.services.as_ref()))
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("sessions", &type_name_of_val(self.sessions.as_ref()))
            .finish()
    }
}

#[derive(Default)]
pub struct AppUnitOfWorkBuilder {
    machines: Option<Arc<dyn MachinesRepository>>,
    spare_parts: Option<Arc<dyn SparePartsRepository>>,
    services: Option<Arc<dyn ServicesRepository>>,
    users: Option<Arc<dyn UsersRepository>>,
    sessions: Option<Arc<dyn SessionsRepository>>,
}

impl fmt::Debug for AppUnitOfWorkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWorkBuilder")
            .field("machines", &self.machines.is_some())
            .field("spare_parts", &self.spare_parts.is_some())
            .field("services", &self.services.is_some())
            .field("users", &self.users.is_some())
            .field("sessions", &self.sessions.is_some())
            .finish()
    }
}

impl AppUnitOfWorkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_machines(mut self, repo: Arc<dyn MachinesRepository>) -> Self {
        self.machines = Some(repo);
        self
    }
    pub fn with_spare_parts(
        mut self,
        repo: Arc<dyn SparePartsRepository>,
    ) -> Self {
        self.spare_parts = Some(repo);
        self
    }
    pub fn with_services(mut self, repo: Arc<dyn ServicesRepository>) -> Self {
        self.services = Some(repo);
        self
    }
    pub fn with_users(mut self, repo: Arc<dyn UsersRepository>) -> Self {
        self.users = Some(repo);
        self
    }
    pub fn with_sessions(mut self, repo: Arc<dyn SessionsRepository>) -> Self {
        self.sessions = Some(repo);
        self
    }

    /// Populate the builder with Postgres-backed repository adapters.
    pub fn with_postgres(mut self, db: Arc<PostgresDatabase>) -> Self {
        let pool = db.pool().clone();

        self.machines =
            Some(Arc::new(PostgresMachinesRepository::new(pool.clone())));
        self.spare_parts =
            Some(Arc::new(PostgresSparePartsRepository::new(pool.clone())));
        self.services =
            Some(Arc::new(PostgresServicesRepository::new(pool.clone())));
        self.users = Some(Arc::new(PostgresUsersRepository::new(pool.clone())));
        self.sessions = Some(Arc::new(PostgresSessionsRepository::new(pool)));

        self
    }

    /// Build a validated AppUnitOfWork. Returns a string error if any required
    /// repository is missing.
    pub fn build(self) -> Result<AppUnitOfWork, String> {
        Ok(AppUnitOfWork {
            machines: self
                .machines
                .ok_or_else(|| "missing MachinesRepository".to_string())?,
            spare_parts: self
                .spare_parts
                .ok_or_else(|| "missing SparePartsRepository".to_string())?,
            services: self
                .services
                .ok_or_else(|| "missing ServicesRepository".to_string())?,
            users: self
                .users
                .ok_or_else(|| "missing UsersRepository".to_string())?,
            sessions: self
                .sessions
                .ok_or_else(|| "missing SessionsRepository".to_string())?,
        })
    }
}

impl AppUnitOfWork {
    /// Convenience helper to compose all Postgres-backed repositories into a unit of work.
    pub fn from_postgres(db: Arc<PostgresDatabase>) -> Result<Self, String> {
        AppUnitOfWorkBuilder::new().with_postgres(db).build()
    }

    /// Every port backed by one shared [`InMemoryStore`](crate::database::InMemoryStore).
    #[cfg(any(test, feature = "test-support"))]
    pub fn in_memory(store: crate::database::InMemoryStore) -> Self {
        let store = Arc::new(store);
        AppUnitOfWork {
            machines: store.clone(),
            spare_parts: store.clone(),
            services: store.clone(),
            users: store.clone(),
            sessions: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;

    #[test]
    fn builder_reports_first_missing_port() {
        let store = Arc::new(InMemoryStore::new());
        let err = AppUnitOfWorkBuilder::new()
            .with_machines(store.clone())
            .with_spare_parts(store)
            .build()
            .unwrap_err();
        assert_eq!(err, "missing ServicesRepository");
    }
}
