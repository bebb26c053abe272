use std::{fmt, sync::Arc};

use anyhow::Context;
use fieldnotes_config::Config;
use fieldnotes_core::{
    AppUnitOfWork, MachineLookup, PostgresDatabase, ServiceLog,
    SessionService, SparePartCatalog, TokenHasher, UserDirectory,
};

/// Shared handler state. Cloned per request; every field is an `Arc` or a
/// service that only holds `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<AppUnitOfWork>,
    /// Absent when the state is composed over in-memory repositories.
    pub postgres: Option<Arc<PostgresDatabase>>,
    pub config: Arc<Config>,
    pub lookup: MachineLookup,
    pub catalog: SparePartCatalog,
    pub service_log: ServiceLog,
    pub users: UserDirectory,
    pub sessions: SessionService,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("postgres", &self.postgres.is_some())
            .field("dev_mode", &self.config.dev_mode)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        unit_of_work: Arc<AppUnitOfWork>,
        config: Arc<Config>,
    ) -> anyhow::Result<Self> {
        let hasher = TokenHasher::new(&config.auth.token_key)
            .context("failed to initialise session token hasher")?;
        let sessions = SessionService::new(
            &unit_of_work,
            Arc::new(hasher),
            config.auth.session_ttl,
        )
        .context("invalid session TTL")?;

        Ok(Self {
            lookup: MachineLookup::new(&unit_of_work),
            catalog: SparePartCatalog::new(&unit_of_work),
            service_log: ServiceLog::new(&unit_of_work),
            users: UserDirectory::new(&unit_of_work),
            sessions,
            unit_of_work,
            postgres: None,
            config,
        })
    }

    pub fn with_postgres(mut self, postgres: Arc<PostgresDatabase>) -> Self {
        self.postgres = Some(postgres);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
