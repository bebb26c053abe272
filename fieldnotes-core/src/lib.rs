//! # Fieldnotes Core
//!
//! Persistence and application services for the Fieldnotes maintenance
//! tracker: machines identified by QR labels, the spare-part inventory, the
//! service log, local users and bearer sessions.
//!
//! ## Layout
//!
//! - [`database::ports`]: repository traits consumed by the services
//! - [`database::postgres`]: sqlx adapters plus the pooled [`PostgresDatabase`]
//! - [`application`]: [`MachineLookup`], [`SparePartCatalog`], [`ServiceLog`],
//!   [`UserDirectory`] and [`SessionService`], composed from an
//!   [`AppUnitOfWork`]
//! - [`auth`]: token minting and HMAC hashing
//!
//! ## Feature Flags
//!
//! - `test-support`: in-memory adapters (`database::memory`) for running the
//!   services without PostgreSQL
//! - `postgres-tests`: repository tests against a live database

#![allow(missing_docs)]

pub mod application;
pub mod auth;
pub mod database;
pub mod error;

pub use application::{
    AppUnitOfWork, AppUnitOfWorkBuilder, AuthenticatedSession, IssuedSession,
    MachineLookup, ServiceLog, SessionService, SparePartCatalog,
    UserDirectory,
};
pub use auth::{TokenHasher, TokenHasherError};
pub use database::{DatabaseContext, PoolSettings, PostgresDatabase};
pub use error::{CoreError, Result};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
