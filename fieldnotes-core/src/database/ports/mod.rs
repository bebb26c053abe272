//! Repository ports consumed by the application services.
//!
//! Adapters live in [`crate::database::postgres`] and, for tests, in
//! `crate::database::memory`.

pub mod machines;
pub mod services;
pub mod sessions;
pub mod spare_parts;
pub mod users;
