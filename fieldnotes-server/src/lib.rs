//! HTTP API for the Fieldnotes maintenance tracker.
//!
//! Every route lives under `/api/v1`. Apart from `/health`, routes require a
//! bearer session issued by `fieldnotes-server sessions issue`.

pub mod app;
pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use app::create_app;
pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
