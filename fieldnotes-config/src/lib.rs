//! Shared configuration library for Fieldnotes.
//!
//! Configuration is layered: an optional `.env` file is loaded first, then an
//! optional TOML file, then process environment variables, which win over the
//! file. The result is a fully-resolved [`Config`] plus non-fatal
//! [`ConfigWarnings`] for the binary to log at startup.

pub mod constants;
pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    ServerConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
