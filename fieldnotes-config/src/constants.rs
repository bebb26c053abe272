use std::time::Duration;

/// Placeholder token key; rejected outside dev mode.
pub const DEFAULT_TOKEN_KEY: &str = "change-me-fieldnotes-token-key";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

pub const MIN_SECRET_LENGTH: usize = 32;
