use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    /// Human-readable duration, e.g. `"12h"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ttl: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub postgres_host: Option<String>,
    pub postgres_port: Option<u16>,
    pub postgres_user: Option<String>,
    pub postgres_password: Option<String>,
    pub postgres_password_file: Option<PathBuf>,
    pub postgres_database: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_min_connections: Option<u32>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub dev_mode: Option<bool>,
    pub auth_token_key: Option<String>,
    pub session_ttl: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; `gather` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_u16 = |name: &str| lookup(name).and_then(|s| s.parse().ok());
        let parse_u32 = |name: &str| lookup(name).and_then(|s| s.parse().ok());
        let path = |name: &str| lookup(name).map(PathBuf::from);

        Self {
            config_path: path("FIELDNOTES_CONFIG"),
            server_host: lookup("SERVER_HOST"),
            server_port: parse_u16("SERVER_PORT"),
            database_url: lookup("DATABASE_URL"),
            database_url_file: path("DATABASE_URL_FILE"),
            postgres_host: lookup("POSTGRES_HOST"),
            postgres_port: parse_u16("POSTGRES_PORT"),
            postgres_user: lookup("POSTGRES_USER"),
            postgres_password: lookup("POSTGRES_PASSWORD"),
            postgres_password_file: path("POSTGRES_PASSWORD_FILE"),
            postgres_database: lookup("POSTGRES_DATABASE"),
            db_max_connections: parse_u32("DB_MAX_CONNECTIONS"),
            db_min_connections: parse_u32("DB_MIN_CONNECTIONS"),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_csv(&raw)),
            cors_allowed_methods: lookup("CORS_ALLOWED_METHODS")
                .map(|raw| parse_csv(&raw)),
            cors_allowed_headers: lookup("CORS_ALLOWED_HEADERS")
                .map(|raw| parse_csv(&raw)),
            cors_allow_credentials: lookup("CORS_ALLOW_CREDENTIALS")
                .and_then(|raw| parse_bool(&raw)),
            dev_mode: lookup("DEV_MODE").and_then(|raw| parse_bool(&raw)),
            auth_token_key: lookup("AUTH_TOKEN_KEY"),
            session_ttl: lookup("SESSION_TTL"),
        }
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_parses_typed_values() {
        let vars: HashMap<&str, &str> = [
            ("SERVER_PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("DEV_MODE", "yes"),
            ("POSTGRES_PORT", "not-a-port"),
        ]
        .into_iter()
        .collect();

        let env = EnvConfig::from_lookup(|name| {
            vars.get(name).map(|v| v.to_string())
        });

        assert_eq!(env.server_port, Some(8080));
        assert_eq!(
            env.cors_allowed_origins,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert_eq!(env.dev_mode, Some(true));
        assert_eq!(env.postgres_port, None);
    }
}
