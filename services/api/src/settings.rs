//! Application settings loaded from the environment
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file by the caller. Every setting except `JWT_SECRET` has a
//! default.
//!
//! # Environment Variables
//! - `DATABASE_URL`: full PostgreSQL URL; when unset it is assembled from
//!   `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`
//! - `DATABASE_MAX_CONNECTIONS` (default: 10)
//! - `DATABASE_MIN_CONNECTIONS` (default: 1)
//! - `DATABASE_CONNECTION_TIMEOUT`: pool acquire timeout in seconds (default: 30)
//! - `DB_AUTO_MIGRATE`: apply migrations on startup (default: true)
//! - `SERVER_HOST` (default: 0.0.0.0), `SERVER_PORT` (default: 8080)
//! - `SERVER_MODE`: `debug`, `release` or `test` (default: release)
//! - `SERVER_REQUEST_TIMEOUT`: per-request deadline in seconds (default: 30)
//! - `JWT_SECRET`: token signing secret (required)
//! - `JWT_EXPIRATION`: token lifetime such as `24h`, `90m` or `3600` (default: 24h)

use common::database::DatabaseConfig;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::jwt::JwtConfig;

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the server runs, mirroring the usual debug/release/test modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Debug,
    Release,
    Test,
}

impl ServerMode {
    fn parse(value: &str) -> Result<Self, SettingsError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(ServerMode::Debug),
            "release" => Ok(ServerMode::Release),
            "test" => Ok(ServerMode::Test),
            other => Err(SettingsError::Invalid(format!(
                "SERVER_MODE must be debug, release or test, got '{other}'"
            ))),
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            ServerMode::Release => "info",
            ServerMode::Debug | ServerMode::Test => "debug",
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mode: ServerMode,
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auto_migrate: bool,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

/// Flat view of the environment, one field per variable
#[derive(Debug, Deserialize)]
struct RawSettings {
    database_url: Option<String>,
    db_host: String,
    db_port: u16,
    db_user: String,
    db_password: String,
    db_name: String,
    database_max_connections: u32,
    database_min_connections: u32,
    database_connection_timeout: u64,
    db_auto_migrate: bool,
    server_host: String,
    server_port: u16,
    server_mode: String,
    server_request_timeout: u64,
    jwt_secret: Option<String>,
    jwt_expiration: String,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        let raw: RawSettings = Config::builder()
            .set_default("db_host", "localhost")?
            .set_default("db_port", 5432_i64)?
            .set_default("db_user", "postgres")?
            .set_default("db_password", "postgres")?
            .set_default("db_name", "events")?
            .set_default("database_max_connections", 10_i64)?
            .set_default("database_min_connections", 1_i64)?
            .set_default("database_connection_timeout", 30_i64)?
            .set_default("db_auto_migrate", true)?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080_i64)?
            .set_default("server_mode", "release")?
            .set_default("server_request_timeout", 30_i64)?
            .set_default("jwt_expiration", "24h")?
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, SettingsError> {
        let jwt_secret = raw
            .jwt_secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| SettingsError::Invalid("JWT_SECRET must be set".to_string()))?;

        let database_url = match raw.database_url.filter(|url| !url.is_empty()) {
            Some(url) => url,
            None => DatabaseConfig::url_from_parts(
                &raw.db_host,
                raw.db_port,
                &raw.db_user,
                &raw.db_password,
                &raw.db_name,
            ),
        };

        Ok(Settings {
            database: DatabaseConfig {
                database_url,
                max_connections: raw.database_max_connections,
                min_connections: raw.database_min_connections,
                connection_timeout: raw.database_connection_timeout,
            },
            auto_migrate: raw.db_auto_migrate,
            server: ServerConfig {
                host: raw.server_host,
                port: raw.server_port,
                mode: ServerMode::parse(&raw.server_mode)?,
                request_timeout: Duration::from_secs(raw.server_request_timeout),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration: parse_duration_secs(&raw.jwt_expiration)?,
            },
        })
    }
}

/// Parse a lifetime such as `3600`, `45s`, `90m`, `24h` or `7d` into seconds
pub fn parse_duration_secs(value: &str) -> Result<u64, SettingsError> {
    let value = value.trim();
    let invalid = || SettingsError::Invalid(format!("Invalid duration '{value}'"));

    let (digits, multiplier) = match value.char_indices().last() {
        Some((index, 's')) => (&value[..index], 1),
        Some((index, 'm')) => (&value[..index], 60),
        Some((index, 'h')) => (&value[..index], 3600),
        Some((index, 'd')) => (&value[..index], 86400),
        Some(_) => (value, 1),
        None => return Err(invalid()),
    };

    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    match amount.checked_mul(multiplier) {
        Some(0) | None => Err(invalid()),
        Some(seconds) => Ok(seconds),
    }
}
