// ABOUTME: Server configuration loaded from the environment
// ABOUTME: Port, bind host, CORS origin, and database settings with typed errors

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

use reqhub_config::{
    DEFAULT_API_HOST, DEFAULT_API_PORT, DEFAULT_CORS_ORIGIN, DEFAULT_DB_BUSY_TIMEOUT_SECS,
    DEFAULT_DB_MAX_CONNECTIONS, PORT, REQHUB_API_HOST, REQHUB_API_PORT, REQHUB_CORS_ORIGIN,
    REQHUB_DATABASE_PATH, REQHUB_DB_BUSY_TIMEOUT_SECS, REQHUB_DB_MAX_CONNECTIONS,
};
use reqhub_storage::StorageConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub database_path: PathBuf,
    pub db_max_connections: u32,
    pub db_busy_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // REQHUB_API_PORT wins over the legacy PORT
        let port_str = lookup(REQHUB_API_PORT)
            .or_else(|| lookup(PORT))
            .unwrap_or_else(|| DEFAULT_API_PORT.to_string());

        let port = port_str.trim().parse::<u16>()?;

        // Validate port is in valid range
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host = lookup(REQHUB_API_HOST).unwrap_or_else(|| DEFAULT_API_HOST.to_string());

        let cors_origin =
            lookup(REQHUB_CORS_ORIGIN).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let database_path = lookup(REQHUB_DATABASE_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(reqhub_core::default_database_path);

        let db_max_connections = parse_number(
            REQHUB_DB_MAX_CONNECTIONS,
            lookup(REQHUB_DB_MAX_CONNECTIONS),
            DEFAULT_DB_MAX_CONNECTIONS,
        )?;

        let db_busy_timeout_secs = parse_number(
            REQHUB_DB_BUSY_TIMEOUT_SECS,
            lookup(REQHUB_DB_BUSY_TIMEOUT_SECS),
            DEFAULT_DB_BUSY_TIMEOUT_SECS,
        )?;

        Ok(Config {
            host,
            port,
            cors_origin,
            database_path,
            db_max_connections,
            db_busy_timeout_secs,
        })
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            path: self.database_path.clone(),
            enable_wal: true,
            max_connections: self.db_max_connections,
            busy_timeout_seconds: self.db_busy_timeout_secs,
        }
    }
}

fn parse_number<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) if parsed > T::default() => Ok(parsed),
            _ => Err(ConfigError::InvalidNumber { name, value }),
        },
    }
}
