use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::store::StoreBackend;
use crate::utils::display_time::DisplayZone;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,

    // Storage
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_connect_timeout: Duration,

    // Rendering
    pub display_zone: DisplayZone,

    // Rate limiting
    pub rate_per_min: u32,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn var(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let store_backend = match var("STORE_BACKEND") {
            Some(value) => value
                .trim()
                .to_lowercase()
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value,
                })?,
            None => StoreBackend::Mysql,
        };

        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let tz_offset = var("DISPLAY_TZ_OFFSET").unwrap_or_else(|| "+05:30".to_string());
        let tz_name = var("DISPLAY_TZ_NAME").unwrap_or_else(|| "IST".to_string());
        let display_zone =
            DisplayZone::parse(&tz_offset, &tz_name).ok_or(ConfigError::Invalid {
                key: "DISPLAY_TZ_OFFSET",
                value: tz_offset.clone(),
            })?;

        Ok(Self {
            server_addr: var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            store_backend,
            database_url,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            db_connect_timeout: Duration::from_secs(parse_or("DB_CONNECT_TIMEOUT_SECS", 10)?), // generous, startup only
            display_zone,
            rate_per_min: parse_or("RATE_PER_MIN", 1000)?,
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or("LOG_LEVEL", tracing::Level::INFO)?,
        })
    }
}
