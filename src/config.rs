use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} harus diisi di environment / .env")]
    Missing(&'static str),
    #[error("nilai {name} tidak valid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Optional bootstrap admin, created active at startup when absent.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Process-wide settings, read once at startup and shared read-only through
/// the router state.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub store_timeout: Duration,
    pub token_ttl_hours: i64,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());

        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5u32)?;
        let timeout_secs = parse_or(get("STORE_TIMEOUT_SECS"), "STORE_TIMEOUT_SECS", 10u64)?;
        let token_ttl_hours = parse_or(get("TOKEN_TTL_HOURS"), "TOKEN_TTL_HOURS", 24i64)?;

        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "STORE_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminSeed {
                email: get("ADMIN_EMAIL").unwrap_or_else(|| format!("{username}@localhost")),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            store_timeout: Duration::from_secs(timeout_secs),
            token_ttl_hours,
            admin,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
