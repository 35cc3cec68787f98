use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub order_lock_timeout_ms: u64,
    pub log_format: LogFormat,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            server_port: var_or("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a port number")?,
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            order_lock_timeout_ms: var_or("ORDER_LOCK_TIMEOUT_MS", "5000")
                .parse()
                .context("ORDER_LOCK_TIMEOUT_MS must be a number of milliseconds")?,
            log_format: var_or("LOG_FORMAT", "pretty").parse()?,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_allowed_origins(&raw))
                .transpose()?,
        })
    }
}

fn parse_allowed_origins(raw: &str) -> anyhow::Result<Vec<String>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    if origins.is_empty() {
        anyhow::bail!("CORS_ALLOWED_ORIGINS must be a comma-separated list of origins");
    }

    Ok(origins)
}
