// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, path::PathBuf};

const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Where exported PDF reports are written.
    pub report_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub session_inactivity_days: i64,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let database_url = env_or("DATABASE_URL", DEFAULT_DATABASE_URL);

        let bind_addr = env_or("BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| AppError::ConfigError(format!("BIND_ADDR: {}", e)))?;

        let report_dir = PathBuf::from(env_or("REPORT_DIR", "."));

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|e| AppError::ConfigError(format!("BCRYPT_COST: {}", e)))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };
        // bcrypt only accepts costs in 4..=31
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::ConfigError(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        let session_inactivity_days = match env::var("SESSION_INACTIVITY_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|e| AppError::ConfigError(format!("SESSION_INACTIVITY_DAYS: {}", e)))?,
            Err(_) => 1,
        };

        Ok(Self {
            database_url,
            bind_addr,
            report_dir,
            bcrypt_cost,
            session_inactivity_days,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl AppConfig {
    /// In-memory database and the cheapest bcrypt cost, for tests.
    pub fn for_tests(report_dir: PathBuf) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            report_dir,
            bcrypt_cost: 4,
            session_inactivity_days: 1,
        }
    }
}
