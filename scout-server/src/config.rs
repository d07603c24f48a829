use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::auth::{DEFAULT_SESSION_HEADER, DEFAULT_SESSION_TTL_DAYS};
use crate::credentials::DEFAULT_PASSWORD_COST;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub session_header: String,
    pub session_ttl_days: i64,
    /// bcrypt work factor for new password hashes (4 to 31)
    pub password_cost: u32,
}

#[derive(Debug, Deserialize)]
pub struct Seed {
    /// Load the bundled catalog and demo user at startup
    pub demo: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub seed: Seed,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "scout.db")?
            .set_default("auth.session_header", DEFAULT_SESSION_HEADER)?
            .set_default("auth.session_ttl_days", DEFAULT_SESSION_TTL_DAYS)?
            .set_default("auth.password_cost", i64::from(DEFAULT_PASSWORD_COST))?
            .set_default("seed.demo", true)?;

        // 1. Optional settings.toml, in the working directory or the crate directory
        let config_file_name = "settings.toml";
        for path in [
            PathBuf::from(config_file_name),
            PathBuf::from("scout-server").join(config_file_name),
        ] {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        // 2. Environment variables (highest priority)
        for (var, key) in [
            ("HOST", "server.host"),
            ("PORT", "server.port"),
            ("DATABASE_PATH", "database.path"),
            ("SESSION_TTL_DAYS", "auth.session_ttl_days"),
            ("PASSWORD_COST", "auth.password_cost"),
            ("SEED_DEMO", "seed.demo"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.auth.session_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "auth.session_ttl_days must be positive".to_string(),
            ));
        }
        if !(4..=31).contains(&settings.auth.password_cost) {
            return Err(ConfigError::Message(
                "auth.password_cost must be between 4 and 31".to_string(),
            ));
        }
        Ok(settings)
    }
}
