//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory, then overridden by
//! `LEDGER__<SECTION>__<KEY>` environment variables.
//!
//! See `settings.toml` at the repository root for an example.
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, builder::DefaultState, ConfigBuilder};
use engine::{RetryPolicy, TransferSettings};
use sea_orm::IsolationLevel;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    Postgres(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub max_connections: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    #[default]
    Serializable,
    RepeatableRead,
    ReadCommitted,
}

impl From<Isolation> for IsolationLevel {
    fn from(value: Isolation) -> Self {
        match value {
            Isolation::Serializable => IsolationLevel::Serializable,
            Isolation::RepeatableRead => IsolationLevel::RepeatableRead,
            Isolation::ReadCommitted => IsolationLevel::ReadCommitted,
        }
    }
}

/// Transfer coordinator knobs. Missing keys fall back to the engine defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub isolation: Isolation,
    pub max_attempts: Option<u32>,
    pub base_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl Transfer {
    pub fn to_engine(&self) -> TransferSettings {
        let defaults = RetryPolicy::default();
        TransferSettings {
            isolation_level: self.isolation.into(),
            retry: RetryPolicy {
                max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
                base_delay: self
                    .base_backoff_ms
                    .map_or(defaults.base_delay, Duration::from_millis),
                max_delay: self
                    .max_backoff_ms
                    .map_or(defaults.max_delay, Duration::from_millis),
            },
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub transfer: Transfer,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Config::builder().add_source(File::with_name("settings").required(false)))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings = builder
            .add_source(
                Environment::with_prefix("LEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::load(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn full_settings() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { postgres = "postgres://ledger@localhost/ledger" }
            max_connections = 20

            [transfer]
            isolation = "repeatable_read"
            max_attempts = 3
            base_backoff_ms = 5
            max_backoff_ms = 50
            timeout_ms = 2000
            "#,
        );

        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert_eq!(
            server.database,
            Database::Postgres("postgres://ledger@localhost/ledger".to_string())
        );

        let transfer = settings.transfer.to_engine();
        assert!(matches!(transfer.isolation_level, IsolationLevel::RepeatableRead));
        assert_eq!(transfer.retry.max_attempts, 3);
        assert_eq!(transfer.retry.base_delay, Duration::from_millis(5));
        assert_eq!(transfer.retry.max_delay, Duration::from_millis(50));
        assert_eq!(transfer.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn minimal_settings_use_defaults() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.unwrap().database, Database::Memory);
        let transfer = settings.transfer.to_engine();
        assert!(matches!(transfer.isolation_level, IsolationLevel::Serializable));
        assert_eq!(transfer.retry.max_attempts, RetryPolicy::default().max_attempts);
        assert_eq!(transfer.timeout, None);
    }
}
