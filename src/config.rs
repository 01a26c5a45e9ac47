use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_SCAN_TXN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL.
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Runtime environment name (development, test, production).
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level filter used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Run migrations automatically at startup.
    #[serde(default)]
    pub auto_migrate: bool,

    /// Maximum number of database connections.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum number of database connections.
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Bound on a scan/receive transaction before it is aborted.
    #[serde(default = "default_scan_txn_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub scan_txn_timeout_secs: u64,

    /// Capacity of the domain event channel.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_scan_txn_timeout_secs() -> u64 {
    DEFAULT_SCAN_TXN_TIMEOUT_SECS
}
fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

impl AppConfig {
    /// Constructs a configuration directly, primarily for tests.
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            host: default_host(),
            port: default_port(),
            environment,
            log_level: default_log_level(),
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            scan_txn_timeout_secs: default_scan_txn_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Loads configuration from layered files and `APP_*` environment
    /// variables, then validates it.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());
        info!(environment = %environment, "loading configuration");

        let mut builder = Config::builder();
        let default_path = Path::new(CONFIG_DIR).join("default.toml");
        if default_path.exists() {
            builder = builder.add_source(File::from(default_path));
        }
        let env_path = Path::new(CONFIG_DIR).join(format!("{}.toml", environment));
        if env_path.exists() {
            builder = builder.add_source(File::from(env_path));
        }
        builder = builder.add_source(Environment::with_prefix("APP").separator("__"));

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;
        Ok(config)
    }

    pub fn scan_txn_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.scan_txn_timeout_secs)
    }
}
