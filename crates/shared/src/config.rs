//! Application configuration management.

use serde::Deserialize;

use crate::types::Direction;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Backoff growth between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// `base * attempt`.
    #[default]
    Linear,
    /// `base * 2^(attempt - 1)`.
    Exponential,
}

/// One row of the operation type table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperationTypeConfig {
    /// Operation type ID as sent by clients.
    pub id: i32,
    /// Human readable name.
    pub description: String,
    /// Required sign of amounts for this type.
    pub direction: Direction,
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Attempts per transaction, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// How the delay grows between attempts.
    #[serde(default)]
    pub backoff: BackoffKind,
    /// Delay unit for the backoff, in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Number of parallel writes fired by the concurrent endpoint.
    #[serde(default = "default_fan_out_count")]
    pub fan_out_count: usize,
    /// Upper bound of the random delay before each parallel write starts.
    #[serde(default = "default_fan_out_max_jitter_ms")]
    pub fan_out_max_jitter_ms: u64,
    /// Known operation types and their directions.
    #[serde(default = "default_operation_types")]
    pub operation_types: Vec<OperationTypeConfig>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff: BackoffKind::default(),
            backoff_base_ms: default_backoff_base_ms(),
            fan_out_count: default_fan_out_count(),
            fan_out_max_jitter_ms: default_fan_out_max_jitter_ms(),
            operation_types: default_operation_types(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_fan_out_count() -> usize {
    10
}

fn default_fan_out_max_jitter_ms() -> u64 {
    100
}

/// The standard operation type table.
#[must_use]
pub fn default_operation_types() -> Vec<OperationTypeConfig> {
    [
        (1, "Normal Purchase", Direction::Debit),
        (2, "Purchase with installments", Direction::Debit),
        (3, "Withdrawal", Direction::Debit),
        (4, "Credit Voucher", Direction::Credit),
    ]
    .into_iter()
    .map(|(id, description, direction)| OperationTypeConfig {
        id,
        description: description.to_string(),
        direction,
    })
    .collect()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
