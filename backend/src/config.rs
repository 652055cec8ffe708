//! Configuration management for the Stockroom server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKROOM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Inventory health configuration
    pub inventory: InventoryConfig,

    /// CSV import configuration
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,

    /// Upper bound for statements and lock waits inside a movement transaction
    pub transaction_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Idle days after which a balance is reported as DEAD
    pub dead_days_threshold: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Largest accepted CSV upload in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKROOM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 4000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 10)?
            .set_default("database.transaction_timeout_ms", 5000)?
            .set_default(
                "inventory.dead_days_threshold",
                shared::DEFAULT_DEAD_DAYS,
            )?
            .set_default("import.max_upload_bytes", 1024 * 1024)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKROOM_ prefix)
            .add_source(
                Environment::with_prefix("STOCKROOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory.dead_days_threshold <= 0 {
            return Err(ConfigError::Message(
                "inventory.dead_days_threshold must be a positive integer".into(),
            ));
        }
        if self.database.transaction_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "database.transaction_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            environment: "test".to_string(),
            server: ServerConfig {
                port: 4000,
                host: "127.0.0.1".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/stockroom_test".to_string(),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout_secs: 10,
                transaction_timeout_ms: 5000,
            },
            inventory: InventoryConfig {
                dead_days_threshold: 60,
            },
            import: ImportConfig {
                max_upload_bytes: 1024 * 1024,
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_dead_days() {
        let mut config = config();
        config.inventory.dead_days_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_transaction_timeout() {
        let mut config = config();
        config.database.transaction_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
