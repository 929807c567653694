//! Configuration management for the Quote Builder server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with QB_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Record store (Airtable) configuration
    pub airtable: AirtableConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AirtableConfig {
    /// Personal access token
    pub api_key: String,

    /// Base holding the quote tables
    pub base_id: String,

    /// REST endpoint root
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    #[serde(default)]
    pub tables: TableConfig,
}

/// Table ids or names inside the base
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub quotes: String,
    pub options: String,
    pub opportunities: String,
    pub products: String,
    pub packages: String,
    pub catalogs: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            quotes: "tbl9d2UhyRrNVjGxW".to_string(),
            options: "tblkRYwCcYfEG6iAO".to_string(),
            opportunities: "tbl4fGlUM8KCbCS0R".to_string(),
            products: "tbluPDR4eOtWC8D9J".to_string(),
            packages: "מארזים".to_string(),
            catalogs: "קטלוגים".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("QB_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("airtable.base_url", "https://api.airtable.com/v0")?
            .set_default("airtable.timeout_secs", 15)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (QB_ prefix)
            .add_source(
                Environment::with_prefix("QB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let tables = TableConfig::default();
        assert_eq!(tables.quotes, "tbl9d2UhyRrNVjGxW");
        assert_eq!(tables.packages, "מארזים");
    }

    #[test]
    fn test_tables_partial_override() {
        let tables: TableConfig =
            serde_json::from_str(r#"{ "quotes": "tblTestQuotes0001" }"#).unwrap();
        assert_eq!(tables.quotes, "tblTestQuotes0001");
        assert_eq!(tables.options, TableConfig::default().options);
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            airtable: AirtableConfig {
                api_key: "key".to_string(),
                base_id: "appTest".to_string(),
                base_url: "https://api.airtable.com/v0".to_string(),
                timeout_secs: 15,
                tables: TableConfig::default(),
            },
        };
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }
}
