//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger and reporting configuration.
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

/// Ledger configuration: base currency, store limits, live cache, operators.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Base currency every amount is normalized to.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Maximum number of ids per "fetch by id list" query.
    #[serde(default = "default_id_chunk_size")]
    pub id_chunk_size: usize,
    /// Time-to-live of memoized live reports.
    #[serde(default = "default_live_cache_ttl")]
    pub live_cache_ttl_secs: u64,
    /// Maximum number of memoized live reports.
    #[serde(default = "default_live_cache_capacity")]
    pub live_cache_capacity: u64,
    /// Operator registry (drives the `allow_net` commission formula).
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            id_chunk_size: default_id_chunk_size(),
            live_cache_ttl_secs: default_live_cache_ttl(),
            live_cache_capacity: default_live_cache_capacity(),
            operators: Vec::new(),
        }
    }
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_id_chunk_size() -> usize {
    10
}

fn default_live_cache_ttl() -> u64 {
    60
}

fn default_live_cache_capacity() -> u64 {
    64
}

/// A tour operator known to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperatorConfig {
    /// Operator name as written on bookings.
    pub name: String,
    /// Whether the operator sells at net (commission = margin x share).
    #[serde(default)]
    pub allow_net: bool,
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
            .add_source(config::Environment::with_prefix("TOURBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("TOURBOOK__DATABASE__URL", Some("postgres://localhost/tourbook")),
                ("TOURBOOK__SERVER__PORT", Some("9090")),
                ("TOURBOOK__LEDGER__ID_CHUNK_SIZE", Some("5")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/tourbook");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.ledger.id_chunk_size, 5);
                assert_eq!(config.ledger.base_currency, "EUR");
            },
        );
    }

    #[test]
    fn test_ledger_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.id_chunk_size, 10);
        assert_eq!(ledger.live_cache_ttl_secs, 60);
        assert!(ledger.operators.is_empty());
    }

    #[test]
    fn test_operator_allow_net_defaults_to_false() {
        let op: OperatorConfig = serde_json::from_str(r#"{"name":"Coral"}"#).unwrap();
        assert!(!op.allow_net);
    }
}
