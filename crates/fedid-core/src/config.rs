//! Configuration management for fedid.
//!
//! Supports loading configuration from environment variables and files.

use serde::{Deserialize, Serialize};

/// Main configuration structure for the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Issuer (identity provider) configuration.
    pub issuer: IssuerConfig,
    /// Result cache configuration.
    pub cache: CacheConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Base URL for the server.
    pub base_url: String,
}

/// Issuer configuration used when building SAML assertions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Entity ID of this identity provider.
    pub entity_id: String,
    /// Assertion validity window in seconds.
    pub assertion_lifetime_secs: i64,
    /// Default scope appended to scoped attribute values.
    pub default_scope: Option<String>,
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached plugin results before inserts evict
    /// expired entries eagerly.
    pub max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8443,
                base_url: "http://localhost:8443".to_string(),
            },
            issuer: IssuerConfig {
                entity_id: "https://idp.example.edu/idp".to_string(),
                assertion_lifetime_secs: 300,
                default_scope: None,
            },
            cache: CacheConfig { max_entries: 10_000 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_bounded_assertion_lifetime() {
        let config = Config::default();

        // Short-lived assertions limit replay exposure.
        assert!(config.issuer.assertion_lifetime_secs <= 600);
        assert!(config.issuer.assertion_lifetime_secs > 0);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.server.port, config.server.port);
        assert_eq!(restored.issuer.entity_id, config.issuer.entity_id);
    }
}
