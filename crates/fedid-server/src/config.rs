//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults; only the resolver topology path is required.

use fedid_core::config::{CacheConfig, IssuerConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,

    /// Issuer settings used when building assertions.
    pub issuer: IssuerConfig,

    /// Result cache settings.
    pub cache: CacheConfig,

    /// Path to the resolver topology TOML document.
    pub topology_path: String,

    /// Log filter (RUST_LOG syntax).
    pub log_filter: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when `FEDID_TOPOLOGY` is unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let host = std::env::var("FEDID_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("FEDID_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8443);

        let entity_id = std::env::var("FEDID_ENTITY_ID")
            .unwrap_or_else(|_| format!("https://{host}:{port}/idp"));

        let topology_path = std::env::var("FEDID_TOPOLOGY")
            .map_err(|_| anyhow::anyhow!("FEDID_TOPOLOGY environment variable is required"))?;

        let assertion_lifetime_secs = std::env::var("FEDID_ASSERTION_LIFETIME_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let default_scope = std::env::var("FEDID_DEFAULT_SCOPE").ok();

        let max_entries = std::env::var("FEDID_CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            host,
            port,
            issuer: IssuerConfig {
                entity_id,
                assertion_lifetime_secs,
                default_scope,
            },
            cache: CacheConfig { max_entries },
            topology_path,
            log_filter,
        })
    }
}
