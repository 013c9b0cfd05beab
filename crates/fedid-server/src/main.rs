//! fedid server entry point.

#![forbid(unsafe_code)]
#![deny(warnings)]

use std::sync::Arc;

use fedid_cache::InMemoryResultCache;
use fedid_connector_ldap::register_ldap_connector;
use fedid_connector_sql::register_sql_connector;
use fedid_resolver::{register_builtin_plugins, AttributeResolver};
use fedid_server::{create_router, load_topology, AppState, ServerConfig};
use fedid_spi::PluginRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_filter.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(entity_id = %config.issuer.entity_id, "fedid starting");

    let registry = PluginRegistry::new();
    register_builtin_plugins(&registry);
    register_sql_connector(&registry);
    register_ldap_connector(&registry);

    let plugins = load_topology(&config.topology_path)?;
    let cache = Arc::new(InMemoryResultCache::new(config.cache.max_entries));
    let resolver = AttributeResolver::from_settings(&registry, &plugins, cache)
        .map_err(|e| anyhow::anyhow!("resolver configuration rejected: {e}"))?;

    tracing::info!(
        attributes = resolver.attribute_ids().len(),
        "resolver configuration loaded"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    let state = AppState::new(config, Arc::new(resolver));
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
