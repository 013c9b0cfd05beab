//! The attribute resolver orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use fedid_cache::{CacheKey, CachedResult, InMemoryResultCache, ResultCache};
use fedid_model::{ResolutionContext, ResolverAttribute};
use fedid_spi::{
    AttributeDefinition, DataConnector, Dependencies, PluginRegistry, PluginSettings,
};

use crate::error::{ResolverError, ResolverResult};
use crate::graph::{Graph, Node, NodeKind};

/// Walks the plugin dependency graph to resolve attributes per request.
///
/// Plugin instances are created once at configuration load and shared by
/// all request tasks; per-request state lives in a private [`Dependencies`]
/// table discarded when the pass completes.
pub struct AttributeResolver {
    connectors: HashMap<String, Arc<dyn DataConnector>>,
    definitions: HashMap<String, Arc<dyn AttributeDefinition>>,
    graph: Graph,
    cache: Arc<dyn ResultCache>,
}

impl std::fmt::Debug for AttributeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeResolver")
            .field("connectors", &self.connectors.keys())
            .field("definitions", &self.definitions.keys())
            .finish_non_exhaustive()
    }
}

/// Builder assembling a resolver from plugin instances.
#[derive(Default)]
pub struct AttributeResolverBuilder {
    connectors: Vec<Box<dyn DataConnector>>,
    definitions: Vec<Box<dyn AttributeDefinition>>,
    cache: Option<Arc<dyn ResultCache>>,
}

impl AttributeResolverBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a data connector.
    #[must_use]
    pub fn connector(mut self, connector: Box<dyn DataConnector>) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Adds an attribute definition.
    #[must_use]
    pub fn definition(mut self, definition: Box<dyn AttributeDefinition>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Sets the result cache. Defaults to an in-memory cache.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Validates the dependency graph and builds the resolver.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on duplicate ids, dangling dependency
    /// or failover references, or dependency cycles.
    pub fn build(self) -> ResolverResult<AttributeResolver> {
        let graph = Graph::build(
            self.connectors.iter().map(|c| c.config()),
            self.definitions.iter().map(|d| d.config()),
        )?;

        let connectors = self
            .connectors
            .into_iter()
            .map(|c| (c.config().id().to_string(), Arc::from(c)))
            .collect();
        let definitions = self
            .definitions
            .into_iter()
            .map(|d| (d.config().id().to_string(), Arc::from(d)))
            .collect();

        Ok(AttributeResolver {
            connectors,
            definitions,
            graph,
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(InMemoryResultCache::new(10_000))),
        })
    }
}

/// Per-pass bookkeeping.
struct Pass {
    deps: Dependencies,
    /// Plugins whose failure propagated, with the reason. Dependents of a
    /// failed plugin are marked failed transitively without being invoked.
    failed: HashMap<String, String>,
}

impl AttributeResolver {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> AttributeResolverBuilder {
        AttributeResolverBuilder::new()
    }

    /// Builds a resolver from raw plugin settings via a registry.
    ///
    /// Settings naming a registered connector type become connectors,
    /// definition types become definitions; a type registered as neither
    /// is a configuration error.
    ///
    /// # Errors
    ///
    /// Returns factory configuration errors and graph validation errors.
    pub fn from_settings(
        registry: &PluginRegistry,
        settings: &[PluginSettings],
        cache: Arc<dyn ResultCache>,
    ) -> ResolverResult<Self> {
        let mut builder = Self::builder().cache(cache);
        for plugin in settings {
            if registry.has_connector_type(&plugin.type_name) {
                builder = builder.connector(registry.create_connector(plugin)?);
            } else if registry.has_definition_type(&plugin.type_name) {
                builder = builder.definition(registry.create_definition(plugin)?);
            } else {
                return Err(ResolverError::Configuration(format!(
                    "plugin {}: unknown type {}",
                    plugin.id, plugin.type_name
                )));
            }
        }
        builder.build()
    }

    /// Returns the ids of all configured attribute definitions.
    #[must_use]
    pub fn attribute_ids(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    /// Resolves the requested attributes for a principal.
    ///
    /// Attributes whose resolution chain failed are omitted from the
    /// result (the failure is logged); attributes that resolved with no
    /// values are included, marked resolved.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAttribute` when a requested id has no definition.
    pub async fn resolve(
        &self,
        ctx: &ResolutionContext,
        requested: &[String],
    ) -> ResolverResult<Vec<ResolverAttribute>> {
        let pass = self.run_pass(ctx, requested).await?;

        let mut resolved = Vec::with_capacity(requested.len());
        for id in requested {
            if let Some(reason) = pass.failed.get(id) {
                tracing::error!(
                    attribute = %id,
                    principal = %ctx.principal,
                    %reason,
                    "attribute omitted from resolution result"
                );
                continue;
            }
            if let Some(attr) = pass.deps.attribute_result(id) {
                resolved.push(attr.clone());
            }
        }
        Ok(resolved)
    }

    /// Resolves a single attribute, surfacing any propagated failure.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAttribute` for an unconfigured id, or the
    /// propagated plugin error for a failed chain.
    pub async fn resolve_attribute(
        &self,
        ctx: &ResolutionContext,
        id: &str,
    ) -> ResolverResult<ResolverAttribute> {
        let requested = vec![id.to_string()];
        let pass = self.run_pass(ctx, &requested).await?;

        if let Some(reason) = pass.failed.get(id) {
            return Err(ResolverError::Plugin(fedid_spi::SpiError::resolution(
                id,
                reason.clone(),
            )));
        }
        pass.deps
            .attribute_result(id)
            .cloned()
            .ok_or_else(|| ResolverError::UnknownAttribute(id.to_string()))
    }

    async fn run_pass(
        &self,
        ctx: &ResolutionContext,
        requested: &[String],
    ) -> ResolverResult<Pass> {
        let order = self.graph.closure_order(requested)?;
        let mut pass = Pass {
            deps: Dependencies::new(),
            failed: HashMap::new(),
        };

        for node in &order {
            if node.on_demand {
                continue;
            }
            if let Some(failed_dep) = self.failed_dependency(node, &pass) {
                pass.failed.insert(
                    node.id.clone(),
                    format!("dependency {failed_dep} failed"),
                );
                continue;
            }
            match node.kind {
                NodeKind::Connector => self.run_connector(&node.id, ctx, &mut pass).await?,
                NodeKind::Definition => self.run_definition(&node.id, ctx, &mut pass).await?,
            }
        }

        Ok(pass)
    }

    fn failed_dependency(&self, node: &Node, pass: &Pass) -> Option<String> {
        let config = match node.kind {
            NodeKind::Connector => self.connectors[&node.id].config(),
            NodeKind::Definition => self.definitions[&node.id].config(),
        };
        config
            .all_dependencies()
            .find(|dep| pass.failed.contains_key(*dep))
            .map(str::to_string)
    }

    async fn run_connector(
        &self,
        id: &str,
        ctx: &ResolutionContext,
        pass: &mut Pass,
    ) -> ResolverResult<()> {
        if pass.deps.has_connector_result(id) {
            return Ok(());
        }
        let connector = &self.connectors[id];
        let config = connector.config();

        let key = CacheKey::new(id, &ctx.principal, ctx.requester());
        if !config.cache_ttl().is_zero() {
            if let Some(CachedResult::Connector(set)) = self.cache.get(&key).await? {
                tracing::debug!(connector = %id, "serving connector result from cache");
                pass.deps.insert_connector_result(id, set);
                return Ok(());
            }
        }

        match connector.resolve(ctx, &pass.deps).await {
            Ok(set) => {
                if !config.cache_ttl().is_zero() {
                    self.cache
                        .put(key, CachedResult::Connector(set.clone()), config.cache_ttl())
                        .await?;
                }
                pass.deps.insert_connector_result(id, set);
            }
            Err(e) if config.propagate_errors() => {
                pass.failed.insert(id.to_string(), e.to_string());
            }
            Err(e) => {
                tracing::warn!(connector = %id, error = %e, "connector failed, error suppressed");
                self.run_failover(connector.config().failover(), id, ctx, pass)
                    .await?;
            }
        }
        Ok(())
    }

    /// Resolves the failover connector, recording its result under the
    /// primary's id so dependents see it transparently. Failover targets
    /// do not chain to their own failovers.
    async fn run_failover(
        &self,
        failover: Option<&str>,
        primary: &str,
        ctx: &ResolutionContext,
        pass: &mut Pass,
    ) -> ResolverResult<()> {
        let Some(failover_id) = failover else {
            return Ok(());
        };
        let connector = &self.connectors[failover_id];
        let config = connector.config();

        tracing::info!(primary = %primary, failover = %failover_id, "invoking failover connector");

        let key = CacheKey::new(failover_id, &ctx.principal, ctx.requester());
        if !config.cache_ttl().is_zero() {
            if let Some(CachedResult::Connector(set)) = self.cache.get(&key).await? {
                pass.deps.insert_connector_result(primary, set);
                return Ok(());
            }
        }

        match connector.resolve(ctx, &pass.deps).await {
            Ok(set) => {
                if !config.cache_ttl().is_zero() {
                    self.cache
                        .put(key, CachedResult::Connector(set.clone()), config.cache_ttl())
                        .await?;
                }
                pass.deps.insert_connector_result(primary, set);
            }
            Err(e) => {
                tracing::warn!(
                    primary = %primary,
                    failover = %failover_id,
                    error = %e,
                    "failover connector also failed"
                );
            }
        }
        Ok(())
    }

    async fn run_definition(
        &self,
        id: &str,
        ctx: &ResolutionContext,
        pass: &mut Pass,
    ) -> ResolverResult<()> {
        if pass.deps.has_attribute_result(id) {
            return Ok(());
        }
        let definition = &self.definitions[id];
        let config = definition.config();

        let key = CacheKey::new(id, &ctx.principal, ctx.requester());
        if !config.cache_ttl().is_zero() {
            if let Some(CachedResult::Attribute(attr)) = self.cache.get(&key).await? {
                tracing::debug!(attribute = %id, "serving attribute from cache");
                pass.deps.insert_attribute_result(attr);
                return Ok(());
            }
        }

        let mut attribute = ResolverAttribute::new(id);
        attribute.set_lifetime(config.cache_ttl());

        match definition.resolve(&mut attribute, ctx, &pass.deps) {
            Ok(()) => {
                attribute.mark_resolved();
                if !config.cache_ttl().is_zero() {
                    self.cache
                        .put(
                            key,
                            CachedResult::Attribute(attribute.clone()),
                            config.cache_ttl(),
                        )
                        .await?;
                }
                pass.deps.insert_attribute_result(attribute);
            }
            Err(e) if config.propagate_errors() => {
                pass.failed.insert(id.to_string(), e.to_string());
            }
            Err(e) => {
                // Keep whatever values were gathered before the failure.
                tracing::warn!(attribute = %id, error = %e, "definition failed, error suppressed");
                attribute.mark_resolved();
                pass.deps.insert_attribute_result(attribute);
            }
        }
        Ok(())
    }
}
