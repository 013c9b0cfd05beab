//! End-to-end resolution flow tests: graph walking, caching, error
//! propagation, and connector failover.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use fedid_cache::InMemoryResultCache;
use fedid_model::{AttributeSet, ResolutionContext};
use fedid_resolver::connectors::StaticOptions;
use fedid_resolver::definitions::{MappedOptions, SimpleOptions, ValueMapEntry};
use fedid_resolver::{register_builtin_plugins, AttributeResolver, ResolverError};
use fedid_spi::{
    DataConnector, Dependencies, PluginConfig, PluginRegistry, PluginSettings, SpiError,
    SpiResult,
};

/// Connector that fails every resolve call.
#[derive(Debug)]
struct FailingConnector {
    config: PluginConfig,
}

#[async_trait]
impl DataConnector for FailingConnector {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    async fn resolve(
        &self,
        _ctx: &ResolutionContext,
        _deps: &Dependencies,
    ) -> SpiResult<AttributeSet> {
        Err(SpiError::resolution(self.config.id(), "source unavailable"))
    }
}

/// Connector that counts invocations and serves one fixed attribute.
#[derive(Debug)]
struct CountingConnector {
    config: PluginConfig,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl DataConnector for CountingConnector {
    fn config(&self) -> &PluginConfig {
        &self.config
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        _deps: &Dependencies,
    ) -> SpiResult<AttributeSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut set = AttributeSet::new();
        set.add("uid", ctx.principal.as_str().into());
        Ok(set)
    }
}

fn registry() -> PluginRegistry {
    let registry = PluginRegistry::new();
    register_builtin_plugins(&registry);
    registry
}

fn static_settings(id: &str, attribute: &str, values: &[&str]) -> PluginSettings {
    let mut attributes = HashMap::new();
    attributes.insert(
        attribute.to_string(),
        values.iter().map(|v| (*v).to_string()).collect(),
    );
    PluginSettings::new(id, "static").with_options(&StaticOptions { attributes })
}

#[tokio::test]
async fn resolves_a_chain_of_definitions_over_a_connector() {
    let settings = vec![
        static_settings("dir", "affiliation", &["faculty", "visitor"]),
        PluginSettings::new("affiliation", "simple").with_connector_dependency("dir"),
        PluginSettings::new("eduPersonAffiliation", "mapped")
            .with_connector_dependency("dir")
            .with_options(&MappedOptions {
                source_name: Some("affiliation".to_string()),
                value_maps: vec![ValueMapEntry {
                    value: "member".to_string(),
                    keys: vec!["faculty".to_string(), "staff".to_string()],
                }],
                default_value: Some("&".to_string()),
                ..MappedOptions::default()
            }),
    ];

    let resolver = AttributeResolver::from_settings(
        &registry(),
        &settings,
        Arc::new(InMemoryResultCache::new(64)),
    )
    .unwrap();

    let ctx = ResolutionContext::new("jdoe").with_requester("https://sp.example.org");
    let resolved = resolver
        .resolve(
            &ctx,
            &["affiliation".to_string(), "eduPersonAffiliation".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(resolved.len(), 2);

    let affiliation = resolved.iter().find(|a| a.id() == "affiliation").unwrap();
    let values: Vec<_> = affiliation.values().iter().filter_map(|v| v.as_text()).collect();
    assert_eq!(values, ["faculty", "visitor"]);

    let mapped = resolved
        .iter()
        .find(|a| a.id() == "eduPersonAffiliation")
        .unwrap();
    let values: Vec<_> = mapped.values().iter().filter_map(|v| v.as_text()).collect();
    // "faculty" maps to member, "visitor" echoes through the default.
    assert_eq!(values, ["member", "visitor"]);
    assert!(mapped.is_resolved());
}

#[tokio::test]
async fn failover_connector_serves_dependents_of_the_primary() {
    let failing = PluginConfig::from_settings(
        &PluginSettings::new("primary", "failing")
            .with_propagate_errors(false)
            .with_failover("backup"),
    )
    .unwrap();

    let backup = static_settings("backup", "mail", &["%PRINCIPAL%@backup.example.edu"]);
    let registry = registry();

    let resolver = AttributeResolver::builder()
        .connector(Box::new(FailingConnector { config: failing }))
        .connector(registry.create_connector(&backup).unwrap())
        .definition(
            registry
                .create_definition(
                    &PluginSettings::new("mail", "simple").with_connector_dependency("primary"),
                )
                .unwrap(),
        )
        .build()
        .unwrap();

    let ctx = ResolutionContext::new("jdoe");
    let resolved = resolver.resolve(&ctx, &["mail".to_string()]).await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(
        resolved[0].values()[0].as_text(),
        Some("jdoe@backup.example.edu")
    );
}

#[tokio::test]
async fn propagated_connector_failure_omits_dependent_attributes() {
    let failing = PluginConfig::from_settings(
        // propagate_errors defaults to true
        &PluginSettings::new("primary", "failing"),
    )
    .unwrap();

    let registry = registry();
    let resolver = AttributeResolver::builder()
        .connector(Box::new(FailingConnector { config: failing }))
        .definition(
            registry
                .create_definition(
                    &PluginSettings::new("mail", "simple").with_connector_dependency("primary"),
                )
                .unwrap(),
        )
        .build()
        .unwrap();

    let ctx = ResolutionContext::new("jdoe");

    // The batch API omits the failed attribute.
    let resolved = resolver.resolve(&ctx, &["mail".to_string()]).await.unwrap();
    assert!(resolved.is_empty());

    // The single-attribute API surfaces the failure.
    let result = resolver.resolve_attribute(&ctx, "mail").await;
    assert!(matches!(result, Err(ResolverError::Plugin(_))));
}

#[tokio::test]
async fn suppressed_connector_failure_resolves_empty_attribute() {
    let failing = PluginConfig::from_settings(
        &PluginSettings::new("primary", "failing").with_propagate_errors(false),
    )
    .unwrap();

    let registry = registry();
    let resolver = AttributeResolver::builder()
        .connector(Box::new(FailingConnector { config: failing }))
        .definition(
            registry
                .create_definition(
                    &PluginSettings::new("mail", "simple").with_connector_dependency("primary"),
                )
                .unwrap(),
        )
        .build()
        .unwrap();

    let resolved = resolver
        .resolve(&ResolutionContext::new("jdoe"), &["mail".to_string()])
        .await
        .unwrap();

    // No failover configured: the attribute resolves with no values.
    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].values().is_empty());
    assert!(resolved[0].is_resolved());
}

#[tokio::test]
async fn cached_connector_result_skips_the_second_invocation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counting = CountingConnector {
        config: PluginConfig::from_settings(
            &PluginSettings::new("dir", "counting").with_cache_ttl(60),
        )
        .unwrap(),
        calls: calls.clone(),
    };

    let registry = registry();
    let resolver = AttributeResolver::builder()
        .connector(Box::new(counting))
        .definition(
            registry
                .create_definition(
                    &PluginSettings::new("uid", "simple").with_connector_dependency("dir"),
                )
                .unwrap(),
        )
        .cache(Arc::new(InMemoryResultCache::new(64)))
        .build()
        .unwrap();

    let ctx = ResolutionContext::new("jdoe");
    resolver.resolve(&ctx, &["uid".to_string()]).await.unwrap();
    resolver.resolve(&ctx, &["uid".to_string()]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A different principal misses the cache.
    resolver
        .resolve(&ResolutionContext::new("asmith"), &["uid".to_string()])
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn uncached_connector_is_invoked_every_pass() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counting = CountingConnector {
        // cache_ttl defaults to 0: never cache
        config: PluginConfig::from_settings(&PluginSettings::new("dir", "counting")).unwrap(),
        calls: calls.clone(),
    };

    let registry = registry();
    let resolver = AttributeResolver::builder()
        .connector(Box::new(counting))
        .definition(
            registry
                .create_definition(
                    &PluginSettings::new("uid", "simple").with_connector_dependency("dir"),
                )
                .unwrap(),
        )
        .build()
        .unwrap();

    let ctx = ResolutionContext::new("jdoe");
    resolver.resolve(&ctx, &["uid".to_string()]).await.unwrap();
    resolver.resolve(&ctx, &["uid".to_string()]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_requested_attribute_is_an_error() {
    let resolver = AttributeResolver::builder().build().unwrap();
    let result = resolver
        .resolve(&ResolutionContext::new("jdoe"), &["ghost".to_string()])
        .await;
    assert!(matches!(result, Err(ResolverError::UnknownAttribute(_))));
}

#[test]
fn smart_scope_survives_the_simple_definition_options() {
    // Guard against the options struct silently losing fields.
    let options = SimpleOptions {
        smart_scope: Some("example.edu".to_string()),
        ..SimpleOptions::default()
    };
    let json = serde_json::to_value(&options).unwrap();
    assert_eq!(json["smart_scope"], "example.edu");
}
