//! Dependency graph validation and evaluation ordering.
//!
//! Built once from the loaded plugin set. Validation catches duplicate
//! ids, dangling dependency and failover references, and cycles; the
//! per-request walk then needs no runtime checks.

use std::collections::HashMap;

use fedid_spi::PluginConfig;

use crate::error::{ResolverError, ResolverResult};

/// Kind of plugin a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Connector,
    Definition,
}

/// A plugin reference in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub id: String,
    /// True when the node is reachable only as a failover target; the
    /// driver skips it unless a primary connector actually fails over.
    pub on_demand: bool,
}

#[derive(Debug)]
struct NodeInfo {
    kind: NodeKind,
    connector_deps: Vec<String>,
    attribute_deps: Vec<String>,
    failover: Option<String>,
}

/// Validated dependency graph over all configured plugins.
#[derive(Debug)]
pub(crate) struct Graph {
    nodes: HashMap<String, NodeInfo>,
}

impl Graph {
    /// Builds and validates the graph.
    pub(crate) fn build<'a>(
        connectors: impl Iterator<Item = &'a PluginConfig>,
        definitions: impl Iterator<Item = &'a PluginConfig>,
    ) -> ResolverResult<Self> {
        let mut nodes = HashMap::new();

        for (kind, config) in connectors
            .map(|c| (NodeKind::Connector, c))
            .chain(definitions.map(|d| (NodeKind::Definition, d)))
        {
            let info = NodeInfo {
                kind,
                connector_deps: config.connector_dependencies().to_vec(),
                attribute_deps: config.attribute_dependencies().to_vec(),
                failover: config.failover().map(str::to_string),
            };
            if nodes.insert(config.id().to_string(), info).is_some() {
                return Err(ResolverError::Configuration(format!(
                    "duplicate plugin id: {}",
                    config.id()
                )));
            }
        }

        let graph = Self { nodes };
        graph.validate_references()?;
        graph.validate_acyclic()?;
        Ok(graph)
    }

    fn validate_references(&self) -> ResolverResult<()> {
        for (id, info) in &self.nodes {
            for dep in &info.connector_deps {
                match self.nodes.get(dep) {
                    Some(node) if node.kind == NodeKind::Connector => {}
                    _ => {
                        return Err(ResolverError::Configuration(format!(
                            "plugin {id} depends on unknown connector {dep}"
                        )))
                    }
                }
            }
            for dep in &info.attribute_deps {
                match self.nodes.get(dep) {
                    Some(node) if node.kind == NodeKind::Definition => {}
                    _ => {
                        return Err(ResolverError::Configuration(format!(
                            "plugin {id} depends on unknown attribute {dep}"
                        )))
                    }
                }
            }
            if let Some(failover) = &info.failover {
                if failover == id {
                    return Err(ResolverError::Configuration(format!(
                        "connector {id} names itself as failover"
                    )));
                }
                match self.nodes.get(failover) {
                    Some(node) if node.kind == NodeKind::Connector => {}
                    _ => {
                        return Err(ResolverError::Configuration(format!(
                            "connector {id} names unknown failover connector {failover}"
                        )))
                    }
                }
                if info.kind != NodeKind::Connector {
                    return Err(ResolverError::Configuration(format!(
                        "plugin {id} declares a failover but is not a connector"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Depth-first cycle detection over dependency and failover edges.
    fn validate_acyclic(&self) -> ResolverResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            graph: &Graph,
            id: &str,
            marks: &mut HashMap<String, Mark>,
        ) -> ResolverResult<()> {
            match marks.get(id) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(ResolverError::Configuration(format!(
                        "dependency cycle involving plugin {id}"
                    )))
                }
                None => {}
            }
            marks.insert(id.to_string(), Mark::Visiting);

            let info = &graph.nodes[id];
            for dep in graph.edges(info) {
                visit(graph, &dep, marks)?;
            }

            marks.insert(id.to_string(), Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        for id in self.nodes.keys() {
            visit(self, id, &mut marks)?;
        }
        Ok(())
    }

    fn edges(&self, info: &NodeInfo) -> Vec<String> {
        info.connector_deps
            .iter()
            .chain(&info.attribute_deps)
            .chain(&info.failover)
            .cloned()
            .collect()
    }

    /// Returns whether `id` names a definition node.
    pub(crate) fn is_definition(&self, id: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.kind == NodeKind::Definition)
    }

    /// Computes the postorder evaluation closure of the requested
    /// definitions: every plugin each one transitively depends on, each
    /// appearing once, dependencies before dependents. Failover targets
    /// (and their dependencies) are included but flagged `on_demand`
    /// unless some non-failover path also requires them.
    pub(crate) fn closure_order(&self, requested: &[String]) -> ResolverResult<Vec<Node>> {
        for id in requested {
            if !self.is_definition(id) {
                return Err(ResolverError::UnknownAttribute(id.clone()));
            }
        }

        // Emission order plus whether each emitted node was ever reached
        // through a required (non-failover) edge.
        let mut order: Vec<(String, bool)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        fn visit(
            graph: &Graph,
            id: &str,
            required: bool,
            order: &mut Vec<(String, bool)>,
            index: &mut HashMap<String, usize>,
        ) {
            if let Some(&i) = index.get(id) {
                if required && !order[i].1 {
                    order[i].1 = true;
                    // Re-walk dependencies so they get promoted too.
                    let info = &graph.nodes[id];
                    let deps: Vec<String> = info
                        .connector_deps
                        .iter()
                        .chain(&info.attribute_deps)
                        .cloned()
                        .collect();
                    for dep in deps {
                        visit(graph, &dep, true, order, index);
                    }
                }
                return;
            }

            let info = &graph.nodes[id];
            for dep in info.connector_deps.iter().chain(&info.attribute_deps) {
                visit(graph, dep, required, order, index);
            }
            if let Some(failover) = &info.failover {
                visit(graph, failover, false, order, index);
            }

            index.insert(id.to_string(), order.len());
            order.push((id.to_string(), required));
        }

        for id in requested {
            visit(self, id, true, &mut order, &mut index);
        }

        Ok(order
            .into_iter()
            .map(|(id, required)| Node {
                kind: self.nodes[&id].kind,
                id,
                on_demand: !required,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedid_spi::{PluginConfig, PluginSettings};

    fn config(settings: PluginSettings) -> PluginConfig {
        PluginConfig::from_settings(&settings).unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a = config(PluginSettings::new("dup", "static"));
        let b = config(PluginSettings::new("dup", "simple"));
        let result = Graph::build([&a].into_iter(), [&b].into_iter());
        assert!(matches!(result, Err(ResolverError::Configuration(_))));
    }

    #[test]
    fn dangling_dependency_is_rejected() {
        let def = config(PluginSettings::new("mail", "simple").with_connector_dependency("nope"));
        let result = Graph::build(std::iter::empty(), [&def].into_iter());
        assert!(matches!(result, Err(ResolverError::Configuration(_))));
    }

    #[test]
    fn cycle_is_rejected() {
        let a = config(PluginSettings::new("a", "simple").with_attribute_dependency("b"));
        let b = config(PluginSettings::new("b", "simple").with_attribute_dependency("a"));
        let result = Graph::build(std::iter::empty(), [&a, &b].into_iter());
        assert!(matches!(result, Err(ResolverError::Configuration(_))));
    }

    #[test]
    fn closure_order_puts_dependencies_first() {
        let dir = config(PluginSettings::new("dir", "static"));
        let mail =
            config(PluginSettings::new("mail", "simple").with_connector_dependency("dir"));
        let display = config(
            PluginSettings::new("display", "simple")
                .with_connector_dependency("dir")
                .with_attribute_dependency("mail"),
        );

        let graph = Graph::build([&dir].into_iter(), [&mail, &display].into_iter()).unwrap();
        let order = graph.closure_order(&["display".to_string()]).unwrap();
        let ids: Vec<_> = order.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["dir", "mail", "display"]);
        assert!(order.iter().all(|n| !n.on_demand));
    }

    #[test]
    fn failover_targets_are_on_demand() {
        let backup = config(PluginSettings::new("backup", "static"));
        let primary =
            config(PluginSettings::new("primary", "static").with_failover("backup"));
        let mail =
            config(PluginSettings::new("mail", "simple").with_connector_dependency("primary"));

        let graph =
            Graph::build([&backup, &primary].into_iter(), [&mail].into_iter()).unwrap();
        let order = graph.closure_order(&["mail".to_string()]).unwrap();

        let backup_node = order.iter().find(|n| n.id == "backup").unwrap();
        assert!(backup_node.on_demand);
        let primary_node = order.iter().find(|n| n.id == "primary").unwrap();
        assert!(!primary_node.on_demand);
    }

    #[test]
    fn unknown_requested_attribute_is_rejected() {
        let graph = Graph::build(
            std::iter::empty::<&PluginConfig>(),
            std::iter::empty::<&PluginConfig>(),
        )
        .unwrap();
        let result = graph.closure_order(&["ghost".to_string()]);
        assert!(matches!(result, Err(ResolverError::UnknownAttribute(_))));
    }
}
