//! Alias dependency graph using `petgraph`.
//!
//! Every binding a manifest declares is a node. Each alias gets an edge
//! from the binding it refers to, located statically by the same rules the
//! engine uses: the alias's own namespace, its imports, then its ancestors.
//! Topological order therefore yields dependencies first.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use zone_common::error::{Result, ZoneError};
use zone_common::names::{DependencyName, SigilPolicy, split_access};
use zone_common::types::{AccessLevel, NamePath, full_name};

use crate::manifest::Manifest;

/// Dependency graph of the bindings declared in a manifest.
#[derive(Debug, Default)]
pub struct AliasGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl AliasGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of a manifest. Alias targets that cannot be located
    /// in the manifest (optional misses, bindings registered elsewhere) add
    /// no edge.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut graph = Self::new();
        for spec in &manifest.namespaces {
            for (_, raw) in spec.declared() {
                let _ = graph.add_binding(full_name(&spec.path, split_access(raw).1));
            }
        }
        for spec in &manifest.namespaces {
            for (raw, dependency) in &spec.aliases {
                let Ok(dependency) = DependencyName::parse(dependency, SigilPolicy::DEFINITION)
                else {
                    continue;
                };
                if let Some(target) = locate(manifest, &spec.path, &dependency.name) {
                    let alias = graph.add_binding(full_name(&spec.path, split_access(raw).1));
                    let target = graph.add_binding(target);
                    graph.add_dependency(alias, target);
                }
            }
        }
        graph
    }

    /// Adds a binding node, or returns the existing one.
    pub fn add_binding(&mut self, name: impl Into<String>) -> NodeIndex {
        let name = name.into();
        if let Some(&idx) = self.nodes.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(name.clone());
        let _ = self.nodes.insert(name, idx);
        idx
    }

    /// Records that `dependent` yields the value of `dependency`.
    ///
    /// The edge points from `dependency` to `dependent` so that
    /// topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependency, dependent, ());
    }

    /// Number of bindings in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph holds no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the bindings in resolution order, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::CyclicDependency`] naming a binding on the cycle
    /// if aliases refer to each other in a loop.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => Err(ZoneError::CyclicDependency {
                name: self
                    .graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_default(),
            }),
        }
    }
}

/// Finds the full name of the binding `name` refers to when looked up from
/// namespace `start` of the manifest.
pub(crate) fn locate(manifest: &Manifest, start: &str, name: &str) -> Option<String> {
    let path = NamePath::parse(name);
    let (mut current, mut access) = match path.namespace {
        None => (Some(start), AccessLevel::Private),
        Some(target) => (Some(target), access_between(start, target)),
    };
    while let Some(namespace) = current {
        if let Some(found) = visible(manifest, namespace, path.local, access) {
            return Some(found);
        }
        let imports = manifest
            .namespace(namespace)
            .and_then(|spec| spec.imports.as_deref())
            .unwrap_or_default();
        for import in imports {
            if let Some(found) = visible(manifest, import, path.local, AccessLevel::Public) {
                return Some(found);
            }
        }
        access = AccessLevel::Protected;
        current = parent_path(namespace);
    }
    None
}

fn visible(manifest: &Manifest, namespace: &str, local: &str, access: AccessLevel) -> Option<String> {
    manifest
        .binding(namespace, local)
        .filter(|(_, raw)| split_access(raw).0 <= access)
        .map(|_| full_name(namespace, local))
}

/// Access level namespace `source` is entitled to in namespace `target`.
pub(crate) fn access_between(source: &str, target: &str) -> AccessLevel {
    if source == target {
        AccessLevel::Private
    } else if target.is_empty()
        || source
            .strip_prefix(target)
            .is_some_and(|rest| rest.starts_with('.'))
    {
        AccessLevel::Protected
    } else {
        AccessLevel::Public
    }
}

/// Dotted path of the enclosing namespace, or `None` for the root.
pub(crate) fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rfind('.').map_or("", |idx| &path[..idx]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(yaml: &str) -> Manifest {
        Manifest::from_yaml(yaml).expect("manifest")
    }

    #[test]
    fn empty_graph_resolves_to_empty() {
        let graph = AliasGraph::new();
        assert!(graph.is_empty());
        assert!(graph.resolve_order().expect("should resolve").is_empty());
    }

    #[test]
    fn alias_chain_resolves_dependencies_first() {
        let graph = AliasGraph::from_manifest(&manifest(
            "namespaces:\n  - path: a\n    values: { base: 1 }\n    aliases: { mid: base, top: mid }\n",
        ));
        assert_eq!(graph.len(), 3);
        let order = graph.resolve_order().expect("should resolve");
        let pos = |name: &str| order.iter().position(|n| n == name).expect(name);
        assert!(pos("a.base") < pos("a.mid"));
        assert!(pos("a.mid") < pos("a.top"));
    }

    #[test]
    fn aliases_locate_through_imports_and_parents() {
        let m = manifest(
            r##"
namespaces:
  - path: ""
    values: { "#shared": 1, "-hidden": 2 }
  - path: lib
    values: { api: 3, "-internal": 4 }
  - path: app.web
    imports: [lib]
"##,
        );
        assert_eq!(locate(&m, "app.web", "api").as_deref(), Some("lib.api"));
        assert_eq!(locate(&m, "app.web", "shared").as_deref(), Some("shared"));
        assert_eq!(locate(&m, "app.web", "internal"), None);
        assert_eq!(locate(&m, "app.web", "hidden"), None);
        assert_eq!(locate(&m, "app.web", "lib.api").as_deref(), Some("lib.api"));
        assert_eq!(locate(&m, "app.web", "lib.internal"), None);
    }

    #[test]
    fn alias_cycle_is_detected() {
        let graph = AliasGraph::from_manifest(&manifest(
            "namespaces:\n  - path: a\n    aliases: { x: y, y: x }\n",
        ));
        let err = graph.resolve_order().expect_err("cycle");
        assert!(err.is_cyclic());
    }

    #[test]
    fn self_alias_is_a_cycle() {
        let graph = AliasGraph::from_manifest(&manifest(
            "namespaces:\n  - path: a\n    aliases: { x: x }\n",
        ));
        assert!(graph.resolve_order().is_err());
    }

    #[test]
    fn unresolved_optional_alias_adds_no_edge() {
        let graph = AliasGraph::from_manifest(&manifest(
            "namespaces:\n  - path: a\n    aliases: { x: \"?nowhere.y\" }\n",
        ));
        assert_eq!(graph.resolve_order().expect("no cycle"), vec!["a.x"]);
    }

    #[test]
    fn access_between_paths() {
        assert_eq!(access_between("a", "a"), AccessLevel::Private);
        assert_eq!(access_between("a.b", "a"), AccessLevel::Protected);
        assert_eq!(access_between("a.b", ""), AccessLevel::Protected);
        assert_eq!(access_between("ab", "a"), AccessLevel::Public);
        assert_eq!(access_between("a", "a.b"), AccessLevel::Public);
    }

    #[test]
    fn parent_paths() {
        assert_eq!(parent_path("a.b.c"), Some("a.b"));
        assert_eq!(parent_path("a"), Some(""));
        assert_eq!(parent_path(""), None);
    }
}
