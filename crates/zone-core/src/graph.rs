//! Import graph management using `petgraph`.
//!
//! Nodes are namespaces, edges point from an importing namespace to each
//! namespace it imports. The graph answers whether a chain of imports leads
//! back to a namespace, which is how import cycles are detected.

use std::collections::HashMap;

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::tree::{NamespaceId, Tree};

/// Directed graph of namespace imports.
#[derive(Debug, Default)]
pub(crate) struct ImportGraph {
    graph: DiGraph<NamespaceId, ()>,
    nodes: HashMap<NamespaceId, NodeIndex>,
}

impl ImportGraph {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// Builds the graph from every namespace's configured imports. Imports
    /// naming a namespace that does not exist yet are skipped.
    pub(crate) fn build(tree: &Tree) -> Self {
        let mut graph = Self::empty();
        for (id, _) in tree.records() {
            let _ = graph.node(id);
        }
        for (id, record) in tree.records() {
            for import in record.imports.iter().flatten() {
                if let Some(target) = tree.find(import) {
                    let from = graph.node(id);
                    let to = graph.node(target);
                    let _ = graph.graph.update_edge(from, to, ());
                }
            }
        }
        graph
    }

    fn node(&mut self, id: NamespaceId) -> NodeIndex {
        *self
            .nodes
            .entry(id)
            .or_insert_with(|| self.graph.add_node(id))
    }

    /// Returns `true` if a chain of imports leads from `from` to `to`.
    pub(crate) fn reaches(&self, from: NamespaceId, to: NamespaceId) -> bool {
        match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    /// Every set of namespaces that import each other, including
    /// namespaces that import themselves.
    pub(crate) fn cycles(&self) -> Vec<Vec<NamespaceId>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| self.graph.find_edge(idx, idx).is_some())
            })
            .map(|component| {
                let mut ids: Vec<NamespaceId> = component
                    .iter()
                    .filter_map(|&idx| self.graph.node_weight(idx).copied())
                    .collect();
                ids.sort();
                ids
            })
            .collect()
    }
}
