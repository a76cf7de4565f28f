//! Validates manifests and reports what applying them would register.
//!
//! Wraps `zone-compose`'s validator and alias graph into a high-level API
//! for SDK consumers and the CLI.

use std::path::Path;

use serde::Serialize;
use zone_common::error::Result;
use zone_common::names::split_access;
use zone_common::types::{AccessLevel, full_name};
use zone_compose::Manifest;
use zone_compose::graph::AliasGraph;
use zone_compose::manifest::BindingKind;
use zone_compose::validator::validate;

/// A binding a manifest would register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBinding {
    /// Full dotted name.
    pub name: String,
    /// Value, constant or alias.
    pub kind: BindingKind,
    /// Visibility from the name's sigil.
    pub access: AccessLevel,
    /// Dependency an alias refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// A namespace entry of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedNamespace {
    /// Dotted path; empty for the root.
    pub path: String,
    /// Imports the entry configures, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,
    /// Bindings declared in the entry.
    pub bindings: Vec<PlannedBinding>,
}

/// Report produced by [`ManifestPlanner::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Namespace entries in manifest order.
    pub namespaces: Vec<PlannedNamespace>,
    /// Every binding, dependencies before the aliases that use them.
    pub order: Vec<String>,
}

/// High-level planner for binding manifests.
#[derive(Debug, Default)]
pub struct ManifestPlanner {
    manifest: Manifest,
    graph: AliasGraph,
}

impl ManifestPlanner {
    /// Creates a planner holding an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, parsing or validation fails.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_manifest(Manifest::load(path)?)
    }

    /// Validates an already parsed manifest.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn from_manifest(manifest: Manifest) -> Result<Self> {
        validate(&manifest)?;
        let graph = AliasGraph::from_manifest(&manifest);
        Ok(Self { manifest, graph })
    }

    /// The validated manifest.
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Returns the order in which bindings resolve, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns an error if aliases form a cycle.
    pub fn resolution_order(&self) -> Result<Vec<String>> {
        self.graph.resolve_order()
    }

    /// Builds the full report.
    ///
    /// # Errors
    ///
    /// Returns an error if aliases form a cycle.
    pub fn plan(&self) -> Result<Plan> {
        let namespaces = self
            .manifest
            .namespaces
            .iter()
            .map(|spec| PlannedNamespace {
                path: spec.path.clone(),
                imports: spec.imports.clone(),
                bindings: spec
                    .declared()
                    .map(|(kind, raw)| {
                        let (access, local) = split_access(raw);
                        PlannedBinding {
                            name: full_name(&spec.path, local),
                            kind,
                            access,
                            target: (kind == BindingKind::Alias)
                                .then(|| spec.aliases.get(raw).cloned())
                                .flatten(),
                        }
                    })
                    .collect(),
            })
            .collect();
        Ok(Plan {
            namespaces,
            order: self.resolution_order()?,
        })
    }
}
