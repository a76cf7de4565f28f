//! Applying a manifest to a container.

use zone_common::error::Result;
use zone_core::{FunctionDescriptor, Instance, Zone};

use crate::manifest::Manifest;
use crate::validator::validate_against;

/// What [`apply`] registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Namespace entries applied.
    pub namespaces: usize,
    /// Bindings registered.
    pub bindings: usize,
}

/// Validates `manifest` against `zone`, then registers its namespaces,
/// imports and bindings.
///
/// Imports are configured for every entry before any binding is
/// registered. Nothing is resolved.
///
/// # Errors
///
/// Returns validation failures before touching the container, and
/// registration failures (for example a namespace already sealed or a
/// name already bound) as they occur.
pub fn apply(manifest: &Manifest, zone: &Zone) -> Result<ApplySummary> {
    validate_against(manifest, |path| zone.existing(path).is_ok())?;

    for spec in &manifest.namespaces {
        let namespace = zone.namespace(&spec.path)?;
        if let Some(imports) = &spec.imports {
            let _ = namespace.configure(imports.iter().cloned())?;
        }
    }

    let mut summary = ApplySummary::default();
    for spec in &manifest.namespaces {
        let namespace = zone.namespace(&spec.path)?;
        for (name, value) in &spec.values {
            let _ = namespace.value(name, value.clone())?;
        }
        for (name, value) in &spec.constants {
            let _ = namespace.constant(name, value.clone())?;
        }
        for (name, dependency) in &spec.aliases {
            let _ = namespace.factory(name, alias(dependency))?;
        }
        tracing::debug!(
            namespace = %spec.path,
            bindings = spec.binding_count(),
            "applied namespace entry"
        );
        summary.namespaces += 1;
        summary.bindings += spec.binding_count();
    }
    tracing::info!(
        namespaces = summary.namespaces,
        bindings = summary.bindings,
        "manifest applied"
    );
    Ok(summary)
}

/// A producer yielding the value of its single dependency, or JSON `null`
/// when an optional dependency is missing.
fn alias(dependency: &str) -> FunctionDescriptor {
    FunctionDescriptor::from_fn([dependency], |call| {
        Ok(call
            .arg(0)
            .cloned()
            .unwrap_or_else(|| Instance::new(serde_json::Value::Null)))
    })
}
