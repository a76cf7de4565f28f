//! Static validation of a manifest.
//!
//! Checks for malformed names, duplicate entries, dangling imports and
//! alias cycles before a manifest is applied to a container.

use std::collections::HashSet;

use zone_common::error::{Result, ZoneError};
use zone_common::names::{BindingName, DependencyName, SigilPolicy, ensure_valid_name};

use crate::graph::{AliasGraph, parent_path};
use crate::manifest::Manifest;

/// Validates a manifest on its own.
///
/// # Checks performed
///
/// 1. Every namespace path is empty or made of valid segments.
/// 2. No namespace path appears twice.
/// 3. Every binding name is valid and unique within its namespace.
/// 4. Every import names a namespace declared by the manifest.
/// 5. Every alias dependency is well-formed.
/// 6. Aliases do not refer to each other in a loop.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate(manifest: &Manifest) -> Result<()> {
    validate_against(manifest, |_| false)
}

/// Like [`validate`], with imports also allowed to name any namespace for
/// which `exists` holds.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate_against(manifest: &Manifest, exists: impl Fn(&str) -> bool) -> Result<()> {
    tracing::info!(namespaces = manifest.namespaces.len(), "validating manifest");
    check_paths(manifest)?;
    check_bindings(manifest)?;
    check_imports(manifest, &exists)?;
    check_aliases(manifest)?;
    Ok(())
}

fn check_paths(manifest: &Manifest) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in &manifest.namespaces {
        if !spec.path.is_empty() {
            for segment in spec.path.split('.') {
                ensure_valid_name(segment).map_err(|_| ZoneError::Config {
                    message: format!("invalid namespace path: \"{}\"", spec.path),
                })?;
            }
        }
        if !seen.insert(spec.path.as_str()) {
            return Err(ZoneError::Config {
                message: format!("duplicate namespace entry: \"{}\"", spec.path),
            });
        }
    }
    Ok(())
}

fn check_bindings(manifest: &Manifest) -> Result<()> {
    for spec in &manifest.namespaces {
        let mut seen = HashSet::new();
        for (_, raw) in spec.declared() {
            let name = BindingName::parse(raw)?;
            if !seen.insert(name.name.clone()) {
                return Err(ZoneError::AlreadyBound {
                    namespace: spec.path.clone(),
                    name: name.name,
                });
            }
        }
    }
    Ok(())
}

fn check_imports(manifest: &Manifest, exists: &impl Fn(&str) -> bool) -> Result<()> {
    let mut declared: HashSet<&str> = HashSet::new();
    for spec in &manifest.namespaces {
        let mut current = Some(spec.path.as_str());
        while let Some(path) = current {
            if !declared.insert(path) {
                break;
            }
            current = parent_path(path);
        }
    }
    for spec in &manifest.namespaces {
        for import in spec.imports.iter().flatten() {
            if !declared.contains(import.as_str()) && !exists(import) {
                return Err(ZoneError::InvalidImport {
                    namespace: spec.path.clone(),
                    import: import.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_aliases(manifest: &Manifest) -> Result<()> {
    for spec in &manifest.namespaces {
        for dependency in spec.aliases.values() {
            let _ = DependencyName::parse(dependency, SigilPolicy::DEFINITION)?;
        }
    }
    let _ = AliasGraph::from_manifest(manifest).resolve_order()?;
    Ok(())
}
