//! Name-to-binding search.
//!
//! A lookup starts in a namespace and checks, in order: the namespace's own
//! bindings, the public bindings of each namespace it imports, then repeats
//! both steps in the parent with access downgraded to protected, up to the
//! root. Imports of imported namespaces are never followed. Every namespace
//! inspected along the way is sealed.

use std::collections::HashSet;

use zone_common::error::{Result, ZoneError};
use zone_common::types::{AccessLevel, NamePath};

use crate::tree::{BindingRef, NamespaceId, Tree};

/// Whether a search follows imports and parents or stops after the first
/// namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Full,
    Local,
}

/// Namespaces whose imports are currently being searched.
type ImportGuard = HashSet<NamespaceId>;

/// Finds the binding `name` refers to when looked up from `start` with at
/// most `access` visibility.
///
/// A dotted name is searched from its containing namespace, which is never
/// created by the lookup; the access is clamped to what `start` is entitled
/// to in that namespace.
pub(crate) fn find_resolvable(
    tree: &mut Tree,
    name: &str,
    start: NamespaceId,
    access: AccessLevel,
) -> Result<Option<BindingRef>> {
    let path = NamePath::parse(name);
    let target = match path.namespace {
        None => Some(start),
        Some(namespace) => tree.find(namespace),
    };
    let access = match target {
        Some(id) if id != start => access.min(tree.access_between(start, id)),
        _ => access,
    };
    search(
        tree,
        path.local,
        target,
        access,
        Scope::Full,
        &mut ImportGuard::new(),
    )
}

fn search(
    tree: &mut Tree,
    local: &str,
    mut current: Option<NamespaceId>,
    mut access: AccessLevel,
    scope: Scope,
    guard: &mut ImportGuard,
) -> Result<Option<BindingRef>> {
    while let Some(id) = current {
        tree.seal(id);
        if tree.is_accessible(id, local, access) {
            return Ok(Some(BindingRef {
                namespace: id,
                name: local.to_string(),
            }));
        }
        if scope == Scope::Local {
            return Ok(None);
        }
        if let Some(found) = search_imports(tree, local, id, guard)? {
            return Ok(Some(found));
        }
        access = AccessLevel::Protected;
        current = tree.parent(id);
    }
    Ok(None)
}

fn search_imports(
    tree: &mut Tree,
    local: &str,
    id: NamespaceId,
    guard: &mut ImportGuard,
) -> Result<Option<BindingRef>> {
    if !guard.insert(id) {
        return Err(cyclic(tree, id));
    }
    let outcome = chase_imports(tree, local, id, guard);
    let _ = guard.remove(&id);
    outcome
}

fn chase_imports(
    tree: &mut Tree,
    local: &str,
    id: NamespaceId,
    guard: &mut ImportGuard,
) -> Result<Option<BindingRef>> {
    let mut loops_back = false;
    for import in tree.pin_imports(id) {
        let target = tree
            .find(&import)
            .ok_or_else(|| ZoneError::InvalidImport {
                namespace: tree.full_name(id).to_string(),
                import: import.clone(),
            })?;
        if guard.contains(&target) {
            return Err(cyclic(tree, id));
        }
        loops_back |= tree.import_graph().reaches(target, id);
        let found = search(
            tree,
            local,
            Some(target),
            AccessLevel::Public,
            Scope::Local,
            guard,
        )?;
        if found.is_some() {
            return Ok(found);
        }
    }
    // A miss would continue past imports that lead back here.
    if loops_back {
        return Err(cyclic(tree, id));
    }
    Ok(None)
}

fn cyclic(tree: &Tree, id: NamespaceId) -> ZoneError {
    let name = tree.full_name(id).to_string();
    tracing::debug!(namespace = %name, "cyclic import detected");
    ZoneError::CyclicDependency { name }
}

#[cfg(test)]
mod tests {
    use zone_common::names::BindingName;

    use super::*;
    use crate::descriptor::Descriptor;

    fn bind(tree: &mut Tree, namespace: &str, raw: &str) {
        let id = tree.find_or_create(namespace).expect("namespace");
        let name = BindingName::parse(raw).expect("name");
        tree.bind(id, name, Descriptor::value(raw.to_string()))
            .expect("bind");
    }

    fn lookup(tree: &mut Tree, from: &str, name: &str) -> Result<Option<String>> {
        let start = tree.find_or_create(from).expect("namespace");
        Ok(find_resolvable(tree, name, start, AccessLevel::Public)?
            .map(|found| format!("{}:{}", tree.full_name(found.namespace), found.name)))
    }

    #[test]
    fn local_before_imports_before_parent() {
        let mut tree = Tree::new();
        bind(&mut tree, "", "#bar");
        bind(&mut tree, "", "#foo");
        bind(&mut tree, "", "baz");
        bind(&mut tree, "mine", "foo");
        bind(&mut tree, "mine", "bar");
        bind(&mut tree, "yours", "bar");
        let yours = tree.find("yours").expect("yours");
        tree.configure(yours, vec!["mine".into()]).expect("configure");

        assert_eq!(lookup(&mut tree, "yours", "bar").expect("ok").as_deref(), Some("yours:bar"));
        assert_eq!(lookup(&mut tree, "yours", "foo").expect("ok").as_deref(), Some("mine:foo"));
        assert_eq!(lookup(&mut tree, "yours", "baz").expect("ok").as_deref(), Some(":baz"));
    }

    #[test]
    fn lookup_seals_every_inspected_namespace() {
        let mut tree = Tree::new();
        let child = tree.find_or_create("a.b").expect("namespace");
        let _ = find_resolvable(&mut tree, "missing", child, AccessLevel::Public).expect("ok");
        for path in ["", "a", "a.b"] {
            let id = tree.find(path).expect("namespace");
            assert!(tree.record(id).sealed, "{path} should be sealed");
        }
    }

    #[test]
    fn public_lookup_ignores_local_private_bindings() {
        let mut tree = Tree::new();
        bind(&mut tree, "mine", "-secret");
        assert_eq!(lookup(&mut tree, "mine", "secret").expect("ok"), None);
        let mine = tree.find("mine").expect("mine");
        assert!(
            find_resolvable(&mut tree, "secret", mine, AccessLevel::Private)
                .expect("ok")
                .is_some()
        );
    }

    #[test]
    fn dotted_lookup_clamps_access() {
        let mut tree = Tree::new();
        bind(&mut tree, "p", "#prot");
        bind(&mut tree, "p", "-priv");
        let child = tree.find_or_create("p.c.d").expect("namespace");
        let other = tree.find_or_create("q").expect("namespace");

        let found = find_resolvable(&mut tree, "p.prot", child, AccessLevel::Private).expect("ok");
        assert!(found.is_some());
        let found = find_resolvable(&mut tree, "p.priv", child, AccessLevel::Private).expect("ok");
        assert!(found.is_none());
        let found = find_resolvable(&mut tree, "p.prot", other, AccessLevel::Private).expect("ok");
        assert!(found.is_none());
    }

    #[test]
    fn dotted_lookup_does_not_create_namespaces() {
        let mut tree = Tree::new();
        let found =
            find_resolvable(&mut tree, "x.y.z.bar", NamespaceId::ROOT, AccessLevel::Public)
                .expect("ok");
        assert!(found.is_none());
        assert!(tree.find("x.y.z").is_none());
        assert!(tree.find("x").is_none());
    }

    #[test]
    fn imports_are_not_transitive() {
        let mut tree = Tree::new();
        bind(&mut tree, "c", "deep");
        let a = tree.find_or_create("a").expect("a");
        let b = tree.find_or_create("b").expect("b");
        tree.configure(a, vec!["b".into()]).expect("configure");
        tree.configure(b, vec!["c".into()]).expect("configure");
        assert_eq!(lookup(&mut tree, "a", "deep").expect("ok"), None);
        assert_eq!(lookup(&mut tree, "b", "deep").expect("ok").as_deref(), Some("c:deep"));
    }

    #[test]
    fn self_import_is_cyclic() {
        let mut tree = Tree::new();
        let mine = tree.find_or_create("mine").expect("mine");
        tree.configure(mine, vec!["mine".into()]).expect("declaring is fine");
        let err = lookup(&mut tree, "mine", "x").expect_err("cyclic");
        assert!(err.is_cyclic());
    }

    #[test]
    fn mutual_import_is_cyclic() {
        let mut tree = Tree::new();
        let mine = tree.find_or_create("mine").expect("mine");
        let yours = tree.find_or_create("yours").expect("yours");
        tree.configure(mine, vec!["yours".into()]).expect("declaring is fine");
        tree.configure(yours, vec!["mine".into()]).expect("declaring is fine");
        let err = lookup(&mut tree, "yours", "x").expect_err("cyclic");
        assert!(err.is_cyclic());
    }

    #[test]
    fn direct_import_hit_ignores_cycle_behind_it() {
        let mut tree = Tree::new();
        bind(&mut tree, "b", "x");
        for (from, to) in [("a", "b"), ("b", "c"), ("c", "a")] {
            let id = tree.find_or_create(from).expect("namespace");
            tree.configure(id, vec![to.into()]).expect("configure");
        }
        assert_eq!(lookup(&mut tree, "a", "x").expect("found").as_deref(), Some("b:x"));
        assert!(lookup(&mut tree, "a", "y").expect_err("cyclic").is_cyclic());
    }

    #[test]
    fn sibling_import_is_not_cyclic() {
        let mut tree = Tree::new();
        let _ = tree.find_or_create("sibling").expect("sibling");
        let myzone = tree.find_or_create("myzone").expect("myzone");
        tree.configure(myzone, vec!["sibling".into()]).expect("configure");
        let found = lookup(&mut tree, "", "myzone.value").expect("not cyclic");
        assert_eq!(found, None);
    }

    #[test]
    fn dangling_import_is_reported() {
        let mut tree = Tree::new();
        let a = tree.find_or_create("a").expect("a");
        tree.configure(a, vec!["nowhere".into()]).expect("configure");
        let err = lookup(&mut tree, "a", "x").expect_err("dangling");
        assert!(matches!(err, ZoneError::InvalidImport { .. }));
    }
}
