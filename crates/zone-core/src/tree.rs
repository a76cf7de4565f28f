//! The namespace arena.
//!
//! Namespaces are records in a flat vector addressed by [`NamespaceId`].
//! Each record owns its bindings and names its children and parent by id,
//! and a secondary index maps every full dotted name to its id.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use zone_common::error::{Result, ZoneError};
use zone_common::names::{BindingName, ensure_valid_name};
use zone_common::types::{AccessLevel, full_name};

use crate::descriptor::Descriptor;
use crate::graph::ImportGraph;
use crate::instance::Instance;
use crate::interceptor::Interceptor;

/// Stable identifier of a namespace inside one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespaceId(usize);

impl NamespaceId {
    /// The root namespace.
    pub const ROOT: Self = Self(0);

    /// Position of the namespace in its arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolution state of a binding.
#[derive(Debug, Clone)]
pub(crate) enum ResolutionState {
    Unresolved,
    /// Producer running.
    Resolving,
    /// Produced, interceptors running. Holds the value they started from.
    Intercepting(Instance),
    Resolved(Instance),
}

/// One named, producible entry within a namespace.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) full_name: String,
    pub(crate) access: AccessLevel,
    pub(crate) descriptor: Descriptor,
    pub(crate) state: ResolutionState,
}

impl Binding {
    /// Copy of the binding that has to be resolved again.
    fn unresolved(&self) -> Self {
        Self {
            full_name: self.full_name.clone(),
            access: self.access,
            descriptor: self.descriptor.clone(),
            state: ResolutionState::Unresolved,
        }
    }
}

/// Address of a binding: owning namespace plus local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BindingRef {
    pub(crate) namespace: NamespaceId,
    pub(crate) name: String,
}

#[derive(Debug)]
pub(crate) struct NamespaceRecord {
    pub(crate) full_name: String,
    pub(crate) parent: Option<NamespaceId>,
    pub(crate) children: BTreeMap<String, NamespaceId>,
    pub(crate) bindings: HashMap<String, Binding>,
    pub(crate) imports: Option<Vec<String>>,
    pub(crate) sealed: bool,
}

impl NamespaceRecord {
    fn new(full_name: String, parent: Option<NamespaceId>) -> Self {
        Self {
            full_name,
            parent,
            children: BTreeMap::new(),
            bindings: HashMap::new(),
            imports: None,
            sealed: false,
        }
    }
}

/// All namespaces, bindings and interceptors of one container.
#[derive(Debug)]
pub(crate) struct Tree {
    records: Vec<NamespaceRecord>,
    index: HashMap<String, NamespaceId>,
    interceptors: Vec<Interceptor>,
    import_graph: Option<ImportGraph>,
}

impl Tree {
    pub(crate) fn new() -> Self {
        let mut index = HashMap::new();
        let _ = index.insert(String::new(), NamespaceId::ROOT);
        let mut root = NamespaceRecord::new(String::new(), None);
        root.imports = Some(Vec::new());
        Self {
            records: vec![root],
            index,
            interceptors: Vec::new(),
            import_graph: None,
        }
    }

    pub(crate) fn record(&self, id: NamespaceId) -> &NamespaceRecord {
        &self.records[id.0]
    }

    fn record_mut(&mut self, id: NamespaceId) -> &mut NamespaceRecord {
        &mut self.records[id.0]
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = (NamespaceId, &NamespaceRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(idx, record)| (NamespaceId(idx), record))
    }

    pub(crate) fn full_name(&self, id: NamespaceId) -> &str {
        &self.record(id).full_name
    }

    pub(crate) fn parent(&self, id: NamespaceId) -> Option<NamespaceId> {
        self.record(id).parent
    }

    /// Looks a namespace up by full name without creating it.
    pub(crate) fn find(&self, path: &str) -> Option<NamespaceId> {
        self.index.get(path).copied()
    }

    /// Returns the child `local` of `parent`, creating it if needed.
    pub(crate) fn child(&mut self, parent: NamespaceId, local: &str) -> Result<NamespaceId> {
        ensure_valid_name(local)?;
        if let Some(&existing) = self.record(parent).children.get(local) {
            return Ok(existing);
        }
        let id = NamespaceId(self.records.len());
        let name = full_name(self.full_name(parent), local);
        tracing::debug!(namespace = %name, "creating namespace");
        let _ = self.index.insert(name.clone(), id);
        self.records.push(NamespaceRecord::new(name, Some(parent)));
        let _ = self
            .record_mut(parent)
            .children
            .insert(local.to_string(), id);
        self.import_graph = None;
        Ok(id)
    }

    /// Looks a namespace up by full name, creating every missing segment.
    pub(crate) fn find_or_create(&mut self, path: &str) -> Result<NamespaceId> {
        if let Some(id) = self.find(path) {
            return Ok(id);
        }
        path.split('.')
            .try_fold(NamespaceId::ROOT, |parent, local| self.child(parent, local))
    }

    /// Sets the imports of a namespace, once.
    pub(crate) fn configure(&mut self, id: NamespaceId, imports: Vec<String>) -> Result<()> {
        let record = self.record_mut(id);
        if record.imports.is_some() {
            return Err(ZoneError::AlreadyConfigured {
                namespace: record.full_name.clone(),
            });
        }
        if record.sealed {
            return Err(ZoneError::Sealed {
                namespace: record.full_name.clone(),
            });
        }
        record.imports = Some(imports);
        self.import_graph = None;
        Ok(())
    }

    /// Returns the imports of a namespace, pinning them so that they can no
    /// longer be configured.
    pub(crate) fn pin_imports(&mut self, id: NamespaceId) -> Vec<String> {
        self.record_mut(id)
            .imports
            .get_or_insert_with(Vec::new)
            .clone()
    }

    pub(crate) fn bind(
        &mut self,
        id: NamespaceId,
        name: BindingName,
        descriptor: Descriptor,
    ) -> Result<()> {
        let record = self.record_mut(id);
        if record.bindings.contains_key(&name.name) {
            return Err(ZoneError::AlreadyBound {
                namespace: record.full_name.clone(),
                name: name.name,
            });
        }
        if record.sealed {
            return Err(ZoneError::Sealed {
                namespace: record.full_name.clone(),
            });
        }
        let binding = Binding {
            full_name: full_name(&record.full_name, &name.name),
            access: name.access,
            descriptor,
            state: ResolutionState::Unresolved,
        };
        tracing::debug!(binding = %binding.full_name, access = %binding.access, "binding");
        let _ = record.bindings.insert(name.name, binding);
        Ok(())
    }

    pub(crate) fn seal(&mut self, id: NamespaceId) {
        let record = self.record_mut(id);
        if !record.sealed {
            tracing::debug!(namespace = %record.full_name, "sealing namespace");
            record.sealed = true;
        }
    }

    /// Returns `true` if `local` is bound in `id` at or below `access`.
    pub(crate) fn is_accessible(&self, id: NamespaceId, local: &str, access: AccessLevel) -> bool {
        self.record(id)
            .bindings
            .get(local)
            .is_some_and(|binding| binding.access <= access)
    }

    pub(crate) fn binding_mut(&mut self, target: &BindingRef) -> Result<&mut Binding> {
        let record = &mut self.records[target.namespace.0];
        let namespace = &record.full_name;
        record
            .bindings
            .get_mut(&target.name)
            .ok_or_else(|| ZoneError::NotFound {
                kind: "binding",
                id: full_name(namespace, &target.name),
            })
    }

    /// Access level `source` is entitled to when looking into `target`.
    pub(crate) fn access_between(&self, source: NamespaceId, target: NamespaceId) -> AccessLevel {
        if source == target {
            return AccessLevel::Private;
        }
        let mut current = Some(source);
        while let Some(id) = current {
            if id == target {
                return AccessLevel::Protected;
            }
            current = self.parent(id);
        }
        AccessLevel::Public
    }

    pub(crate) fn import_graph(&mut self) -> &ImportGraph {
        if self.import_graph.is_none() {
            self.import_graph = Some(ImportGraph::build(self));
        }
        self.import_graph.get_or_insert_with(ImportGraph::empty)
    }

    pub(crate) fn push_interceptor(&mut self, interceptor: Interceptor) {
        self.interceptors.push(interceptor);
    }

    pub(crate) fn interceptors(&self) -> &[Interceptor] {
        &self.interceptors
    }

    /// Structural copy: same namespaces, imports, descriptors and
    /// interceptors; every binding unresolved and every namespace unsealed.
    pub(crate) fn duplicate(&self) -> Self {
        let records = self
            .records
            .iter()
            .map(|record| NamespaceRecord {
                full_name: record.full_name.clone(),
                parent: record.parent,
                children: record.children.clone(),
                bindings: record
                    .bindings
                    .iter()
                    .map(|(name, binding)| (name.clone(), binding.unresolved()))
                    .collect(),
                imports: record.imports.clone(),
                sealed: false,
            })
            .collect();
        Self {
            records,
            index: self.index.clone(),
            interceptors: self.interceptors.clone(),
            import_graph: None,
        }
    }

    /// Full names of every public binding, in no particular order.
    pub(crate) fn public_names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().flat_map(|record| {
            record
                .bindings
                .values()
                .filter(|binding| binding.access == AccessLevel::Public)
                .map(|binding| binding.full_name.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(value: i32) -> Descriptor {
        Descriptor::value(value)
    }

    #[test]
    fn child_creation_is_idempotent() {
        let mut tree = Tree::new();
        let a = tree.child(NamespaceId::ROOT, "a").expect("create");
        let again = tree.child(NamespaceId::ROOT, "a").expect("create");
        assert_eq!(a, again);
        assert_eq!(tree.full_name(a), "a");
    }

    #[test]
    fn find_or_create_builds_every_segment() {
        let mut tree = Tree::new();
        let c = tree.find_or_create("a.b.c").expect("create");
        assert_eq!(tree.full_name(c), "a.b.c");
        let b = tree.find("a.b").expect("intermediate namespace");
        assert_eq!(tree.parent(c), Some(b));
        assert_eq!(tree.find_or_create("").expect("root"), NamespaceId::ROOT);
    }

    #[test]
    fn invalid_segments_are_rejected() {
        let mut tree = Tree::new();
        assert!(tree.find_or_create("a..b").is_err());
        assert!(tree.child(NamespaceId::ROOT, "").is_err());
    }

    #[test]
    fn duplicate_binding_is_rejected_regardless_of_access() {
        let mut tree = Tree::new();
        let name = BindingName::parse("-foo").expect("name");
        tree.bind(NamespaceId::ROOT, name, literal(1)).expect("first");
        let again = BindingName::parse("+foo").expect("name");
        let err = tree
            .bind(NamespaceId::ROOT, again, literal(2))
            .expect_err("duplicate");
        assert!(matches!(err, ZoneError::AlreadyBound { .. }));
    }

    #[test]
    fn sealed_namespace_rejects_bindings_and_imports() {
        let mut tree = Tree::new();
        let a = tree.child(NamespaceId::ROOT, "a").expect("create");
        tree.seal(a);
        let name = BindingName::parse("foo").expect("name");
        assert!(matches!(
            tree.bind(a, name, literal(1)),
            Err(ZoneError::Sealed { .. })
        ));
        assert!(matches!(
            tree.configure(a, vec!["b".into()]),
            Err(ZoneError::Sealed { .. })
        ));
    }

    #[test]
    fn imports_are_set_once() {
        let mut tree = Tree::new();
        let a = tree.child(NamespaceId::ROOT, "a").expect("create");
        tree.configure(a, Vec::new()).expect("first");
        assert!(matches!(
            tree.configure(a, Vec::new()),
            Err(ZoneError::AlreadyConfigured { .. })
        ));
    }

    #[test]
    fn pinning_blocks_later_configuration() {
        let mut tree = Tree::new();
        let a = tree.child(NamespaceId::ROOT, "a").expect("create");
        assert!(tree.pin_imports(a).is_empty());
        assert!(tree.configure(a, vec!["b".into()]).is_err());
    }

    #[test]
    fn access_between_namespaces() {
        let mut tree = Tree::new();
        let a = tree.find_or_create("a").expect("a");
        let c = tree.find_or_create("a.b.c").expect("c");
        let x = tree.find_or_create("x").expect("x");
        assert_eq!(tree.access_between(a, a), AccessLevel::Private);
        assert_eq!(tree.access_between(c, a), AccessLevel::Protected);
        assert_eq!(tree.access_between(a, c), AccessLevel::Public);
        assert_eq!(tree.access_between(x, a), AccessLevel::Public);
    }

    #[test]
    fn duplicate_resets_state_and_seal() {
        let mut tree = Tree::new();
        let a = tree.child(NamespaceId::ROOT, "a").expect("create");
        let name = BindingName::parse("foo").expect("name");
        tree.bind(a, name, literal(1)).expect("bind");
        tree.seal(a);
        let target = BindingRef {
            namespace: a,
            name: "foo".into(),
        };
        tree.binding_mut(&target).expect("binding").state =
            ResolutionState::Resolved(Instance::new(1_i32));

        let mut copy = tree.duplicate();
        assert!(!copy.record(a).sealed);
        assert!(matches!(
            copy.binding_mut(&target).expect("binding").state,
            ResolutionState::Unresolved
        ));
        assert_eq!(copy.find("a"), Some(a));
    }

    #[test]
    fn public_names_skip_hidden_bindings() {
        let mut tree = Tree::new();
        for raw in ["foo", "-bar", "#baz"] {
            let name = BindingName::parse(raw).expect("name");
            tree.bind(NamespaceId::ROOT, name, literal(0)).expect("bind");
        }
        let names: Vec<&str> = tree.public_names().collect();
        assert_eq!(names, vec!["foo"]);
    }
}
