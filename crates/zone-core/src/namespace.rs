//! Namespace handles.
//!
//! A [`Namespace`] is a cheap handle onto one node of a container's tree.
//! Two handles are equal when they refer to the same node of the same
//! container.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use zone_common::error::{Result, ZoneError};
use zone_common::names::{BindingName, SigilPolicy};
use zone_common::types::{AccessLevel, NamePath};

use crate::descriptor::{Descriptor, FunctionDescriptor};
use crate::inject::{InjectedFunction, inject_function};
use crate::instance::Instance;
use crate::interceptor::{Interceptor, Selector};
use crate::resolution::resolve_value;
use crate::resolver::find_resolvable;
use crate::tree::NamespaceId;
use crate::zone::{Zone, ZoneInner};

/// Handle to one namespace of a container.
#[derive(Clone)]
pub struct Namespace {
    zone: Rc<ZoneInner>,
    id: NamespaceId,
}

impl Namespace {
    pub(crate) const fn new(zone: Rc<ZoneInner>, id: NamespaceId) -> Self {
        Self { zone, id }
    }

    /// Identifier of this namespace within its container.
    #[must_use]
    pub const fn id(&self) -> NamespaceId {
        self.id
    }

    /// Dotted full name; empty for the root.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.zone.tree.borrow().full_name(self.id).to_string()
    }

    /// The container this namespace belongs to.
    #[must_use]
    pub fn zone(&self) -> Zone {
        Zone::from_inner(Rc::clone(&self.zone))
    }

    /// The enclosing namespace, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent = self.zone.tree.borrow().parent(self.id);
        parent.map(|id| self.handle(id))
    }

    /// Direct children, ordered by local name.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        let ids: Vec<NamespaceId> = self
            .zone
            .tree
            .borrow()
            .record(self.id)
            .children
            .values()
            .copied()
            .collect();
        ids.into_iter().map(|id| self.handle(id)).collect()
    }

    /// Returns `true` once a lookup has traversed this namespace.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.zone.tree.borrow().record(self.id).sealed
    }

    /// Configured imports, or `None` if they have not been set or pinned.
    #[must_use]
    pub fn imports(&self) -> Option<Vec<String>> {
        self.zone.tree.borrow().record(self.id).imports.clone()
    }

    /// Local binding names with their access levels, ordered by name.
    #[must_use]
    pub fn bindings(&self) -> Vec<(String, AccessLevel)> {
        let tree = self.zone.tree.borrow();
        let mut bindings: Vec<(String, AccessLevel)> = tree
            .record(self.id)
            .bindings
            .iter()
            .map(|(name, binding)| (name.clone(), binding.access))
            .collect();
        bindings.sort();
        bindings
    }

    /// Returns the child `local`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidName`] if `local` is empty or dotted.
    pub fn create(&self, local: &str) -> Result<Self> {
        let id = self.zone.tree.borrow_mut().child(self.id, local)?;
        Ok(self.handle(id))
    }

    /// Returns the child `local`, creating it if needed, and sets its
    /// imports.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::AlreadyConfigured`] if the child already has
    /// imports, plus the errors of [`create`](Self::create).
    pub fn create_with_imports<I, S>(&self, local: &str, imports: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let child = self.create(local)?;
        let _ = child.configure(imports)?;
        Ok(child)
    }

    /// Sets the namespaces this one imports public bindings from.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::AlreadyConfigured`] on a second call and
    /// [`ZoneError::Sealed`] once a lookup has traversed this namespace.
    pub fn configure<I, S>(&self, imports: I) -> Result<&Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let imports = imports.into_iter().map(Into::into).collect();
        self.zone.tree.borrow_mut().configure(self.id, imports)?;
        Ok(self)
    }

    /// Binds `name` (with an optional access sigil) to `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidName`], [`ZoneError::AlreadyBound`],
    /// [`ZoneError::Sealed`], or [`ZoneError::InvalidDependency`] when a
    /// function descriptor declares a free parameter.
    pub fn bind(&self, name: &str, descriptor: impl Into<Descriptor>) -> Result<&Self> {
        let name = BindingName::parse(name)?;
        let descriptor = descriptor.into();
        if let Descriptor::Function(function) = &descriptor {
            let _ = function.dependencies(SigilPolicy::DEFINITION)?;
        }
        self.zone.tree.borrow_mut().bind(self.id, name, descriptor)?;
        Ok(self)
    }

    /// Binds a literal value.
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn value<T: Any>(&self, name: &str, value: T) -> Result<&Self> {
        self.bind(name, Descriptor::value(value))
    }

    /// Binds a literal value that can never be mutated through
    /// [`Instance::get_mut`].
    ///
    /// Freezing covers the handle only. A payload with interior mutability
    /// (`Cell`, `RefCell` and the like) can still change through
    /// [`Instance::downcast`]; bind plain data as a constant.
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn constant<T: Any>(&self, name: &str, value: T) -> Result<&Self> {
        let constant = match Descriptor::value(value) {
            Descriptor::Value(instance) => instance.freeze(),
            Descriptor::Function(function) => Instance::new(function).freeze(),
        };
        self.bind(name, constant)
    }

    /// Binds a producer, invoked once on first resolution.
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn factory(&self, name: &str, descriptor: FunctionDescriptor) -> Result<&Self> {
        self.bind(name, descriptor)
    }

    /// Binds a producer with constructor semantics.
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn service(&self, name: &str, descriptor: FunctionDescriptor) -> Result<&Self> {
        self.bind(name, descriptor.into_constructor())
    }

    /// Binds whatever `input` best describes; see [`Descriptor::guess`].
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn define<T: Any>(&self, name: &str, input: T) -> Result<&Self> {
        self.bind(name, Descriptor::guess(input))
    }

    /// Registers an interceptor for one binding. `target` is a local name,
    /// or a dotted name whose namespace is created if needed.
    ///
    /// The descriptor is injected from this namespace when the target is
    /// first resolved and must produce a [`Transform`](crate::Transform).
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidName`] for a malformed target and
    /// [`ZoneError::InvalidDependency`] if the descriptor declares a free
    /// parameter.
    pub fn interceptor(&self, target: &str, descriptor: FunctionDescriptor) -> Result<&Self> {
        let path = NamePath::parse(target);
        zone_common::names::ensure_valid_name(path.local)?;
        let namespace = {
            let mut tree = self.zone.tree.borrow_mut();
            let id = match path.namespace {
                Some(namespace) => tree.find_or_create(namespace)?,
                None => self.id,
            };
            tree.full_name(id).to_string()
        };
        let selector = Selector::Binding {
            namespace,
            name: path.local.to_string(),
        };
        self.register_interceptor(selector, descriptor)
    }

    /// Registers an interceptor for every binding, anywhere in the
    /// container, for which `predicate(namespace, name)` holds.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDependency`] if the descriptor declares a
    /// free parameter.
    pub fn intercept_where(
        &self,
        predicate: impl Fn(&str, &str) -> bool + 'static,
        descriptor: FunctionDescriptor,
    ) -> Result<&Self> {
        self.register_interceptor(Selector::predicate(predicate), descriptor)
    }

    fn register_interceptor(
        &self,
        selector: Selector,
        descriptor: FunctionDescriptor,
    ) -> Result<&Self> {
        let _ = descriptor.dependencies(SigilPolicy::DEFINITION)?;
        let mut tree = self.zone.tree.borrow_mut();
        let namespace = tree.full_name(self.id).to_string();
        tracing::debug!(namespace = %namespace, selector = ?selector, "registering interceptor");
        tree.push_interceptor(Interceptor {
            namespace,
            selector,
            descriptor,
        });
        Ok(self)
    }

    /// Resolves a public binding by local or dotted name.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::NotFound`] if nothing visible is bound under
    /// `name`, and any failure raised while producing the value.
    pub fn get(&self, name: &str) -> Result<Instance> {
        let found = {
            let mut tree = self.zone.tree.borrow_mut();
            find_resolvable(&mut tree, name, self.id, AccessLevel::Public)?
        };
        match found {
            Some(target) => resolve_value(&self.zone, &target),
            None => Err(ZoneError::NotFound {
                kind: "binding",
                id: name.to_string(),
            }),
        }
    }

    /// Resolves a public binding and downcasts it to `T`.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`ZoneError::TypeMismatch`].
    pub fn get_as<T: Any>(&self, name: &str) -> Result<Rc<T>> {
        self.get(name)?.downcast::<T>()
    }

    /// Resolves the descriptor's dependencies against the public bindings
    /// visible from this namespace. Free (`#`) parameters are supplied when
    /// the returned function is called.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::NotFound`] for a missing required dependency and
    /// any failure raised while producing a dependency.
    pub fn inject(&self, descriptor: FunctionDescriptor) -> Result<InjectedFunction> {
        inject_function(&self.zone, self.id, AccessLevel::Public, &descriptor, true)
    }

    fn handle(&self, id: NamespaceId) -> Self {
        Self::new(Rc::clone(&self.zone), id)
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.zone, &other.zone) && self.id == other.id
    }
}

impl Eq for Namespace {}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .zone
            .tree
            .try_borrow()
            .map(|tree| tree.full_name(self.id).to_string())
            .unwrap_or_default();
        f.debug_struct("Namespace")
            .field("id", &self.id)
            .field("full_name", &name)
            .finish()
    }
}
