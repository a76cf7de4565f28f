//! The container façade.
//!
//! A [`Zone`] owns one namespace tree. Every verb on it takes a dotted name
//! relative to the root and delegates to the matching [`Namespace`] method.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use zone_common::config::ZoneConfig;
use zone_common::constants::VERSION;
use zone_common::error::{Result, ZoneError};
use zone_common::names::{ensure_valid_name, split_access};
use zone_common::types::NamePath;

use crate::descriptor::FunctionDescriptor;
use crate::inject::LazyInjection;
use crate::instance::Instance;
use crate::namespace::Namespace;
use crate::tree::{NamespaceId, Tree};

/// State shared by a container and every handle into it.
#[derive(Debug)]
pub(crate) struct ZoneInner {
    pub(crate) tree: RefCell<Tree>,
    pub(crate) config: ZoneConfig,
}

impl ZoneInner {
    /// Looks a namespace up by path, creating it unless the configuration
    /// forbids implicit namespaces.
    pub(crate) fn namespace(zone: &Rc<Self>, path: &str) -> Result<Namespace> {
        let id = if zone.config.allow_implicit_namespaces {
            zone.tree.borrow_mut().find_or_create(path)?
        } else {
            Self::existing(zone, path)?
        };
        Ok(Namespace::new(Rc::clone(zone), id))
    }

    fn existing(zone: &Rc<Self>, path: &str) -> Result<NamespaceId> {
        zone.tree
            .borrow()
            .find(path)
            .ok_or_else(|| ZoneError::NotFound {
                kind: "namespace",
                id: path.to_string(),
            })
    }
}

/// A dependency-injection container.
///
/// Cloning a `Zone` yields another handle to the same container; use
/// [`copy`](Self::copy) for an independent one.
#[derive(Clone)]
pub struct Zone {
    inner: Rc<ZoneInner>,
}

impl Zone {
    /// Creates an empty container with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ZoneConfig::default())
    }

    /// Creates an empty container.
    #[must_use]
    pub fn with_config(config: ZoneConfig) -> Self {
        Self {
            inner: Rc::new(ZoneInner {
                tree: RefCell::new(Tree::new()),
                config,
            }),
        }
    }

    pub(crate) const fn from_inner(inner: Rc<ZoneInner>) -> Self {
        Self { inner }
    }

    /// Library version.
    #[must_use]
    pub const fn version() -> &'static str {
        VERSION
    }

    /// Configuration this container was created with.
    #[must_use]
    pub fn config(&self) -> &ZoneConfig {
        &self.inner.config
    }

    /// A brand-new, empty container with the same configuration.
    #[must_use]
    pub fn make_zone(&self) -> Self {
        Self::with_config(self.inner.config.clone())
    }

    /// Independent copy of this container: the same namespaces, imports,
    /// descriptors and interceptors, with nothing resolved or sealed.
    #[must_use]
    pub fn copy(&self) -> Self {
        let tree = self.inner.tree.borrow().duplicate();
        tracing::info!(
            namespaces = tree.records().count(),
            "copying container"
        );
        Self {
            inner: Rc::new(ZoneInner {
                tree: RefCell::new(tree),
                config: self.inner.config.clone(),
            }),
        }
    }

    /// The root namespace.
    #[must_use]
    pub fn root(&self) -> Namespace {
        Namespace::new(Rc::clone(&self.inner), NamespaceId::ROOT)
    }

    /// The namespace at `path`, created if missing unless implicit
    /// namespaces are disabled. The empty path is the root.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidName`] for a malformed path and
    /// [`ZoneError::NotFound`] if the namespace is missing and may not be
    /// created.
    pub fn namespace(&self, path: &str) -> Result<Namespace> {
        ZoneInner::namespace(&self.inner, path)
    }

    /// The namespace at `path`, never created.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::NotFound`] if no such namespace exists.
    pub fn existing(&self, path: &str) -> Result<Namespace> {
        let id = ZoneInner::existing(&self.inner, path)?;
        Ok(Namespace::new(Rc::clone(&self.inner), id))
    }

    /// Every namespace, in creation order.
    #[must_use]
    pub fn namespaces(&self) -> Vec<Namespace> {
        let ids: Vec<NamespaceId> = self.inner.tree.borrow().records().map(|(id, _)| id).collect();
        ids.into_iter()
            .map(|id| Namespace::new(Rc::clone(&self.inner), id))
            .collect()
    }

    /// Resolves a public binding by its full dotted name.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::NotFound`] if the namespace or binding does not
    /// exist, and any failure raised while producing the value.
    pub fn get(&self, name: &str) -> Result<Instance> {
        let path = NamePath::parse(name);
        let namespace = self
            .existing(path.namespace.unwrap_or_default())
            .map_err(|_| ZoneError::NotFound {
                kind: "binding",
                id: name.to_string(),
            })?;
        namespace.get(path.local)
    }

    /// Resolves a public binding and downcasts it to `T`.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`ZoneError::TypeMismatch`].
    pub fn get_as<T: Any>(&self, name: &str) -> Result<Rc<T>> {
        self.get(name)?.downcast::<T>()
    }

    /// Binds a literal value under a full dotted name such as `"-a.b.foo"`.
    ///
    /// # Errors
    ///
    /// As [`Namespace::bind`].
    pub fn value<T: Any>(&self, name: &str, value: T) -> Result<&Self> {
        let (namespace, local) = self.target(name)?;
        let _ = namespace.value(&local, value)?;
        Ok(self)
    }

    /// Binds a constant under a full dotted name.
    ///
    /// # Errors
    ///
    /// As [`Namespace::bind`].
    pub fn constant<T: Any>(&self, name: &str, value: T) -> Result<&Self> {
        let (namespace, local) = self.target(name)?;
        let _ = namespace.constant(&local, value)?;
        Ok(self)
    }

    /// Binds a producer under a full dotted name.
    ///
    /// # Errors
    ///
    /// As [`Namespace::bind`].
    pub fn factory(&self, name: &str, descriptor: FunctionDescriptor) -> Result<&Self> {
        let (namespace, local) = self.target(name)?;
        let _ = namespace.factory(&local, descriptor)?;
        Ok(self)
    }

    /// Binds a constructor producer under a full dotted name.
    ///
    /// # Errors
    ///
    /// As [`Namespace::bind`].
    pub fn service(&self, name: &str, descriptor: FunctionDescriptor) -> Result<&Self> {
        let (namespace, local) = self.target(name)?;
        let _ = namespace.service(&local, descriptor)?;
        Ok(self)
    }

    /// Binds whatever `input` best describes under a full dotted name.
    ///
    /// # Errors
    ///
    /// As [`Namespace::bind`].
    pub fn define<T: Any>(&self, name: &str, input: T) -> Result<&Self> {
        let (namespace, local) = self.target(name)?;
        let _ = namespace.define(&local, input)?;
        Ok(self)
    }

    /// Registers an interceptor, defined in the root, for the binding with
    /// the given full dotted name.
    ///
    /// # Errors
    ///
    /// As [`Namespace::interceptor`].
    pub fn interceptor(&self, target: &str, descriptor: FunctionDescriptor) -> Result<&Self> {
        let _ = self.root().interceptor(target, descriptor)?;
        Ok(self)
    }

    /// Registers an interceptor, defined in the root, for every binding the
    /// predicate selects.
    ///
    /// # Errors
    ///
    /// As [`Namespace::intercept_where`].
    pub fn interceptor_where(
        &self,
        predicate: impl Fn(&str, &str) -> bool + 'static,
        descriptor: FunctionDescriptor,
    ) -> Result<&Self> {
        let _ = self.root().intercept_where(predicate, descriptor)?;
        Ok(self)
    }

    /// Returns a function injected against the namespace at `path` when it
    /// is first called.
    #[must_use]
    pub fn inject(&self, path: &str, descriptor: FunctionDescriptor) -> LazyInjection {
        LazyInjection::new(Rc::clone(&self.inner), path.to_string(), descriptor)
    }

    /// Full names of every public binding, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.names_where(|_| true)
    }

    /// Full names of every public binding matching `pattern`, sorted.
    #[must_use]
    pub fn names_matching(&self, pattern: &Regex) -> Vec<String> {
        self.names_where(|name| pattern.is_match(name))
    }

    /// Full names of every public binding accepted by `filter`, sorted.
    #[must_use]
    pub fn names_where(&self, filter: impl Fn(&str) -> bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .tree
            .borrow()
            .public_names()
            .map(ToString::to_string)
            .collect();
        names.retain(|name| filter(name));
        names.sort();
        names
    }

    /// Groups of namespaces whose imports form a cycle, by full name.
    #[must_use]
    pub fn import_cycles(&self) -> Vec<Vec<String>> {
        let mut tree = self.inner.tree.borrow_mut();
        let cycles = tree.import_graph().cycles();
        cycles
            .into_iter()
            .map(|ids| ids.into_iter().map(|id| tree.full_name(id).to_string()).collect())
            .collect()
    }

    /// Splits a full dotted binding name, with its access sigil in front,
    /// into the owning namespace and the sigil-prefixed local name.
    fn target(&self, name: &str) -> Result<(Namespace, String)> {
        let (access, rest) = split_access(name);
        let path = NamePath::parse(rest);
        ensure_valid_name(path.local)?;
        let namespace = self.namespace(path.namespace.unwrap_or_default())?;
        Ok((namespace, format!("{}{}", access.sigil(), path.local)))
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
