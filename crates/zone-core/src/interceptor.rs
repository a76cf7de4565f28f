//! Interceptors: transforms applied once to a binding's first value.

use std::fmt;
use std::rc::Rc;

use zone_common::error::BoxError;

use crate::descriptor::FunctionDescriptor;
use crate::instance::Instance;

type TransformFn = dyn Fn(Instance, &str, &str) -> Result<Instance, BoxError>;
type PredicateFn = dyn Fn(&str, &str) -> bool;

/// A transform produced by an interceptor's descriptor.
///
/// Called with the current value, the owning namespace's full name and the
/// binding's local name; returns the next value.
#[derive(Clone)]
pub struct Transform(Rc<TransformFn>);

impl Transform {
    /// Wraps a transform function.
    pub fn new(
        transform: impl Fn(Instance, &str, &str) -> Result<Instance, BoxError> + 'static,
    ) -> Self {
        Self(Rc::new(transform))
    }

    /// Wraps a transform that only looks at the value.
    pub fn map(transform: impl Fn(Instance) -> Result<Instance, BoxError> + 'static) -> Self {
        Self::new(move |value, _, _| transform(value))
    }

    /// Applies the transform.
    ///
    /// # Errors
    ///
    /// Propagates whatever the transform returns.
    pub fn apply(&self, value: Instance, namespace: &str, name: &str) -> Result<Instance, BoxError> {
        (self.0)(value, namespace, name)
    }

    /// Wraps this transform so that a producer can return it.
    #[must_use]
    pub fn into_instance(self) -> Instance {
        Instance::new(self)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform")
    }
}

/// Which bindings an interceptor applies to.
#[derive(Clone)]
pub enum Selector {
    /// Exactly one binding.
    Binding {
        /// Full name of the owning namespace.
        namespace: String,
        /// Local name of the binding.
        name: String,
    },
    /// Every binding for which the predicate over
    /// `(namespace full name, local name)` holds.
    Predicate(Rc<PredicateFn>),
}

impl Selector {
    /// Builds a predicate selector.
    pub fn predicate(predicate: impl Fn(&str, &str) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(predicate))
    }

    /// Returns `true` if the selector applies to the binding.
    #[must_use]
    pub fn matches(&self, namespace: &str, name: &str) -> bool {
        match self {
            Self::Binding {
                namespace: target_namespace,
                name: target_name,
            } => target_namespace == namespace && target_name == name,
            Self::Predicate(predicate) => predicate(namespace, name),
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binding { namespace, name } => f
                .debug_struct("Binding")
                .field("namespace", namespace)
                .field("name", name)
                .finish(),
            Self::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

/// A registered interceptor.
#[derive(Debug, Clone)]
pub(crate) struct Interceptor {
    /// Full name of the namespace whose bindings the descriptor sees.
    pub(crate) namespace: String,
    pub(crate) selector: Selector,
    pub(crate) descriptor: FunctionDescriptor,
}
