//! Injection: turning a [`FunctionDescriptor`] into a callable whose
//! dependencies have been resolved.

use std::cell::RefCell;
use std::rc::Rc;

use zone_common::error::{Result, ZoneError};
use zone_common::names::{DependencyKind, SigilPolicy};
use zone_common::types::AccessLevel;

use crate::descriptor::{FunctionDescriptor, Invocation};
use crate::instance::Instance;
use crate::namespace::Namespace;
use crate::resolution::resolve_value;
use crate::resolver::find_resolvable;
use crate::tree::NamespaceId;
use crate::zone::ZoneInner;

/// A producer whose dependencies have been resolved.
///
/// Free (`#`) parameters are left open and filled, in declaration order,
/// from the arguments passed to [`call`](Self::call).
#[derive(Debug, Clone)]
pub struct InjectedFunction {
    descriptor: FunctionDescriptor,
    args: Vec<Option<Instance>>,
    free_slots: Vec<usize>,
    receiver: Namespace,
}

impl InjectedFunction {
    /// Number of free parameters the caller may supply.
    #[must_use]
    pub fn free_arity(&self) -> usize {
        self.free_slots.len()
    }

    /// Invokes the producer with the receiver bound to the namespace the
    /// function was injected against.
    ///
    /// Missing free arguments are passed as `None`; extra ones are ignored.
    ///
    /// # Errors
    ///
    /// Returns whatever the producer fails with, as a [`ZoneError`].
    pub fn call(&self, free: &[Instance]) -> Result<Instance> {
        self.call_with(&self.receiver, free)
    }

    /// Invokes the producer with an explicit receiver.
    ///
    /// # Errors
    ///
    /// Returns whatever the producer fails with, as a [`ZoneError`].
    pub fn call_with(&self, receiver: &Namespace, free: &[Instance]) -> Result<Instance> {
        let mut args = self.args.clone();
        for (index, &slot) in self.free_slots.iter().enumerate() {
            args[slot] = free.get(index).cloned();
        }
        let constructing = self.descriptor.is_constructor();
        let receiver = if constructing { None } else { Some(receiver) };
        let invocation = Invocation::new(receiver, &args, constructing);
        self.descriptor
            .producer()
            .invoke(&invocation)
            .map_err(ZoneError::from_boxed)
    }
}

/// Resolves every non-free dependency of `descriptor` from `namespace`
/// with at most `access` visibility.
pub(crate) fn inject_function(
    zone: &Rc<ZoneInner>,
    namespace: NamespaceId,
    access: AccessLevel,
    descriptor: &FunctionDescriptor,
    allow_free: bool,
) -> Result<InjectedFunction> {
    let dependencies = descriptor.dependencies(SigilPolicy::INJECTION)?;
    let mut args = Vec::with_capacity(dependencies.len());
    let mut free_slots = Vec::new();
    for dependency in dependencies {
        if dependency.kind == DependencyKind::Free {
            if !allow_free {
                return Err(ZoneError::FreeArgumentNotAllowed {
                    name: dependency.name,
                });
            }
            free_slots.push(args.len());
            args.push(None);
            continue;
        }
        let found = {
            let mut tree = zone.tree.borrow_mut();
            find_resolvable(&mut tree, &dependency.name, namespace, access)?
        };
        match found {
            Some(target) => args.push(Some(resolve_value(zone, &target)?)),
            None if dependency.kind == DependencyKind::Optional => {
                tracing::debug!(dependency = %dependency.name, "optional dependency not found");
                args.push(None);
            }
            None => {
                let tree = zone.tree.borrow();
                tracing::warn!(
                    dependency = %dependency.name,
                    namespace = %tree.full_name(namespace),
                    "injectable not found"
                );
                return Err(ZoneError::NotFound {
                    kind: "dependency",
                    id: dependency.name,
                });
            }
        }
    }
    Ok(InjectedFunction {
        descriptor: descriptor.clone(),
        args,
        free_slots,
        receiver: Namespace::new(Rc::clone(zone), namespace),
    })
}

/// An injection whose dependencies are looked up on first call.
///
/// The target namespace is found (or created) and the function injected the
/// first time [`call`](Self::call) succeeds; later calls reuse that
/// injection.
#[derive(Debug)]
pub struct LazyInjection {
    zone: Rc<ZoneInner>,
    path: String,
    descriptor: FunctionDescriptor,
    cache: RefCell<Option<InjectedFunction>>,
}

impl LazyInjection {
    pub(crate) fn new(zone: Rc<ZoneInner>, path: String, descriptor: FunctionDescriptor) -> Self {
        Self {
            zone,
            path,
            descriptor,
            cache: RefCell::new(None),
        }
    }

    /// Returns `true` once the dependencies have been injected.
    #[must_use]
    pub fn is_injected(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// Injects on first use, then invokes the function.
    ///
    /// # Errors
    ///
    /// Returns injection failures (the next call retries) and producer
    /// failures.
    pub fn call(&self, free: &[Instance]) -> Result<Instance> {
        let cached = self.cache.borrow().clone();
        let function = match cached {
            Some(function) => function,
            None => {
                let namespace = ZoneInner::namespace(&self.zone, &self.path)?;
                let function = namespace.inject(self.descriptor.clone())?;
                *self.cache.borrow_mut() = Some(function.clone());
                function
            }
        };
        function.call(free)
    }
}
