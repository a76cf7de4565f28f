//! Value resolution: producing, intercepting and memoizing a binding's value.

use std::rc::Rc;

use zone_common::error::{BoxError, Result, ZoneError};
use zone_common::types::AccessLevel;

use crate::descriptor::Descriptor;
use crate::inject::inject_function;
use crate::instance::Instance;
use crate::interceptor::{Interceptor, Transform};
use crate::tree::{BindingRef, ResolutionState};
use crate::zone::ZoneInner;

/// Returns the value of `target`, producing it on first use.
///
/// The binding is `Resolving` only while its producer runs, so a path that
/// leads back to it from there fails as a cycle. While interceptors run,
/// lookups of the binding see the value they started from. A failed attempt
/// leaves the binding `Unresolved`.
pub(crate) fn resolve_value(zone: &Rc<ZoneInner>, target: &BindingRef) -> Result<Instance> {
    let (full_name, descriptor) = {
        let mut tree = zone.tree.borrow_mut();
        let binding = tree.binding_mut(target)?;
        match &binding.state {
            ResolutionState::Resolved(value) | ResolutionState::Intercepting(value) => {
                return Ok(value.clone());
            }
            ResolutionState::Resolving => {
                return Err(ZoneError::CyclicDependency {
                    name: binding.full_name.clone(),
                });
            }
            ResolutionState::Unresolved => {}
        }
        binding.state = ResolutionState::Resolving;
        (binding.full_name.clone(), binding.descriptor.clone())
    };

    tracing::debug!(binding = %full_name, "resolving");
    let outcome = produce(zone, target, &descriptor)
        .map_err(|source| ZoneError::Resolution {
            binding: full_name.clone(),
            source: Box::new(source),
        })
        .and_then(|value| {
            set_state(zone, target, ResolutionState::Intercepting(value.clone()))?;
            apply_interceptors(zone, target, &full_name, value)
        });

    let state = match &outcome {
        Ok(value) => ResolutionState::Resolved(value.clone()),
        Err(err) => {
            tracing::debug!(binding = %full_name, error = %err, "resolution failed");
            ResolutionState::Unresolved
        }
    };
    set_state(zone, target, state)?;
    outcome
}

fn set_state(zone: &ZoneInner, target: &BindingRef, state: ResolutionState) -> Result<()> {
    zone.tree.borrow_mut().binding_mut(target)?.state = state;
    Ok(())
}

fn produce(zone: &Rc<ZoneInner>, target: &BindingRef, descriptor: &Descriptor) -> Result<Instance> {
    match descriptor {
        Descriptor::Value(value) => Ok(value.clone()),
        Descriptor::Function(function) => {
            inject_function(zone, target.namespace, AccessLevel::Private, function, false)?
                .call(&[])
        }
    }
}

fn apply_interceptors(
    zone: &Rc<ZoneInner>,
    target: &BindingRef,
    full_name: &str,
    mut value: Instance,
) -> Result<Instance> {
    let (interceptors, namespace) = {
        let tree = zone.tree.borrow();
        (
            tree.interceptors().to_vec(),
            tree.full_name(target.namespace).to_string(),
        )
    };
    for interceptor in interceptors
        .iter()
        .filter(|interceptor| interceptor.selector.matches(&namespace, &target.name))
    {
        tracing::debug!(binding = %full_name, from = %interceptor.namespace, "applying interceptor");
        let wrap = |source: BoxError| ZoneError::Interceptor {
            binding: full_name.to_string(),
            source,
        };
        let transform = build_transform(zone, interceptor).map_err(|err| wrap(Box::new(err)))?;
        value = transform
            .apply(value, &namespace, &target.name)
            .map_err(wrap)?;
    }
    Ok(value)
}

fn build_transform(zone: &Rc<ZoneInner>, interceptor: &Interceptor) -> Result<Transform> {
    let namespace = zone.tree.borrow_mut().find_or_create(&interceptor.namespace)?;
    let produced = inject_function(
        zone,
        namespace,
        AccessLevel::Private,
        &interceptor.descriptor,
        false,
    )?
    .call(&[])?;
    Ok(produced.downcast::<Transform>()?.as_ref().clone())
}
