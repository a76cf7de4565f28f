//! Descriptors: recipes for producing a binding's value.
//!
//! A [`Descriptor`] is either a literal [`Instance`] or a
//! [`FunctionDescriptor`], which pairs an explicit, ordered list of
//! dependency names with a [`Producer`]. Dependency names are always
//! declared up front; nothing is inferred from the producer itself.

use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

use zone_common::error::{BoxError, Result, ZoneError};
use zone_common::names::{DependencyName, SigilPolicy};

use crate::instance::Instance;
use crate::namespace::Namespace;

/// Result returned by producers.
pub type ProducerResult = std::result::Result<Instance, BoxError>;

type ProducerFn = dyn Fn(&Invocation<'_>) -> ProducerResult;

/// Arguments handed to a producer when it is invoked.
///
/// Arguments appear in the order the dependency names were declared. An
/// optional dependency that could not be found, or a free parameter the
/// caller did not supply, is `None`.
#[derive(Debug)]
pub struct Invocation<'a> {
    receiver: Option<&'a Namespace>,
    args: &'a [Option<Instance>],
    constructing: bool,
}

impl<'a> Invocation<'a> {
    pub(crate) const fn new(
        receiver: Option<&'a Namespace>,
        args: &'a [Option<Instance>],
        constructing: bool,
    ) -> Self {
        Self {
            receiver,
            args,
            constructing,
        }
    }

    /// The namespace bound as the implicit receiver.
    ///
    /// Constructor producers build a fresh value and receive no receiver.
    #[must_use]
    pub const fn receiver(&self) -> Option<&'a Namespace> {
        self.receiver
    }

    /// Returns `true` when invoked with constructor semantics.
    #[must_use]
    pub const fn is_construction(&self) -> bool {
        self.constructing
    }

    /// Number of argument slots.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if the producer declared no dependencies.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// All argument slots in declaration order.
    #[must_use]
    pub const fn args(&self) -> &'a [Option<Instance>] {
        self.args
    }

    /// The argument at `index`, if it holds a value.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&'a Instance> {
        self.args.get(index).and_then(Option::as_ref)
    }

    /// The argument at `index` as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::NotFound`] if the slot holds no value and
    /// [`ZoneError::TypeMismatch`] if it holds another type.
    pub fn required<T: Any>(&self, index: usize) -> Result<Rc<T>> {
        self.arg(index)
            .ok_or_else(|| ZoneError::NotFound {
                kind: "argument",
                id: index.to_string(),
            })?
            .downcast::<T>()
    }

    /// The argument at `index` as a `T`, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::TypeMismatch`] if the slot holds another type.
    pub fn optional<T: Any>(&self, index: usize) -> Result<Option<Rc<T>>> {
        self.arg(index).map(Instance::downcast::<T>).transpose()
    }
}

/// A shared producer function with an optionally known arity.
#[derive(Clone)]
pub struct Producer {
    arity: Option<usize>,
    call: Rc<ProducerFn>,
}

impl Producer {
    /// Wraps a producer whose arity is not checked against its declared
    /// dependency names.
    pub fn new(call: impl Fn(&Invocation<'_>) -> ProducerResult + 'static) -> Self {
        Self {
            arity: None,
            call: Rc::new(call),
        }
    }

    /// Wraps a producer that consumes exactly `arity` arguments.
    pub fn with_arity(
        arity: usize,
        call: impl Fn(&Invocation<'_>) -> ProducerResult + 'static,
    ) -> Self {
        Self {
            arity: Some(arity),
            call: Rc::new(call),
        }
    }

    /// Declared arity, if known.
    #[must_use]
    pub const fn arity(&self) -> Option<usize> {
        self.arity
    }

    pub(crate) fn invoke(&self, invocation: &Invocation<'_>) -> ProducerResult {
        (self.call)(invocation)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A producer together with its ordered dependency names.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    names: Vec<String>,
    producer: Producer,
    constructor: bool,
}

impl FunctionDescriptor {
    /// Pairs dependency names with a producer.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::ArityMismatch`] if the producer's arity is known
    /// and differs from the number of names.
    pub fn new<I, S>(names: I, producer: Producer) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(arity) = producer.arity() {
            if arity != names.len() {
                return Err(ZoneError::ArityMismatch {
                    declared: names.len(),
                    arity,
                });
            }
        }
        Ok(Self {
            names,
            producer,
            constructor: false,
        })
    }

    /// Pairs dependency names with a closure. The closure receives one
    /// argument slot per name.
    pub fn from_fn<I, S>(
        names: I,
        call: impl Fn(&Invocation<'_>) -> ProducerResult + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            producer: Producer::new(call),
            constructor: false,
        }
    }

    /// Like [`new`](Self::new), flagged for constructor semantics.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::ArityMismatch`] as [`new`](Self::new) does.
    pub fn constructor<I, S>(names: I, producer: Producer) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, producer).map(Self::into_constructor)
    }

    /// Flags this descriptor for constructor semantics.
    #[must_use]
    pub fn into_constructor(mut self) -> Self {
        self.constructor = true;
        self
    }

    /// Declared dependency names, markers included.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` for constructor descriptors.
    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        self.constructor
    }

    /// The wrapped producer.
    #[must_use]
    pub const fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Parses every dependency name under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDependency`] for the first malformed name.
    pub fn dependencies(&self, policy: SigilPolicy) -> Result<Vec<DependencyName>> {
        self.names
            .iter()
            .map(|name| DependencyName::parse(name, policy))
            .collect()
    }
}

/// How a binding's value is produced.
#[derive(Debug, Clone)]
pub enum Descriptor {
    /// A literal value.
    Value(Instance),
    /// A producer with declared dependencies.
    Function(FunctionDescriptor),
}

impl Descriptor {
    /// Wraps `value` as a literal. An [`Instance`] or a value
    /// [`Descriptor`] is taken as-is rather than wrapped again.
    #[must_use]
    pub fn value<T: Any>(value: T) -> Self {
        let boxed: Box<dyn Any> = Box::new(value);
        let boxed = match boxed.downcast::<Self>() {
            Ok(descriptor) => {
                return match *descriptor {
                    literal @ Self::Value(_) => literal,
                    function @ Self::Function(_) => Self::Value(Instance::new(function)),
                };
            }
            Err(other) => other,
        };
        match boxed.downcast::<Instance>() {
            Ok(instance) => Self::Value(*instance),
            Err(other) => Self::Value(Instance::from_boxed(other, type_name::<T>())),
        }
    }

    /// Best-guess descriptor: descriptors are kept, function descriptors
    /// become function descriptors, anything else is a literal value.
    #[must_use]
    pub fn guess<T: Any>(input: T) -> Self {
        let boxed: Box<dyn Any> = Box::new(input);
        let boxed = match boxed.downcast::<Self>() {
            Ok(descriptor) => return *descriptor,
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<FunctionDescriptor>() {
            Ok(function) => return Self::Function(*function),
            Err(other) => other,
        };
        match boxed.downcast::<Instance>() {
            Ok(instance) => Self::Value(*instance),
            Err(other) => Self::Value(Instance::from_boxed(other, type_name::<T>())),
        }
    }

    /// Returns `true` for function descriptors.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }
}

impl From<FunctionDescriptor> for Descriptor {
    fn from(function: FunctionDescriptor) -> Self {
        Self::Function(function)
    }
}

impl From<Instance> for Descriptor {
    fn from(instance: Instance) -> Self {
        Self::Value(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Producer {
        Producer::with_arity(1, |_| Ok(Instance::new(())))
    }

    #[test]
    fn arity_must_match_declared_names() {
        assert!(FunctionDescriptor::new(["foo"], unit()).is_ok());
        let err = FunctionDescriptor::new(["foo", "bar"], unit()).expect_err("mismatch");
        assert!(matches!(
            err,
            ZoneError::ArityMismatch {
                declared: 2,
                arity: 1
            }
        ));
    }

    #[test]
    fn unknown_arity_is_not_checked() {
        let descriptor = FunctionDescriptor::new(["a", "b", "c"], Producer::new(|_| {
            Ok(Instance::new(()))
        }))
        .expect("unchecked");
        assert_eq!(descriptor.names().len(), 3);
        assert!(!descriptor.is_constructor());
    }

    #[test]
    fn constructor_flag_is_set() {
        let descriptor = FunctionDescriptor::constructor(["foo"], unit()).expect("valid");
        assert!(descriptor.is_constructor());
    }

    #[test]
    fn value_descriptor_is_idempotent() {
        let first = Descriptor::value(7_i32);
        let Descriptor::Value(original) = first.clone() else {
            unreachable!("literal");
        };
        let Descriptor::Value(again) = Descriptor::value(first) else {
            unreachable!("literal");
        };
        assert!(original.ptr_eq(&again));
        assert_eq!(again.downcast_ref::<i32>(), Some(&7));
    }

    #[test]
    fn guess_keeps_function_descriptors() {
        let function = FunctionDescriptor::from_fn(["foo"], |_| Ok(Instance::new(())));
        assert!(Descriptor::guess(function).is_function());
        assert!(!Descriptor::guess("bar").is_function());
    }

    #[test]
    fn guess_wraps_plain_values_with_their_type() {
        let Descriptor::Value(instance) = Descriptor::guess(String::from("bar")) else {
            unreachable!("literal");
        };
        assert_eq!(instance.downcast_ref::<String>().map(String::as_str), Some("bar"));
        assert!(instance.type_name().contains("String"));
    }

    #[test]
    fn dependencies_honour_policy() {
        let descriptor = FunctionDescriptor::from_fn(["foo", "#x"], |_| Ok(Instance::new(())));
        assert!(descriptor.dependencies(SigilPolicy::INJECTION).is_ok());
        assert!(descriptor.dependencies(SigilPolicy::DEFINITION).is_err());
    }
}
