//! Type-erased values produced by bindings.
//!
//! An [`Instance`] is a shared handle to a value of any `'static` type.
//! Resolving the same binding twice yields two handles to the same
//! allocation, which [`Instance::ptr_eq`] observes.

use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

use zone_common::error::{Result, ZoneError};

/// A shared, type-erased value.
#[derive(Clone)]
pub struct Instance {
    type_name: &'static str,
    inner: Rc<dyn Any>,
    frozen: bool,
}

impl Instance {
    /// Wraps a value.
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            inner: Rc::new(value),
            frozen: false,
        }
    }

    /// Wraps an already shared value without copying it.
    #[must_use]
    pub fn from_rc<T: Any>(value: Rc<T>) -> Self {
        Self {
            type_name: type_name::<T>(),
            inner: value,
            frozen: false,
        }
    }

    pub(crate) fn from_boxed(value: Box<dyn Any>, type_name: &'static str) -> Self {
        Self {
            type_name,
            inner: Rc::from(value),
            frozen: false,
        }
    }

    /// Marks this handle as a constant: [`get_mut`](Self::get_mut) is
    /// rejected from then on. Interior mutability inside the payload is not
    /// affected.
    #[must_use]
    pub const fn freeze(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Returns `true` if the instance is a constant.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Name of the wrapped type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the wrapped value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Returns a shared handle to the wrapped value as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::TypeMismatch`] if the value is not a `T`.
    pub fn downcast<T: Any>(&self) -> Result<Rc<T>> {
        Rc::clone(&self.inner).downcast::<T>().map_err(|_| ZoneError::TypeMismatch {
            expected: type_name::<T>(),
            actual: self.type_name,
        })
    }

    /// Mutably borrows the wrapped value, provided this handle is its only
    /// holder and it is not a constant.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Frozen`] for constants, [`ZoneError::TypeMismatch`]
    /// if the value is not a `T`, and [`ZoneError::Shared`] if other handles
    /// to the value exist (for example the memoized copy held by a binding).
    pub fn get_mut<T: Any>(&mut self) -> Result<&mut T> {
        if self.frozen {
            return Err(ZoneError::Frozen {
                type_name: self.type_name,
            });
        }
        if !self.inner.is::<T>() {
            return Err(ZoneError::TypeMismatch {
                expected: type_name::<T>(),
                actual: self.type_name,
            });
        }
        let type_name = self.type_name;
        Rc::get_mut(&mut self.inner)
            .and_then(|value| value.downcast_mut::<T>())
            .ok_or(ZoneError::Shared { type_name })
    }

    /// Returns `true` if both handles point at the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}
