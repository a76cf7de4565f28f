//! Unified error types for the zone workspace.
//!
//! Every failure the engine can report is a variant of [`ZoneError`].
//! Failures raised while producing a binding are wrapped with the binding's
//! full name, so the original error stays reachable through
//! [`std::error::Error::source`].

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by user-supplied producers, selectors and transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// A binding or namespace name is empty or contains a `.`.
    #[error("invalid name to bind: \"{name}\"")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A dependency name carries misplaced, combined or disallowed sigils.
    #[error("invalid injection parameter: \"{name}\"")]
    InvalidDependency {
        /// The rejected dependency name.
        name: String,
    },

    /// A free (`#`) parameter was used where the caller cannot supply it.
    #[error("free argument \"{name}\" is not allowed here")]
    FreeArgumentNotAllowed {
        /// The free parameter name.
        name: String,
    },

    /// The local name is already bound in the namespace.
    #[error("name {name} already bound in namespace \"{namespace}\"")]
    AlreadyBound {
        /// Full name of the namespace.
        namespace: String,
        /// Local name that was bound twice.
        name: String,
    },

    /// The namespace has been traversed by a lookup and accepts no new bindings.
    #[error("namespace \"{namespace}\" is sealed")]
    Sealed {
        /// Full name of the sealed namespace.
        namespace: String,
    },

    /// The namespace imports have already been set.
    #[error("namespace \"{namespace}\" has already been configured")]
    AlreadyConfigured {
        /// Full name of the namespace.
        namespace: String,
    },

    /// The declared dependency names do not match the producer's arity.
    #[error("formals and parameter names do not match: {declared} names for a producer of arity {arity}")]
    ArityMismatch {
        /// Number of declared dependency names.
        declared: usize,
        /// Number of arguments the producer accepts.
        arity: usize,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// An import refers to a namespace that does not exist.
    #[error("invalid import \"{import}\" in namespace \"{namespace}\"")]
    InvalidImport {
        /// Full name of the importing namespace.
        namespace: String,
        /// The dangling import.
        import: String,
    },

    /// A binding or import chain refers back to itself.
    #[error("cyclic dependency: {name}")]
    CyclicDependency {
        /// Binding or namespace on the cycle.
        name: String,
    },

    /// Producing a binding failed.
    #[error("failed to resolve {binding}: {source}")]
    Resolution {
        /// Full name of the binding.
        binding: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// An interceptor could not be built or its transform failed.
    #[error("interceptor for {binding} failed: {source}")]
    Interceptor {
        /// Full name of the intercepted binding.
        binding: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// A producer invoked outside of any binding failed.
    #[error("injected function failed: {source}")]
    Invocation {
        /// Underlying failure.
        source: BoxError,
    },

    /// An instance does not hold the requested type.
    #[error("expected an instance of {expected}, found {actual}")]
    TypeMismatch {
        /// Requested type.
        expected: &'static str,
        /// Type actually held.
        actual: &'static str,
    },

    /// The instance is a constant and cannot be mutated.
    #[error("instance of {type_name} is a constant and cannot be mutated")]
    Frozen {
        /// Type held by the instance.
        type_name: &'static str,
    },

    /// The instance is shared with other holders and cannot be mutated.
    #[error("instance of {type_name} is shared and cannot be mutated")]
    Shared {
        /// Type held by the instance.
        type_name: &'static str,
    },

    /// A configuration or manifest value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl ZoneError {
    /// Returns `true` if this error, or any error in its source chain, is a
    /// cyclic-dependency failure.
    pub fn is_cyclic(&self) -> bool {
        self.any_in_chain(|err| matches!(err, Self::CyclicDependency { .. }))
    }

    /// Returns `true` if this error, or any error in its source chain, is a
    /// failure to find a binding or namespace.
    pub fn is_not_found(&self) -> bool {
        self.any_in_chain(|err| matches!(err, Self::NotFound { .. }))
    }

    fn any_in_chain(&self, predicate: impl Fn(&Self) -> bool) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            if err.downcast_ref::<Self>().is_some_and(&predicate) {
                return true;
            }
            current = err.source();
        }
        false
    }

    /// Converts a boxed producer error back into a [`ZoneError`], keeping
    /// nested zone errors intact and wrapping anything else as an
    /// [`Invocation`](Self::Invocation) failure.
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<Self>() {
            Ok(zone) => *zone,
            Err(other) => Self::Invocation { source: other },
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ZoneError>;
