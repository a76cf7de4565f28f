//! # zone-core
//!
//! Hierarchical dependency-injection engine for the zone workspace.
//!
//! This crate provides:
//! - **Namespaces**: a dotted-path tree of scopes with imports and sealing.
//! - **Descriptors**: literal values and producers with declared dependencies.
//! - **Resolution**: visibility-aware lookup through the tree and imports,
//!   with cycle detection backed by an import graph.
//! - **Injection**: wiring producers with resolved dependencies and free
//!   call-time parameters.
//! - **Interceptors**: transforms applied once to a binding's first value.
//!
//! Everything is single-threaded and re-entrant: a producer may resolve
//! further bindings from the container while it runs.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod descriptor;
pub(crate) mod graph;
pub mod inject;
pub mod instance;
pub mod interceptor;
pub mod namespace;
pub(crate) mod resolution;
pub(crate) mod resolver;
pub mod tree;
pub mod zone;

pub use descriptor::{Descriptor, FunctionDescriptor, Invocation, Producer, ProducerResult};
pub use inject::{InjectedFunction, LazyInjection};
pub use instance::Instance;
pub use interceptor::{Selector, Transform};
pub use namespace::Namespace;
pub use tree::NamespaceId;
pub use zone::Zone;
