//! # zone-compose
//!
//! Declarative binding manifests for zone containers.
//!
//! Handles:
//! - **Manifest**: the YAML/JSON model of namespaces, imports and bindings.
//! - **Validator**: static checks run before a manifest touches a container.
//! - **Graph**: the alias dependency graph and its resolution order.
//! - **Apply**: registering a validated manifest into a [`zone_core::Zone`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod apply;
pub mod graph;
pub mod manifest;
pub mod validator;

pub use apply::{ApplySummary, apply};
pub use manifest::{Manifest, NamespaceSpec};
