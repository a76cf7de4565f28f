//! # zone-sdk
//!
//! Public SDK for embedding zone containers in an application.
//!
//! Provides three main entry points:
//! - [`ZoneBuilder`](builder::ZoneBuilder): builds a container from a
//!   [`ZoneConfig`](zone_common::config::ZoneConfig), installing host
//!   bindings and applying a manifest.
//! - [`host`]: the `$host`, `$console`, `$storage` and `$Worker`
//!   collaborator bindings.
//! - [`ManifestPlanner`](planner::ManifestPlanner): validates a manifest and
//!   reports its namespaces, bindings and alias resolution order.
//!
//! # Example
//!
//! ```rust,no_run
//! use zone_sdk::builder::ZoneBuilder;
//! use zone_sdk::host::Console;
//!
//! let zone = ZoneBuilder::new().manifest("zone.yaml").build()?;
//! let console = zone.get_as::<Console>("$console")?;
//! console.info("container ready");
//! # Ok::<(), zone_common::error::ZoneError>(())
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod builder;
pub mod host;
pub mod planner;

pub use zone_core::{FunctionDescriptor, Instance, Namespace, Zone};
