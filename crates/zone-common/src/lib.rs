//! # zone-common
//!
//! Shared error definitions, the binding-name grammar, configuration models
//! and constants used across the entire zone workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives the engine, the manifest
//! loader and the CLI build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod names;
pub mod types;
