//! Fluent API for configuring and building containers.

use std::path::PathBuf;

use zone_common::config::ZoneConfig;
use zone_common::error::Result;
use zone_compose::{Manifest, apply};
use zone_core::Zone;

use crate::host::{self, HostEnvironment};

/// Builder for configuring a container before use.
#[derive(Debug, Clone, Default)]
pub struct ZoneBuilder {
    config: ZoneConfig,
}

impl ZoneBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder starting from an existing configuration.
    #[must_use]
    pub const fn from_config(config: ZoneConfig) -> Self {
        Self { config }
    }

    /// Sets the binding manifest applied on build.
    #[must_use]
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.manifest = Some(path.into());
        self
    }

    /// Sets the directory handed to `$storage`.
    #[must_use]
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = dir.into();
        self
    }

    /// Sets whether the host bindings are registered in the root.
    #[must_use]
    pub const fn host_bindings(mut self, install: bool) -> Self {
        self.config.install_host_bindings = install;
        self
    }

    /// Sets whether path lookups may create namespaces.
    #[must_use]
    pub const fn implicit_namespaces(mut self, allow: bool) -> Self {
        self.config.allow_implicit_namespaces = allow;
        self
    }

    /// Configuration the builder will use.
    #[must_use]
    pub const fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Builds the container: host bindings first, then the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded, fails validation,
    /// or collides with a host binding.
    pub fn build(self) -> Result<Zone> {
        let manifest = self.config.manifest.clone();
        let install = self.config.install_host_bindings;
        let storage_dir = self.config.storage_dir.clone();
        let zone = Zone::with_config(self.config);

        if install {
            host::install(&zone, HostEnvironment::new(storage_dir))?;
        }
        if let Some(path) = manifest {
            let manifest = Manifest::load(&path)?;
            let _ = apply(&manifest, &zone)?;
        }
        Ok(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_installs_host_bindings() {
        let zone = ZoneBuilder::new().storage_dir("/tmp/zone").build().expect("build");
        assert_eq!(zone.names().len(), 4);
        assert!(zone.config().install_host_bindings);
    }

    #[test]
    fn host_bindings_can_be_disabled() {
        let zone = ZoneBuilder::new().host_bindings(false).build().expect("build");
        assert!(zone.names().is_empty());
    }

    #[test]
    fn setters_update_config() {
        let builder = ZoneBuilder::new()
            .manifest("app.yaml")
            .storage_dir("/srv/zone")
            .implicit_namespaces(false);
        let config = builder.config();
        assert_eq!(config.manifest.as_deref(), Some(std::path::Path::new("app.yaml")));
        assert_eq!(config.storage_dir, PathBuf::from("/srv/zone"));
        assert!(!config.allow_implicit_namespaces);
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let err = ZoneBuilder::new()
            .host_bindings(false)
            .manifest("/nonexistent/zone.yaml")
            .build()
            .expect_err("missing file");
        assert!(matches!(err, zone_common::error::ZoneError::Io { .. }));
    }
}
