//! Global configuration model for zone containers and the CLI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for building a zone container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Binding manifest to load, if any.
    pub manifest: Option<PathBuf>,
    /// Directory handed to the `$storage` host binding.
    pub storage_dir: PathBuf,
    /// Whether namespaces may be created implicitly by path lookups.
    pub allow_implicit_namespaces: bool,
    /// Whether the host collaborator bindings are registered in the root.
    pub install_host_bindings: bool,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            storage_dir: crate::constants::storage_dir().clone(),
            allow_implicit_namespaces: true,
            install_host_bindings: true,
        }
    }
}

impl ZoneConfig {
    /// Parses a configuration from JSON text; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for this model.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_implicit_namespaces() {
        let config = ZoneConfig::default();
        assert!(config.allow_implicit_namespaces);
        assert!(config.install_host_bindings);
        assert!(config.manifest.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ZoneConfig::from_json(r#"{ "install_host_bindings": false }"#).expect("should parse");
        assert!(!config.install_host_bindings);
        assert!(config.allow_implicit_namespaces);
    }

    #[test]
    fn invalid_json_is_a_serialization_error() {
        let err = ZoneConfig::from_json("{ nope").expect_err("should fail");
        assert!(err.to_string().contains("serialization"));
    }
}
