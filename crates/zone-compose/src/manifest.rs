//! Manifest model and loading.
//!
//! A manifest lists namespaces by dotted path. Each entry may set the
//! namespace's imports and declare three kinds of bindings: `values`,
//! `constants` (frozen once bound) and `aliases` (bindings that yield the
//! value of another, possibly optional, dependency).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zone_common::error::{Result, ZoneError};
use zone_common::names::split_access;

/// A parsed binding manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Namespace entries, applied in order.
    #[serde(default)]
    pub namespaces: Vec<NamespaceSpec>,
}

/// One namespace entry of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceSpec {
    /// Dotted path of the namespace; empty for the root.
    #[serde(default)]
    pub path: String,
    /// Namespaces this one imports, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,
    /// Literal bindings, keyed by sigil-prefixed local name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, serde_json::Value>,
    /// Constant bindings, keyed by sigil-prefixed local name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constants: BTreeMap<String, serde_json::Value>,
    /// Alias bindings: local name to dependency name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
}

/// Kind of a binding declared in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// Literal value.
    Value,
    /// Frozen literal value.
    Constant,
    /// Alias of another binding.
    Alias,
}

impl NamespaceSpec {
    /// Every declared binding as `(kind, raw name)`, values first.
    pub fn declared(&self) -> impl Iterator<Item = (BindingKind, &str)> {
        self.values
            .keys()
            .map(|name| (BindingKind::Value, name.as_str()))
            .chain(
                self.constants
                    .keys()
                    .map(|name| (BindingKind::Constant, name.as_str())),
            )
            .chain(
                self.aliases
                    .keys()
                    .map(|name| (BindingKind::Alias, name.as_str())),
            )
    }

    /// Number of declared bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.values.len() + self.constants.len() + self.aliases.len()
    }
}

impl Manifest {
    /// Parses a YAML manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Config`] if the text is not a valid manifest.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|err| ZoneError::Config {
            message: format!("invalid manifest: {err}"),
        })
    }

    /// Parses a JSON manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Serialization`] if the text is not a valid
    /// manifest.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a manifest from disk. Files ending in `.json` are parsed as
    /// JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Io`] if the file cannot be read and a parse
    /// error if its content is not a valid manifest.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading manifest");
        let text = std::fs::read_to_string(path).map_err(|source| ZoneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Finds the entry for a namespace path.
    #[must_use]
    pub fn namespace(&self, path: &str) -> Option<&NamespaceSpec> {
        self.namespaces.iter().find(|spec| spec.path == path)
    }

    /// Finds the declared binding `local` in namespace `path`, returning its
    /// kind and raw (sigil-prefixed) name.
    #[must_use]
    pub fn binding(&self, path: &str, local: &str) -> Option<(BindingKind, &str)> {
        self.namespace(path)?
            .declared()
            .find(|(_, raw)| split_access(raw).1 == local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
namespaces:
  - path: shared
    values:
      url: "postgres://localhost/app"
  - path: app.db
    imports: [shared]
    values:
      "-secret": s3cr3t
    constants:
      retries: 3
    aliases:
      conn: url
      "#backup": "?shared.backup"
"##;

    #[test]
    fn yaml_manifest_parses() {
        let manifest = Manifest::from_yaml(SAMPLE).expect("should parse");
        assert_eq!(manifest.namespaces.len(), 2);
        let db = manifest.namespace("app.db").expect("app.db");
        assert_eq!(db.imports.as_deref(), Some(&["shared".to_string()][..]));
        assert_eq!(db.constants.get("retries"), Some(&serde_json::json!(3)));
        assert_eq!(db.aliases.get("conn").map(String::as_str), Some("url"));
        assert_eq!(db.binding_count(), 4);
    }

    #[test]
    fn bindings_are_found_without_sigils() {
        let manifest = Manifest::from_yaml(SAMPLE).expect("should parse");
        assert_eq!(
            manifest.binding("app.db", "secret"),
            Some((BindingKind::Value, "-secret"))
        );
        assert_eq!(
            manifest.binding("app.db", "backup"),
            Some((BindingKind::Alias, "#backup"))
        );
        assert!(manifest.binding("app.db", "missing").is_none());
        assert!(manifest.binding("nowhere", "url").is_none());
    }

    #[test]
    fn json_manifest_parses() {
        let manifest = Manifest::from_json(
            r#"{ "namespaces": [ { "path": "", "values": { "answer": 42 } } ] }"#,
        )
        .expect("should parse");
        let root = manifest.namespace("").expect("root");
        assert_eq!(root.values.get("answer"), Some(&serde_json::json!(42)));
        assert!(root.imports.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Manifest::from_yaml("namespaces:\n  - path: a\n    factories: {}\n")
            .expect_err("unknown field");
        assert!(err.to_string().contains("factories"));
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let yaml = dir.path().join("zone.yaml");
        let json = dir.path().join("zone.json");
        std::fs::write(&yaml, SAMPLE).expect("write yaml");
        std::fs::write(&json, r#"{ "namespaces": [] }"#).expect("write json");

        assert_eq!(Manifest::load(&yaml).expect("yaml").namespaces.len(), 2);
        assert!(Manifest::load(&json).expect("json").namespaces.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Manifest::load(Path::new("/nonexistent/zone.yaml")).expect_err("missing");
        assert!(matches!(err, ZoneError::Io { .. }));
    }
}
