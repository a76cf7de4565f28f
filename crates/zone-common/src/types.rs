//! Domain primitive types used across the zone workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility of a binding relative to the namespace searching for it.
///
/// Levels are ordered: a binding is accessible when its level is at or below
/// the level the searcher is entitled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Visible to any namespace.
    Public,
    /// Visible within the defining namespace and its descendants.
    Protected,
    /// Visible only within the exact defining namespace.
    Private,
}

impl AccessLevel {
    /// Returns the sigil that denotes this level in a binding name.
    #[must_use]
    pub const fn sigil(self) -> &'static str {
        match self {
            Self::Public => "",
            Self::Protected => "#",
            Self::Private => "-",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// A dotted name split at its last `.` into a namespace path and a local name.
///
/// `"a.b.foo"` becomes namespace `Some("a.b")` and local `"foo"`; a name
/// without a dot has no namespace part and is resolved relative to the
/// namespace where the search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamePath<'a> {
    /// Containing namespace path, if the name was dotted.
    pub namespace: Option<&'a str>,
    /// Local name inside the containing namespace.
    pub local: &'a str,
}

impl<'a> NamePath<'a> {
    /// Splits `name` at its last `.`.
    #[must_use]
    pub fn parse(name: &'a str) -> Self {
        match name.rfind('.') {
            Some(idx) => Self {
                namespace: Some(&name[..idx]),
                local: &name[idx + 1..],
            },
            None => Self {
                namespace: None,
                local: name,
            },
        }
    }
}

/// Joins a namespace full name and a local name.
#[must_use]
pub fn full_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}.{local}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_levels_are_ordered() {
        assert!(AccessLevel::Public < AccessLevel::Protected);
        assert!(AccessLevel::Protected < AccessLevel::Private);
        assert_eq!(
            AccessLevel::Private.min(AccessLevel::Protected),
            AccessLevel::Protected
        );
    }

    #[test]
    fn name_path_splits_at_last_dot() {
        let path = NamePath::parse("a.b.foo");
        assert_eq!(path.namespace, Some("a.b"));
        assert_eq!(path.local, "foo");
    }

    #[test]
    fn name_path_without_dot_is_relative() {
        let path = NamePath::parse("foo");
        assert_eq!(path.namespace, None);
        assert_eq!(path.local, "foo");
    }

    #[test]
    fn full_name_of_root_child_has_no_dot() {
        assert_eq!(full_name("", "foo"), "foo");
        assert_eq!(full_name("a.b", "foo"), "a.b.foo");
    }
}
