//! Grammar of binding names and dependency names, built on `nom`.
//!
//! A binding name carries at most one leading visibility sigil:
//! `-` private, `#` protected, `+` or nothing public. A dependency name
//! carries at most one leading `?` (optional) or `#` (free) marker, and
//! neither marker may appear anywhere else in the name.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, map, opt, rest, value},
};

use crate::constants::{FREE_SIGIL, OPTIONAL_SIGIL, PATH_SEPARATOR};
use crate::error::{Result, ZoneError};
use crate::types::AccessLevel;

/// A local binding name with its visibility sigil stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingName {
    /// Visibility recorded on the binding.
    pub access: AccessLevel,
    /// Local name without sigil.
    pub name: String,
}

impl BindingName {
    /// Parses a local binding name such as `"-secret"` or `"+api"`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidName`] if the stripped name is empty or
    /// contains a `.`.
    pub fn parse(raw: &str) -> Result<Self> {
        let (access, name) = split_access(raw);
        ensure_valid_name(name)?;
        Ok(Self {
            access,
            name: name.to_string(),
        })
    }
}

/// Ensures a local name is non-empty and undotted.
///
/// # Errors
///
/// Returns [`ZoneError::InvalidName`] otherwise.
pub fn ensure_valid_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(PATH_SEPARATOR) {
        return Err(ZoneError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn access_sigil(input: &str) -> IResult<&str, AccessLevel> {
    alt((
        value(AccessLevel::Private, char('-')),
        value(AccessLevel::Protected, char('#')),
        value(AccessLevel::Public, char('+')),
    ))
    .parse(input)
}

fn access_prefixed(input: &str) -> IResult<&str, (AccessLevel, &str)> {
    (
        map(opt(access_sigil), |level| level.unwrap_or(AccessLevel::Public)),
        rest,
    )
        .parse(input)
}

/// Splits a leading visibility sigil off a (possibly dotted) name.
///
/// The sigil applies to the whole name: `"-a.b.foo"` is a private binding
/// `foo` in namespace `a.b`.
#[must_use]
pub fn split_access(raw: &str) -> (AccessLevel, &str) {
    access_prefixed(raw).map_or((AccessLevel::Public, raw), |(_, parts)| parts)
}

/// How a declared dependency is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Must be found in the namespace tree.
    Required,
    /// Yields no value when it cannot be found.
    Optional,
    /// Supplied by the caller at invocation time.
    Free,
}

/// Which dependency markers a call site accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigilPolicy {
    /// Whether `?` is accepted.
    pub optional: bool,
    /// Whether `#` is accepted.
    pub free: bool,
}

impl SigilPolicy {
    /// Bindings and interceptors: optional dependencies only.
    pub const DEFINITION: Self = Self {
        optional: true,
        free: false,
    };

    /// Caller-facing injection: optional and free dependencies.
    pub const INJECTION: Self = Self {
        optional: true,
        free: true,
    };
}

/// A parsed dependency name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyName {
    /// How the dependency is satisfied.
    pub kind: DependencyKind,
    /// Name to look up, without marker. May be dotted.
    pub name: String,
}

fn dependency_marker(input: &str) -> IResult<&str, DependencyKind> {
    alt((
        value(DependencyKind::Optional, char(OPTIONAL_SIGIL)),
        value(DependencyKind::Free, char(FREE_SIGIL)),
    ))
    .parse(input)
}

fn dependency_parts(input: &str) -> IResult<&str, (DependencyKind, &str)> {
    all_consuming((
        map(opt(dependency_marker), |kind| {
            kind.unwrap_or(DependencyKind::Required)
        }),
        take_while1(|c: char| c != OPTIONAL_SIGIL && c != FREE_SIGIL),
    ))
    .parse(input)
}

impl DependencyName {
    /// Parses a declared dependency name under the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDependency`] if markers are combined,
    /// misplaced, not accepted by `policy`, or the name is empty.
    pub fn parse(raw: &str, policy: SigilPolicy) -> Result<Self> {
        let invalid = || ZoneError::InvalidDependency {
            name: raw.to_string(),
        };
        let (_, (kind, name)) = dependency_parts(raw).map_err(|_| invalid())?;
        let accepted = match kind {
            DependencyKind::Required => true,
            DependencyKind::Optional => policy.optional,
            DependencyKind::Free => policy.free,
        };
        if !accepted {
            return Err(invalid());
        }
        Ok(Self {
            kind,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_name_without_sigil_is_public() {
        let name = BindingName::parse("foo").expect("valid");
        assert_eq!(name.access, AccessLevel::Public);
        assert_eq!(name.name, "foo");
    }

    #[test]
    fn binding_name_sigils_map_to_access() {
        assert_eq!(
            BindingName::parse("-foo").expect("valid").access,
            AccessLevel::Private
        );
        assert_eq!(
            BindingName::parse("#foo").expect("valid").access,
            AccessLevel::Protected
        );
        assert_eq!(
            BindingName::parse("+foo").expect("valid").access,
            AccessLevel::Public
        );
    }

    #[test]
    fn binding_name_rejects_empty_and_dotted() {
        assert!(BindingName::parse("").is_err());
        assert!(BindingName::parse("-").is_err());
        assert!(BindingName::parse("a.b").is_err());
    }

    #[test]
    fn dollar_names_are_plain_public_names() {
        let name = BindingName::parse("$console").expect("valid");
        assert_eq!(name.access, AccessLevel::Public);
        assert_eq!(name.name, "$console");
    }

    #[test]
    fn split_access_applies_to_dotted_names() {
        assert_eq!(split_access("-a.b.foo"), (AccessLevel::Private, "a.b.foo"));
        assert_eq!(split_access("a.b.foo"), (AccessLevel::Public, "a.b.foo"));
    }

    #[test]
    fn dependency_markers_are_parsed() {
        let dep = DependencyName::parse("?x.bar", SigilPolicy::DEFINITION).expect("valid");
        assert_eq!(dep.kind, DependencyKind::Optional);
        assert_eq!(dep.name, "x.bar");

        let dep = DependencyName::parse("#y", SigilPolicy::INJECTION).expect("valid");
        assert_eq!(dep.kind, DependencyKind::Free);
        assert_eq!(dep.name, "y");

        let dep = DependencyName::parse("foo", SigilPolicy::DEFINITION).expect("valid");
        assert_eq!(dep.kind, DependencyKind::Required);
    }

    #[test]
    fn free_marker_is_rejected_in_definitions() {
        let err = DependencyName::parse("#y", SigilPolicy::DEFINITION).expect_err("invalid");
        assert!(matches!(err, ZoneError::InvalidDependency { .. }));
    }

    #[test]
    fn combined_or_stray_markers_are_rejected() {
        for raw in ["#?x", "?#x", "x?", "a#b", "?", ""] {
            assert!(
                DependencyName::parse(raw, SigilPolicy::INJECTION).is_err(),
                "{raw} should be rejected"
            );
        }
    }
}
