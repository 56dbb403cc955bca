use serde::{Serialize, Serializer};

use crate::ast::Value;

/// Where a package is obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    /// A package registry, addressed by URL.
    Registry,
    /// A filesystem path.
    Path,
    /// A git repository.
    Git,
}

/// Effective source of one dependency, either inherited from an
/// enclosing `source` declaration or set by an explicit
/// `source:`/`path:`/`git:` option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(rename = "details")]
    pub location: String,
}

impl SourceDescriptor {
    #[must_use]
    pub fn registry(location: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Registry,
            location: location.into(),
        }
    }

    #[must_use]
    pub fn path(location: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Path,
            location: location.into(),
        }
    }

    #[must_use]
    pub fn git(location: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Git,
            location: location.into(),
        }
    }
}

/// Git checkout details from `git:` plus `branch:`/`ref:`/`tag:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitDescriptor {
    pub url: String,
    pub branch: Option<String>,
    pub reference: Option<String>,
    pub tag: Option<String>,
}

/// One extracted dependency.
///
/// Serializes to the wire shape consumed by resolvers and installers:
/// `requirement` joins its constraint segments, `git` flattens to the
/// repository location, and unrecognized options (`extra`) stay
/// in-memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub name: String,
    #[serde(serialize_with = "join_constraints")]
    pub requirement: Vec<String>,
    /// Group names in accumulation order; never empty.
    pub groups: Vec<String>,
    pub source: Option<SourceDescriptor>,
    #[serde(serialize_with = "git_location")]
    pub git: Option<GitDescriptor>,
    pub platforms: Vec<String>,
    pub branch: Option<String>,
    /// Options with keys the extractor does not interpret, preserved
    /// in written order.
    #[serde(skip)]
    pub extra: Vec<(String, Value)>,
}

/// A construct the extractor skipped instead of evaluating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub line: usize,
    pub message: String,
}

/// Result of extracting one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Extraction {
    /// Dependency records in textual encounter order.
    pub dependencies: Vec<DependencyRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruby_version: Option<String>,
    pub warnings: Vec<Warning>,
}

fn join_constraints<S: Serializer>(requirement: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&requirement.join(", "))
}

fn git_location<S: Serializer>(
    git: &Option<GitDescriptor>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match git {
        Some(descriptor) => serializer.serialize_some(&descriptor.url),
        None => serializer.serialize_none(),
    }
}
