use crate::token::Span;

/// Literal value appearing in statement arguments.
///
/// Hashes preserve insertion order, so re-serializing a parsed
/// manifest is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Symbol(String),
    Bool(bool),
    Nil,
    Number(i64),
    Array(Vec<Self>),
    Hash(Vec<(Self, Self)>),
}

impl Value {
    /// Return the inner string for string values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce a string or symbol to its textual name.
    ///
    /// Group and platform names may be written either way
    /// (`group :test` vs `group 'test'` in the wild).
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Flatten a value into the names it contains: a string or symbol
    /// yields itself, an array yields each string/symbol element.
    /// Anything else yields nothing.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Str(s) | Self::Symbol(s) => vec![s.as_str()],
            Self::Array(items) => items.iter().filter_map(Self::as_name).collect(),
            _ => Vec::new(),
        }
    }
}

/// One parsed statement of the declarative manifest subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Source(SourceDecl),
    Dependency(DependencyDecl),
    Group(GroupBlock),
    Platforms(PlatformBlock),
    RubyPin(VersionPin),
    Unsupported(UnsupportedStmt),
}

/// `source 'url'` or `source 'url' do ... end`.
///
/// The plain form rebinds the active source for the statements that
/// follow it in the same scope; the block form applies only to its
/// body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDecl {
    pub url: Value,
    pub body: Option<Vec<Statement>>,
    pub span: Span,
}

/// `gem 'name', 'constraint'..., key: value...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    pub name: String,
    /// Version constraint segments in written order; empty means
    /// "any version".
    pub version_constraints: Vec<String>,
    /// Keyword options in written order. Duplicate keys keep every
    /// occurrence; the extractor takes the last one.
    pub options: Vec<(String, Value)>,
    pub span: Span,
}

/// `group :a, :b do ... end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBlock {
    pub names: Vec<String>,
    pub body: Vec<Statement>,
}

/// `platforms :mri do ... end` (or the singular `platform` alias).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformBlock {
    pub names: Vec<String>,
    pub body: Vec<Statement>,
}

/// `ruby '3.2.0'` - recorded, never expanded into a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPin {
    pub value: String,
}

/// A construct outside the declarative subset, kept inert.
///
/// The parser skips past it (including a balanced `do`/`end` or
/// `if`/`end` block when one is attached) so a single unsupported
/// construct never prevents extraction of the rest of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedStmt {
    /// Leading word of the construct, for diagnostics.
    pub construct: String,
    /// Raw text of the skipped statement, token texts re-joined.
    pub text: String,
    pub span: Span,
}
