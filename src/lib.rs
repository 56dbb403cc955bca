//! Gemfile lexer, parser, and dependency extractor.
//!
//! Extracts a structured, machine-readable dependency manifest from
//! the declarative subset of the Gemfile DSL without evaluating any
//! Ruby, so it is deterministic and safe to run on untrusted
//! manifests. Constructs outside the subset (conditionals,
//! interpolation, arbitrary method calls) degrade to warnings instead
//! of aborting extraction.
//!
//! # Quick start
//!
//! ## Extract dependency records from a manifest
//!
//! ```
//! use gemfile_rs::{ExtractOptions, extract_str};
//!
//! let manifest = "\
//! source 'https://rubygems.org'
//!
//! gem 'rails', '~> 6.1.3'
//!
//! group :development, :test do
//!   gem 'byebug', platforms: [:mri, :mingw]
//! end
//! ";
//! let extraction = extract_str(manifest, &ExtractOptions::default()).unwrap();
//!
//! assert_eq!(extraction.dependencies[0].name, "rails");
//! assert_eq!(extraction.dependencies[1].groups, vec!["development", "test"]);
//! ```
//!
//! ## Serialize the result as JSON
//!
//! ```
//! use gemfile_rs::{ExtractOptions, extract_str, to_json_pretty};
//!
//! let extraction = extract_str("gem 'pg', '>= 1.1'\n", &ExtractOptions::default()).unwrap();
//! let json = to_json_pretty(&extraction).unwrap();
//! assert!(json.contains("\"requirement\": \">= 1.1\""));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod extractor;
pub mod lexer;
pub mod parser;
pub mod record;
pub mod serializer;
pub mod token;

pub use ast::{
    DependencyDecl, GroupBlock, PlatformBlock, SourceDecl, Statement, UnsupportedStmt, Value,
    VersionPin,
};
pub use extractor::{ExtractOptions, extract};
pub use lexer::tokenize;
pub use parser::{ParseError, ParseErrorKind, parse};
pub use record::{
    DependencyRecord, Extraction, GitDescriptor, SourceDescriptor, SourceKind, Warning,
};
pub use serializer::{to_json, to_json_pretty, to_value};
pub use token::{Span, Token, TokenKind};

/// Tokenize, parse, and extract a manifest source string in one step.
pub fn extract_str(input: &str, options: &ExtractOptions) -> Result<Extraction, ParseError> {
    let tokens = tokenize(input);
    let statements = parse(&tokens)?;
    extract(&statements, options)
}
