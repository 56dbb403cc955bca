use crate::ast::{DependencyDecl, Statement, Value};
use crate::parser::{ParseError, ParseErrorKind};
use crate::record::{DependencyRecord, Extraction, GitDescriptor, SourceDescriptor, Warning};

/// Option keys the extractor interprets. Anything else is carried on
/// the record's `extra` map untouched.
const RECOGNIZED_KEYS: [&str; 11] = [
    "platforms",
    "platform",
    "source",
    "git",
    "branch",
    "ref",
    "tag",
    "path",
    "require",
    "group",
    "groups",
];

/// Extraction configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Promote unsupported constructs from warnings to a fatal
    /// [`ParseError`].
    pub strict: bool,
}

/// Walk a statement tree and emit one dependency record per
/// declaration, in textual encounter order.
///
/// # Errors
///
/// Never fails on a well-formed statement tree unless
/// `options.strict` is set, in which case the first unsupported
/// construct aborts with a `ParseError` at its span.
pub fn extract(
    statements: &[Statement],
    options: &ExtractOptions,
) -> Result<Extraction, ParseError> {
    let mut extractor = Extractor {
        options,
        out: Extraction::default(),
    };
    extractor.walk(statements, &Context::default())?;
    Ok(extractor.out)
}

/// Traversal context: pushed on block entry, popped on exit. The
/// clone-per-scope discipline keeps mutation strictly stack-shaped.
#[derive(Debug, Clone, Default)]
struct Context {
    groups: Vec<String>,
    platforms: Vec<String>,
    source: Option<SourceDescriptor>,
}

struct Extractor<'a> {
    options: &'a ExtractOptions,
    out: Extraction,
}

impl Extractor<'_> {
    fn walk(&mut self, statements: &[Statement], context: &Context) -> Result<(), ParseError> {
        let mut context = context.clone();

        for statement in statements {
            match statement {
                Statement::Source(decl) => {
                    let Some(url) = decl.url.as_str() else {
                        continue;
                    };
                    let source = SourceDescriptor::registry(url);
                    match &decl.body {
                        // Plain form rebinds the source for the
                        // following siblings, not retroactively.
                        None => context.source = Some(source),
                        Some(body) => {
                            let mut scoped = context.clone();
                            scoped.source = Some(source);
                            self.walk(body, &scoped)?;
                        }
                    }
                }
                Statement::Group(block) => {
                    let mut scoped = context.clone();
                    for name in &block.names {
                        push_unique(&mut scoped.groups, name);
                    }
                    self.walk(&block.body, &scoped)?;
                }
                Statement::Platforms(block) => {
                    let mut scoped = context.clone();
                    for name in &block.names {
                        push_unique(&mut scoped.platforms, name);
                    }
                    self.walk(&block.body, &scoped)?;
                }
                Statement::RubyPin(pin) => {
                    self.out.ruby_version = Some(pin.value.clone());
                }
                Statement::Dependency(decl) => {
                    self.out.dependencies.push(build_record(decl, &context));
                }
                Statement::Unsupported(stmt) => {
                    if self.options.strict {
                        return Err(ParseError {
                            kind: ParseErrorKind::UnsupportedConstruct {
                                construct: stmt.construct.clone(),
                            },
                            span: stmt.span,
                        });
                    }
                    self.out.warnings.push(Warning {
                        line: stmt.span.line,
                        message: format!("unsupported construct `{}`", stmt.construct),
                    });
                }
            }
        }

        Ok(())
    }
}

fn build_record(decl: &DependencyDecl, context: &Context) -> DependencyRecord {
    // The `group:` option acts as one more enclosing group block; the
    // "default" group applies only when nothing else claims the gem.
    let mut groups = context.groups.clone();
    for name in option_names(decl, &["group", "groups"]) {
        push_unique(&mut groups, name);
    }
    if groups.is_empty() {
        groups.push("default".to_string());
    }

    let mut platforms = context.platforms.clone();
    for name in option_names(decl, &["platforms", "platform"]) {
        push_unique(&mut platforms, name);
    }

    let branch = last_option_str(decl, "branch");

    let git = last_option(decl, "git")
        .and_then(Value::as_str)
        .map(|url| GitDescriptor {
            url: url.to_string(),
            branch: branch.clone(),
            reference: last_option_str(decl, "ref"),
            tag: last_option_str(decl, "tag"),
        });

    // Explicit per-dependency options always win over the inherited
    // source.
    let source = last_option_str(decl, "path").map(SourceDescriptor::path).or_else(|| {
        last_option_str(decl, "source").map(SourceDescriptor::registry)
    });
    let source = match (source, &git) {
        (Some(explicit), _) => Some(explicit),
        (None, Some(descriptor)) => Some(SourceDescriptor::git(descriptor.url.clone())),
        (None, None) => context.source.clone(),
    };

    let extra = decl
        .options
        .iter()
        .filter(|(key, _)| !RECOGNIZED_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();

    DependencyRecord {
        name: decl.name.clone(),
        requirement: decl.version_constraints.clone(),
        groups,
        source,
        git,
        platforms,
        branch,
        extra,
    }
}

fn last_option<'a>(decl: &'a DependencyDecl, key: &str) -> Option<&'a Value> {
    decl.options
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value)
}

fn last_option_str(decl: &DependencyDecl, key: &str) -> Option<String> {
    last_option(decl, key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn option_names<'a>(decl: &'a DependencyDecl, keys: &[&str]) -> Vec<&'a str> {
    keys.iter()
        .filter_map(|key| last_option(decl, key))
        .flat_map(Value::names)
        .collect()
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|existing| existing == name) {
        list.push(name.to_string());
    }
}
