//! Statement parser edge cases and error tests.

use gemfile_rs::{ParseErrorKind, Statement, Value, parse, tokenize};

fn parse_input(input: &str) -> Result<Vec<Statement>, gemfile_rs::ParseError> {
    parse(&tokenize(input))
}

fn statements(input: &str) -> Vec<Statement> {
    parse_input(input).expect("parse failed")
}

// -----------------------------------------------------------
// Statement vocabulary.
// -----------------------------------------------------------

#[test]
fn parse_full_statement_mix() {
    let parsed = statements(
        "source 'https://rubygems.org'\n\
         ruby '2.7.2'\n\
         gem 'rails', '~> 6.1.3'\n\
         group :test do\n\
         \tgem 'rspec-rails'\n\
         end\n\
         platforms :jruby do\n\
         \tgem 'jdbc-sqlite3'\n\
         end\n",
    );
    assert_eq!(parsed.len(), 5);
    assert!(matches!(parsed[0], Statement::Source(_)));
    assert!(matches!(parsed[1], Statement::RubyPin(_)));
    assert!(matches!(parsed[2], Statement::Dependency(_)));
    assert!(matches!(parsed[3], Statement::Group(_)));
    assert!(matches!(parsed[4], Statement::Platforms(_)));
}

#[test]
fn parse_comments_between_statements() {
    let parsed = statements("# Core gems\ngem 'rails'\n# Frontend\ngem 'webpacker'\n");
    assert_eq!(parsed.len(), 2);
}

#[test]
fn parse_comment_after_arguments() {
    let Statement::Dependency(dep) = &statements("gem 'pg', '>= 1.1' # database\n")[0] else {
        panic!("expected dependency");
    };
    assert_eq!(dep.version_constraints, vec![">= 1.1"]);
}

#[test]
fn parse_group_with_string_name() {
    let Statement::Group(group) = &statements("group 'test' do\n  gem 'rspec'\nend\n")[0] else {
        panic!("expected group");
    };
    assert_eq!(group.names, vec!["test"]);
}

#[test]
fn parse_deeply_nested_blocks() {
    let parsed = statements(
        "group :a do\n group :b do\n  group :c do\n   gem 'x'\n  end\n end\nend\n",
    );
    let Statement::Group(a) = &parsed[0] else {
        panic!("expected group");
    };
    let Statement::Group(b) = &a.body[0] else {
        panic!("expected group");
    };
    let Statement::Group(c) = &b.body[0] else {
        panic!("expected group");
    };
    assert!(matches!(&c.body[0], Statement::Dependency(_)));
}

#[test]
fn parse_empty_group_body() {
    let Statement::Group(group) = &statements("group :test do\nend\n")[0] else {
        panic!("expected group");
    };
    assert!(group.body.is_empty());
}

#[test]
fn parse_keyword_argument_values() {
    let Statement::Dependency(dep) = &statements(
        "gem 'x', require: false, tag: 'v1.0', count: 2, opt: nil\n",
    )[0] else {
        panic!("expected dependency");
    };
    assert_eq!(
        dep.options,
        vec![
            ("require".to_string(), Value::Bool(false)),
            ("tag".to_string(), Value::Str("v1.0".to_string())),
            ("count".to_string(), Value::Number(2)),
            ("opt".to_string(), Value::Nil),
        ]
    );
}

#[test]
fn parse_symbol_keyword_value() {
    let Statement::Dependency(dep) = &statements("gem 'byebug', platforms: :mri\n")[0] else {
        panic!("expected dependency");
    };
    assert_eq!(
        dep.options,
        vec![("platforms".to_string(), Value::Symbol("mri".to_string()))]
    );
}

#[test]
fn parse_multiline_array_argument() {
    let Statement::Dependency(dep) = &statements(
        "gem 'byebug', platforms: [\n  :mri,\n  :mingw,\n]\n",
    )[0] else {
        panic!("expected dependency");
    };
    assert_eq!(
        dep.options[0].1,
        Value::Array(vec![
            Value::Symbol("mri".to_string()),
            Value::Symbol("mingw".to_string()),
        ])
    );
}

// -----------------------------------------------------------
// Degraded mode: unsupported constructs parse inert.
// -----------------------------------------------------------

#[test]
fn parse_unsupported_between_valid_statements() {
    let parsed = statements("gem 'a'\ninstall_if -> { true }\ngem 'b'\n");
    assert_eq!(parsed.len(), 3);
    assert!(matches!(&parsed[1], Statement::Unsupported(u) if u.construct == "install_if"));
}

#[test]
fn parse_unsupported_captures_raw_text() {
    let parsed = statements("gemspec path: '.'\n");
    let Statement::Unsupported(stmt) = &parsed[0] else {
        panic!("expected unsupported");
    };
    assert!(stmt.text.contains("gemspec"), "text was: {}", stmt.text);
    assert_eq!(stmt.span.line, 1);
}

#[test]
fn parse_unsupported_inside_group_body() {
    let Statement::Group(group) = &statements(
        "group :test do\n  gemspec\n  gem 'rspec'\nend\n",
    )[0] else {
        panic!("expected group");
    };
    assert_eq!(group.body.len(), 2);
    assert!(matches!(&group.body[0], Statement::Unsupported(_)));
    assert!(matches!(&group.body[1], Statement::Dependency(_)));
}

#[test]
fn parse_nested_conditional_inside_conditional() {
    let parsed = statements(
        "if a\n  if b\n    gem 'x'\n  end\nend\ngem 'y'\n",
    );
    assert_eq!(parsed.len(), 2);
    assert!(matches!(&parsed[0], Statement::Unsupported(_)));
    assert!(matches!(&parsed[1], Statement::Dependency(dep) if dep.name == "y"));
}

#[test]
fn parse_gem_with_block_degrades() {
    let parsed = statements("gem 'x' do\n  something\nend\ngem 'y'\n");
    assert_eq!(parsed.len(), 2);
    assert!(matches!(&parsed[0], Statement::Unsupported(_)));
    assert!(matches!(&parsed[1], Statement::Dependency(dep) if dep.name == "y"));
}

#[test]
fn parse_ruby_with_keyword_degrades() {
    let parsed = statements("ruby file: '.ruby-version'\n");
    assert!(matches!(&parsed[0], Statement::Unsupported(_)));
}

#[test]
fn parse_group_without_do_degrades() {
    let parsed = statements("group :test\ngem 'x'\n");
    assert_eq!(parsed.len(), 2);
    assert!(matches!(&parsed[0], Statement::Unsupported(_)));
}

#[test]
fn parse_interpolated_gem_name_degrades() {
    let parsed = statements("gem \"rails-#{flavor}\"\ngem 'pg'\n");
    assert_eq!(parsed.len(), 2);
    assert!(matches!(&parsed[0], Statement::Unsupported(_)));
    assert!(matches!(&parsed[1], Statement::Dependency(_)));
}

// -----------------------------------------------------------
// Fatal structural errors.
// -----------------------------------------------------------

#[test]
fn parse_error_unterminated_source_block() {
    let err = parse_input("source 'https://x' do\n  gem 'a'\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnterminatedBlock);
}

#[test]
fn parse_error_nested_unterminated() {
    let err = parse_input("group :a do\n  group :b do\n    gem 'x'\n  end\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnterminatedBlock);
}

#[test]
fn parse_error_unterminated_paren_call() {
    let err = parse_input("gem('rack'\n").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::ExpectedCloseParen { .. }));
}

#[test]
fn parse_error_bracket_closed_by_end() {
    let err = parse_input("group :a do\n  gem 'x', platforms: [:mri\nend\n").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::ExpectedCloseBracket {
            found: Some("end".to_string())
        }
    );
}

#[test]
fn parse_error_position_is_reported() {
    let err = parse_input("gem 'x', opts: {\n").unwrap_err();
    assert!(err.to_string().contains("line 1"), "got: {err}");
}
